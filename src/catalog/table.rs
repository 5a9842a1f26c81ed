use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    Permanent,
    Unlogged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaIdentity {
    Default,
    Full,
    Nothing,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Always,
    ByDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub position: i32,
    pub data_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    /// generation expression for `GENERATED ALWAYS AS (...) STORED`
    pub generated: Option<String>,
    pub identity: Option<IdentityKind>,
    pub collation: Option<String>,
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: &str, position: i32, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            position,
            data_type: data_type.to_string(),
            not_null: false,
            default: None,
            generated: None,
            identity: None,
            collation: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub persistence: Persistence,
    pub columns: Vec<Column>,
    pub rls_enabled: bool,
    pub rls_forced: bool,
    pub replica_identity: ReplicaIdentity,
    /// storage parameters as `key=value` strings
    pub options: Vec<String>,
    pub partition_key: Option<String>,
    pub is_partition: bool,
    /// `schema.table` of the parent plus the FOR VALUES clause, for partitions
    pub parent_table: Option<String>,
    pub partition_bound: Option<String>,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl Table {
    pub fn new(schema: &str, name: &str, owner: &str, columns: Vec<Column>) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            owner: owner.to_string(),
            persistence: Persistence::Permanent,
            columns,
            rls_enabled: false,
            rls_forced: false,
            replica_identity: ReplicaIdentity::Default,
            options: Vec::new(),
            partition_key: None,
            is_partition: false,
            parent_table: None,
            partition_bound: None,
            comment: None,
            privileges: Vec::new(),
        }
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_id(&self, column: &str) -> ObjectId {
        ObjectId::Column {
            schema: self.schema.clone(),
            table: self.name.clone(),
            name: column.to_string(),
        }
    }
}

impl CatalogEntity for Table {
    fn id(&self) -> ObjectId {
        ObjectId::Table {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
