use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub data_type: String,
    pub increment: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub start_value: i64,
    pub cache: i64,
    pub cycle: bool,
    /// `schema.table.column` of the owning column, if any
    pub owned_by: Option<String>,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl Sequence {
    /// The stable identity of the owning column, when ownership is set.
    pub fn owned_by_column(&self) -> Option<ObjectId> {
        let owned_by = self.owned_by.as_deref()?;
        let mut parts = owned_by.splitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(schema), Some(table), Some(column)) => Some(ObjectId::Column {
                schema: schema.to_string(),
                table: table.to_string(),
                name: column.to_string(),
            }),
            _ => None,
        }
    }
}

impl CatalogEntity for Sequence {
    fn id(&self) -> ObjectId {
        ObjectId::Sequence {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
