use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConstraint {
    pub name: String,
    /// `CHECK (...)` body as extracted by `pg_get_constraintdef`
    pub definition: String,
    pub validated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub base_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub collation: Option<String>,
    pub constraints: Vec<DomainConstraint>,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for Domain {
    fn id(&self) -> ObjectId {
        ObjectId::Domain {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
