use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    pub owner: String,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for SchemaDef {
    fn id(&self) -> ObjectId {
        ObjectId::Schema {
            name: self.name.clone(),
        }
    }
}
