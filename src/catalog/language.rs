use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub owner: String,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for Language {
    fn id(&self) -> ObjectId {
        ObjectId::Language {
            name: self.name.clone(),
        }
    }
}
