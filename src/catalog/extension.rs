use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub schema: String,
    pub version: String,
    pub comment: Option<String>,
}

impl CatalogEntity for Extension {
    fn id(&self) -> ObjectId {
        ObjectId::Extension {
            name: self.name.clone(),
        }
    }
}
