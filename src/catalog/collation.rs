use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collation {
    pub schema: String,
    pub name: String,
    pub owner: String,
    /// `icu` or `libc`
    pub provider: String,
    pub locale: Option<String>,
    pub lc_collate: Option<String>,
    pub lc_ctype: Option<String>,
    pub deterministic: bool,
    pub comment: Option<String>,
}

impl CatalogEntity for Collation {
    fn id(&self) -> ObjectId {
        ObjectId::Collation {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
