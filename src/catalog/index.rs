use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

/// An index. `definition` is the full `pg_get_indexdef` CREATE INDEX text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub schema: String,
    pub name: String,
    pub table: String,
    pub definition: String,
    pub comment: Option<String>,
}

impl CatalogEntity for Index {
    fn id(&self) -> ObjectId {
        ObjectId::Index {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
