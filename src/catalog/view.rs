use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

/// A plain view. `definition` is the canonical `pg_get_viewdef` body without
/// the CREATE framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub definition: String,
    /// reloptions such as `security_barrier=true`
    pub options: Vec<String>,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for View {
    fn id(&self) -> ObjectId {
        ObjectId::View {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedView {
    pub schema: String,
    pub name: String,
    pub owner: String,
    pub definition: String,
    pub is_populated: bool,
    pub options: Vec<String>,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for MaterializedView {
    fn id(&self) -> ObjectId {
        ObjectId::MaterializedView {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
