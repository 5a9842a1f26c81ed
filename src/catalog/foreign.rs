//! Foreign-data objects: wrappers, servers, user mappings and foreign tables.

use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::table::Column;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignDataWrapper {
    pub name: String,
    pub owner: String,
    pub handler: Option<String>,
    pub validator: Option<String>,
    pub options: Vec<(String, String)>,
    pub comment: Option<String>,
}

impl CatalogEntity for ForeignDataWrapper {
    fn id(&self) -> ObjectId {
        ObjectId::ForeignDataWrapper {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    pub wrapper: String,
    pub server_type: Option<String>,
    pub version: Option<String>,
    pub owner: String,
    pub options: Vec<(String, String)>,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for Server {
    fn id(&self) -> ObjectId {
        ObjectId::Server {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMapping {
    pub server: String,
    pub user: String,
    pub options: Vec<(String, String)>,
}

impl CatalogEntity for UserMapping {
    fn id(&self) -> ObjectId {
        ObjectId::UserMapping {
            server: self.server.clone(),
            user: self.user.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignTable {
    pub schema: String,
    pub name: String,
    pub server: String,
    pub owner: String,
    pub columns: Vec<Column>,
    pub options: Vec<(String, String)>,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for ForeignTable {
    fn id(&self) -> ObjectId {
        ObjectId::ForeignTable {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
