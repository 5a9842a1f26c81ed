use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

/// A cluster role. `members` lists the roles granted membership in this role,
/// surfaced as `membership:<role>.<member>` identities during diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub superuser: bool,
    pub inherit: bool,
    pub create_role: bool,
    pub create_db: bool,
    pub login: bool,
    pub replication: bool,
    pub bypass_rls: bool,
    pub connection_limit: i64,
    pub valid_until: Option<String>,
    /// role-level `SET` parameters, as `key=value` strings
    pub config: Vec<String>,
    pub members: Vec<String>,
    pub comment: Option<String>,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superuser: false,
            inherit: true,
            create_role: false,
            create_db: false,
            login: false,
            replication: false,
            bypass_rls: false,
            connection_limit: -1,
            valid_until: None,
            config: Vec::new(),
            members: Vec::new(),
            comment: None,
        }
    }
}

impl CatalogEntity for Role {
    fn id(&self) -> ObjectId {
        ObjectId::Role {
            name: self.name.clone(),
        }
    }
}
