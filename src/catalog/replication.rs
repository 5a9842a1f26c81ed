//! Logical-replication objects.

use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub name: String,
    pub owner: String,
    pub all_tables: bool,
    /// `schema.table` entries when not FOR ALL TABLES
    pub tables: Vec<String>,
    /// published operations: insert, update, delete, truncate
    pub publish: Vec<String>,
    pub via_partition_root: bool,
    pub comment: Option<String>,
}

impl CatalogEntity for Publication {
    fn id(&self) -> ObjectId {
        ObjectId::Publication {
            name: self.name.clone(),
        }
    }
}

/// A subscription. `conninfo` may embed a password; emission masks it and
/// reports the placeholder through `sensitive_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub owner: String,
    pub conninfo: String,
    pub publications: Vec<String>,
    pub enabled: bool,
    pub slot_name: Option<String>,
    pub synchronous_commit: Option<String>,
    pub two_phase: bool,
    pub comment: Option<String>,
}

impl CatalogEntity for Subscription {
    fn id(&self) -> ObjectId {
        ObjectId::Subscription {
            name: self.name.clone(),
        }
    }
}
