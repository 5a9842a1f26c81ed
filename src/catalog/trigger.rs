use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

/// Firing state shared by table triggers and event triggers, mirroring
/// `pg_trigger.tgenabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEnabled {
    Origin,
    Disabled,
    Replica,
    Always,
}

/// A table trigger. `definition` is the full `pg_get_triggerdef` text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub definition: String,
    pub enabled: TriggerEnabled,
    pub comment: Option<String>,
}

impl Trigger {
    pub fn table_id(&self) -> ObjectId {
        ObjectId::Table {
            schema: self.schema.clone(),
            name: self.table.clone(),
        }
    }
}

impl CatalogEntity for Trigger {
    fn id(&self) -> ObjectId {
        ObjectId::Trigger {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}
