use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::trigger::TriggerEnabled;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrigger {
    pub name: String,
    pub owner: String,
    /// `ddl_command_start`, `ddl_command_end`, `table_rewrite` or `sql_drop`
    pub event: String,
    pub tags: Vec<String>,
    /// `schema.function` implementing the trigger
    pub function: String,
    pub enabled: TriggerEnabled,
    pub comment: Option<String>,
}

impl CatalogEntity for EventTrigger {
    fn id(&self) -> ObjectId {
        ObjectId::EventTrigger {
            name: self.name.clone(),
        }
    }
}
