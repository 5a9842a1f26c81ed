use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

/// A rewrite rule. `definition` is the canonical `pg_get_ruledef` text,
/// which already starts with `CREATE RULE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub definition: String,
    pub comment: Option<String>,
}

impl Rule {
    pub fn table_id(&self) -> ObjectId {
        ObjectId::Table {
            schema: self.schema.clone(),
            name: self.table.clone(),
        }
    }
}

impl CatalogEntity for Rule {
    fn id(&self) -> ObjectId {
        ObjectId::Rule {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}
