use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

/// A table constraint. `definition` is the `pg_get_constraintdef` body,
/// e.g. `FOREIGN KEY (user_id) REFERENCES public.users(id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub definition: String,
    pub validated: bool,
    pub comment: Option<String>,
}

impl Constraint {
    pub fn table_id(&self) -> ObjectId {
        ObjectId::Table {
            schema: self.schema.clone(),
            name: self.table.clone(),
        }
    }
}

impl CatalogEntity for Constraint {
    fn id(&self) -> ObjectId {
        ObjectId::Constraint {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}
