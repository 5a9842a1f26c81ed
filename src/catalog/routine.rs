//! Functions, procedures and aggregates.

use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    Function,
    Procedure,
    Aggregate,
}

/// A routine record. `definition` holds the complete extracted CREATE
/// statement (`pg_get_functiondef`, or the assembled CREATE AGGREGATE text),
/// so emission never needs to re-derive parameter lists or attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub schema: String,
    pub name: String,
    /// identity argument signature, e.g. `integer, text`
    pub arguments: String,
    pub kind: RoutineKind,
    pub owner: String,
    pub language: String,
    pub definition: String,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl CatalogEntity for Routine {
    fn id(&self) -> ObjectId {
        match self.kind {
            RoutineKind::Function => ObjectId::Function {
                schema: self.schema.clone(),
                name: self.name.clone(),
                arguments: self.arguments.clone(),
            },
            RoutineKind::Procedure => ObjectId::Procedure {
                schema: self.schema.clone(),
                name: self.name.clone(),
                arguments: self.arguments.clone(),
            },
            RoutineKind::Aggregate => ObjectId::Aggregate {
                schema: self.schema.clone(),
                name: self.name.clone(),
                arguments: self.arguments.clone(),
            },
        }
    }
}
