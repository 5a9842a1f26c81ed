//! Function, procedure and aggregate changes.
//!
//! Create and Replace both re-emit the complete extracted definition; Replace
//! differs only in operation semantics (it alters an existing routine in
//! place and therefore never participates in replace-root expansion).

use crate::catalog::id::ObjectId;
use crate::catalog::routine::{Routine, RoutineKind};
use crate::change::quote::quote_qualified;
use crate::change::{
    with_or_replace, without_trailing_semicolon, ChangeKind, EmitContext, Operation, Scope,
};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum RoutineChange {
    Create {
        routine: Routine,
    },
    Replace {
        routine: Routine,
    },
    Drop {
        schema: String,
        name: String,
        arguments: String,
        kind: RoutineKind,
    },
}

fn routine_id(schema: &str, name: &str, arguments: &str, kind: RoutineKind) -> ObjectId {
    match kind {
        RoutineKind::Function => ObjectId::Function {
            schema: schema.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
        RoutineKind::Procedure => ObjectId::Procedure {
            schema: schema.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
        RoutineKind::Aggregate => ObjectId::Aggregate {
            schema: schema.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

impl RoutineChange {
    pub fn kind(&self) -> RoutineKind {
        match self {
            Self::Create { routine } | Self::Replace { routine } => routine.kind,
            Self::Drop { kind, .. } => *kind,
        }
    }
}

impl ChangeKind for RoutineChange {
    fn object_type(&self) -> &'static str {
        match self.kind() {
            RoutineKind::Function => "function",
            RoutineKind::Procedure => "procedure",
            RoutineKind::Aggregate => "aggregate",
        }
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Replace { .. } => Operation::Alter,
            Self::Drop { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        match self {
            Self::Create { routine } | Self::Replace { routine } => routine_id(
                &routine.schema,
                &routine.name,
                &routine.arguments,
                routine.kind,
            ),
            Self::Drop {
                schema,
                name,
                arguments,
                kind,
            } => routine_id(schema, name, arguments, *kind),
        }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { routine } => vec![ObjectId::Schema {
                name: routine.schema.clone(),
            }],
            Self::Replace { .. } => vec![self.target()],
            Self::Drop { .. } => Vec::new(),
        }
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn emit(&self, _ctx: &EmitContext) -> Result<String, EmitError> {
        Ok(match self {
            Self::Create { routine } => {
                without_trailing_semicolon(&routine.definition).to_string()
            }
            Self::Replace { routine } => {
                with_or_replace(without_trailing_semicolon(&routine.definition))
            }
            Self::Drop {
                schema,
                name,
                arguments,
                kind,
            } => {
                let keyword = match kind {
                    RoutineKind::Function => "DROP FUNCTION",
                    RoutineKind::Procedure => "DROP PROCEDURE",
                    RoutineKind::Aggregate => "DROP AGGREGATE",
                };
                format!("{keyword} {}({arguments})", quote_qualified(schema, name))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_function_keeps_signature() {
        let change = RoutineChange::Drop {
            schema: "app".into(),
            name: "add".into(),
            arguments: "integer, integer".into(),
            kind: RoutineKind::Function,
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "DROP FUNCTION app.add(integer, integer)"
        );
    }

    #[test]
    fn test_replace_injects_or_replace() {
        let routine = Routine {
            schema: "app".into(),
            name: "add".into(),
            arguments: "integer, integer".into(),
            kind: RoutineKind::Function,
            owner: "postgres".into(),
            language: "sql".into(),
            definition: "CREATE FUNCTION app.add(a integer, b integer) RETURNS integer \
                         LANGUAGE sql AS $$ SELECT a + b $$;"
                .into(),
            comment: None,
            privileges: Vec::new(),
        };
        let sql = RoutineChange::Replace { routine }
            .emit(&EmitContext::plain())
            .unwrap();
        assert!(sql.starts_with("CREATE OR REPLACE FUNCTION"));
        assert!(!sql.ends_with(';'));
    }
}
