use crate::catalog::id::ObjectId;
use crate::catalog::trigger::{Trigger, TriggerEnabled};
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{without_trailing_semicolon, ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum TriggerChange {
    Create {
        trigger: Trigger,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
    SetEnabled {
        schema: String,
        table: String,
        name: String,
        enabled: TriggerEnabled,
    },
}

impl ChangeKind for TriggerChange {
    fn object_type(&self) -> &'static str {
        "trigger"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::SetEnabled { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        match self {
            Self::Create { trigger } => trigger_id(&trigger.schema, &trigger.table, &trigger.name),
            Self::Drop {
                schema,
                table,
                name,
            }
            | Self::SetEnabled {
                schema,
                table,
                name,
                ..
            } => trigger_id(schema, table, name),
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
            Self::Create { trigger } => vec![trigger.table_id()],
            Self::SetEnabled { schema, table, .. } => vec![
                self.target(),
                ObjectId::Table {
                    schema: schema.clone(),
                    name: table.clone(),
                },
            ],
            Self::Drop { .. } => Vec::new(),
        }
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        Ok(match self {
            // pg_get_triggerdef already renders the full CREATE TRIGGER.
            Self::Create { trigger } => {
                without_trailing_semicolon(&trigger.definition).to_string()
            }
            Self::Drop {
                schema,
                table,
                name,
            } => format!(
                "{} {} {} {}",
                ctx.kw("DROP TRIGGER"),
                quote_ident(name),
                ctx.kw("ON"),
                quote_qualified(schema, table)
            ),
            Self::SetEnabled {
                schema,
                table,
                name,
                enabled,
            } => {
                let clause = match enabled {
                    TriggerEnabled::Origin => ctx.kw("ENABLE TRIGGER"),
                    TriggerEnabled::Disabled => ctx.kw("DISABLE TRIGGER"),
                    TriggerEnabled::Replica => ctx.kw("ENABLE REPLICA TRIGGER"),
                    TriggerEnabled::Always => ctx.kw("ENABLE ALWAYS TRIGGER"),
                };
                format!(
                    "{} {} {clause} {}",
                    ctx.kw("ALTER TABLE"),
                    quote_qualified(schema, table),
                    quote_ident(name)
                )
            }
        })
    }
}

fn trigger_id(schema: &str, table: &str, name: &str) -> ObjectId {
    ObjectId::Trigger {
        schema: schema.to_string(),
        table: table.to_string(),
        name: name.to_string(),
    }
}
