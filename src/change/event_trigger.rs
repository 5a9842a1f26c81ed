use crate::catalog::event_trigger::EventTrigger;
use crate::catalog::id::ObjectId;
use crate::catalog::trigger::TriggerEnabled;
use crate::change::quote::{quote_ident, quote_literal};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum EventTriggerChange {
    Create {
        trigger: EventTrigger,
    },
    Drop {
        name: String,
    },
    SetEnabled {
        name: String,
        enabled: TriggerEnabled,
    },
}

impl ChangeKind for EventTriggerChange {
    fn object_type(&self) -> &'static str {
        "event_trigger"
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
        let name = match self {
            Self::Create { trigger } => &trigger.name,
            Self::Drop { name } | Self::SetEnabled { name, .. } => name,
        };
        ObjectId::EventTrigger { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::SetEnabled { .. } => vec![self.target()],
            _ => Vec::new(),
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
            Self::Create { trigger } => {
                let mut sql = format!(
                    "{} {} {} {}",
                    ctx.kw("CREATE EVENT TRIGGER"),
                    quote_ident(&trigger.name),
                    ctx.kw("ON"),
                    trigger.event
                );
                if !trigger.tags.is_empty() {
                    let tags: Vec<String> =
                        trigger.tags.iter().map(|t| quote_literal(t)).collect();
                    sql.push_str(&format!(
                        " {} ({})",
                        ctx.kw("WHEN TAG IN"),
                        tags.join(", ")
                    ));
                }
                sql.push_str(&format!(
                    " {} {}()",
                    ctx.kw("EXECUTE FUNCTION"),
                    trigger.function
                ));
                sql
            }
            Self::Drop { name } => {
                format!("{} {}", ctx.kw("DROP EVENT TRIGGER"), quote_ident(name))
            }
            Self::SetEnabled { name, enabled } => {
                let clause = match enabled {
                    TriggerEnabled::Origin => ctx.kw("ENABLE"),
                    TriggerEnabled::Disabled => ctx.kw("DISABLE"),
                    TriggerEnabled::Replica => ctx.kw("ENABLE REPLICA"),
                    TriggerEnabled::Always => ctx.kw("ENABLE ALWAYS"),
                };
                format!(
                    "{} {} {clause}",
                    ctx.kw("ALTER EVENT TRIGGER"),
                    quote_ident(name)
                )
            }
        })
    }
}
