use crate::catalog::constraint::Constraint;
use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum ConstraintChange {
    Create {
        constraint: Constraint,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
    /// Emitted when only the `validated` flag flips from false to true.
    Validate {
        schema: String,
        table: String,
        name: String,
    },
}

impl ConstraintChange {
    fn parts(&self) -> (&str, &str, &str) {
        match self {
            Self::Create { constraint } => (&constraint.schema, &constraint.table, &constraint.name),
            Self::Drop {
                schema,
                table,
                name,
            }
            | Self::Validate {
                schema,
                table,
                name,
            } => (schema, table, name),
        }
    }

    fn table_id(&self) -> ObjectId {
        let (schema, table, _) = self.parts();
        ObjectId::Table {
            schema: schema.to_string(),
            name: table.to_string(),
        }
    }
}

impl ChangeKind for ConstraintChange {
    fn object_type(&self) -> &'static str {
        "constraint"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::Validate { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Constraint
    }

    fn target(&self) -> ObjectId {
        let (schema, table, name) = self.parts();
        ObjectId::Constraint {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
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
            Self::Create { .. } | Self::Validate { .. } => vec![self.table_id()],
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
        let (schema, table, name) = self.parts();
        let prefix = format!("{} {}", ctx.kw("ALTER TABLE"), quote_qualified(schema, table));
        Ok(match self {
            Self::Create { constraint } => {
                let mut sql = format!(
                    "{prefix} {} {} {}",
                    ctx.kw("ADD CONSTRAINT"),
                    quote_ident(name),
                    constraint.definition
                );
                if !constraint.validated && !constraint.definition.ends_with("NOT VALID") {
                    sql.push_str(&format!(" {}", ctx.kw("NOT VALID")));
                }
                sql
            }
            Self::Drop { .. } => {
                format!("{prefix} {} {}", ctx.kw("DROP CONSTRAINT"), quote_ident(name))
            }
            Self::Validate { .. } => format!(
                "{prefix} {} {}",
                ctx.kw("VALIDATE CONSTRAINT"),
                quote_ident(name)
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_foreign_key() {
        let change = ConstraintChange::Create {
            constraint: Constraint {
                schema: "public".into(),
                table: "orders".into(),
                name: "orders_user_id_fkey".into(),
                definition: "FOREIGN KEY (user_id) REFERENCES public.users(id)".into(),
                validated: true,
                comment: None,
            },
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "ALTER TABLE public.orders ADD CONSTRAINT orders_user_id_fkey \
             FOREIGN KEY (user_id) REFERENCES public.users(id)"
        );
    }

    #[test]
    fn test_not_valid_suffix() {
        let change = ConstraintChange::Create {
            constraint: Constraint {
                schema: "public".into(),
                table: "orders".into(),
                name: "orders_total_check".into(),
                definition: "CHECK (total >= 0)".into(),
                validated: false,
                comment: None,
            },
        };
        assert!(change
            .emit(&EmitContext::plain())
            .unwrap()
            .ends_with("NOT VALID"));
    }
}
