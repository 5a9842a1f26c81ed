//! Cross-cutting COMMENT ON changes. The commented object's identity carries
//! enough structure to render the full target clause for every supported kind.

use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_literal, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum CommentChange {
    Set { object: ObjectId, text: String },
    Drop { object: ObjectId },
}

/// Renders `<KIND> <identifier>` for a COMMENT ON statement.
fn comment_target(id: &ObjectId) -> Result<String, EmitError> {
    let invalid = || EmitError::InvalidTarget {
        change: "comment",
        target: id.to_string(),
    };

    Ok(match id {
        ObjectId::Schema { name } => format!("SCHEMA {}", quote_ident(name)),
        ObjectId::Role { name } => format!("ROLE {}", quote_ident(name)),
        ObjectId::Table { schema, name } => format!("TABLE {}", quote_qualified(schema, name)),
        ObjectId::View { schema, name } => format!("VIEW {}", quote_qualified(schema, name)),
        ObjectId::MaterializedView { schema, name } => {
            format!("MATERIALIZED VIEW {}", quote_qualified(schema, name))
        }
        ObjectId::ForeignTable { schema, name } => {
            format!("FOREIGN TABLE {}", quote_qualified(schema, name))
        }
        ObjectId::Column {
            schema,
            table,
            name,
        } => format!(
            "COLUMN {}.{}",
            quote_qualified(schema, table),
            quote_ident(name)
        ),
        ObjectId::Constraint {
            schema,
            table,
            name,
        } => format!(
            "CONSTRAINT {} ON {}",
            quote_ident(name),
            quote_qualified(schema, table)
        ),
        ObjectId::Index { schema, name } => format!("INDEX {}", quote_qualified(schema, name)),
        ObjectId::Sequence { schema, name } => {
            format!("SEQUENCE {}", quote_qualified(schema, name))
        }
        ObjectId::Type { schema, name } => format!("TYPE {}", quote_qualified(schema, name)),
        ObjectId::Domain { schema, name } => format!("DOMAIN {}", quote_qualified(schema, name)),
        ObjectId::Collation { schema, name } => {
            format!("COLLATION {}", quote_qualified(schema, name))
        }
        ObjectId::Function {
            schema,
            name,
            arguments,
        } => format!("FUNCTION {}({arguments})", quote_qualified(schema, name)),
        ObjectId::Procedure {
            schema,
            name,
            arguments,
        } => format!("PROCEDURE {}({arguments})", quote_qualified(schema, name)),
        ObjectId::Aggregate {
            schema,
            name,
            arguments,
        } => format!("AGGREGATE {}({arguments})", quote_qualified(schema, name)),
        ObjectId::Trigger {
            schema,
            table,
            name,
        } => format!(
            "TRIGGER {} ON {}",
            quote_ident(name),
            quote_qualified(schema, table)
        ),
        ObjectId::Rule {
            schema,
            table,
            name,
        } => format!(
            "RULE {} ON {}",
            quote_ident(name),
            quote_qualified(schema, table)
        ),
        ObjectId::Policy {
            schema,
            table,
            name,
        } => format!(
            "POLICY {} ON {}",
            quote_ident(name),
            quote_qualified(schema, table)
        ),
        ObjectId::Publication { name } => format!("PUBLICATION {}", quote_ident(name)),
        ObjectId::Subscription { name } => format!("SUBSCRIPTION {}", quote_ident(name)),
        ObjectId::Extension { name } => format!("EXTENSION {}", quote_ident(name)),
        ObjectId::Language { name } => format!("LANGUAGE {}", quote_ident(name)),
        ObjectId::ForeignDataWrapper { name } => {
            format!("FOREIGN DATA WRAPPER {}", quote_ident(name))
        }
        ObjectId::Server { name } => format!("SERVER {}", quote_ident(name)),
        ObjectId::EventTrigger { name } => format!("EVENT TRIGGER {}", quote_ident(name)),
        _ => return Err(invalid()),
    })
}

impl CommentChange {
    fn object(&self) -> &ObjectId {
        match self {
            Self::Set { object, .. } | Self::Drop { object } => object,
        }
    }
}

impl ChangeKind for CommentChange {
    fn object_type(&self) -> &'static str {
        "comment"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Set { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Comment
    }

    fn target(&self) -> ObjectId {
        self.object().clone().commented()
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Set { .. } => vec![self.target()],
            Self::Drop { .. } => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        vec![self.object().clone()]
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } => vec![self.target()],
            Self::Set { .. } => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        let target = comment_target(self.object())?;
        Ok(match self {
            Self::Set { text, .. } => format!(
                "{} {target} {} {}",
                ctx.kw("COMMENT ON"),
                ctx.kw("IS"),
                quote_literal(text)
            ),
            Self::Drop { .. } => format!(
                "{} {target} {} {}",
                ctx.kw("COMMENT ON"),
                ctx.kw("IS"),
                ctx.kw("NULL")
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_on_column() {
        let change = CommentChange::Set {
            object: ObjectId::Column {
                schema: "public".into(),
                table: "users".into(),
                name: "email".into(),
            },
            text: "primary contact address".into(),
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "COMMENT ON COLUMN public.users.email IS 'primary contact address'"
        );
    }

    #[test]
    fn test_comment_drop_renders_null() {
        let change = CommentChange::Drop {
            object: ObjectId::Table {
                schema: "public".into(),
                name: "users".into(),
            },
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "COMMENT ON TABLE public.users IS NULL"
        );
    }

    #[test]
    fn test_virtual_target_is_rejected() {
        let change = CommentChange::Drop {
            object: ObjectId::Membership {
                role: "a".into(),
                member: "b".into(),
            },
        };
        assert!(change.emit(&EmitContext::plain()).is_err());
    }
}
