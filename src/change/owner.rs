use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

/// `ALTER <KIND> … OWNER TO <role>`, shared by every owned object kind.
#[derive(Debug, Clone)]
pub struct OwnerChange {
    pub object: ObjectId,
    pub owner: String,
}

fn owner_target(id: &ObjectId) -> Result<String, EmitError> {
    let invalid = || EmitError::InvalidTarget {
        change: "owner",
        target: id.to_string(),
    };

    Ok(match id {
        ObjectId::Schema { name } => format!("SCHEMA {}", quote_ident(name)),
        ObjectId::Table { schema, name } => format!("TABLE {}", quote_qualified(schema, name)),
        ObjectId::View { schema, name } => format!("VIEW {}", quote_qualified(schema, name)),
        ObjectId::MaterializedView { schema, name } => {
            format!("MATERIALIZED VIEW {}", quote_qualified(schema, name))
        }
        ObjectId::ForeignTable { schema, name } => {
            format!("FOREIGN TABLE {}", quote_qualified(schema, name))
        }
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
        ObjectId::Language { name } => format!("LANGUAGE {}", quote_ident(name)),
        ObjectId::ForeignDataWrapper { name } => {
            format!("FOREIGN DATA WRAPPER {}", quote_ident(name))
        }
        ObjectId::Server { name } => format!("SERVER {}", quote_ident(name)),
        ObjectId::Publication { name } => format!("PUBLICATION {}", quote_ident(name)),
        ObjectId::Subscription { name } => format!("SUBSCRIPTION {}", quote_ident(name)),
        ObjectId::EventTrigger { name } => format!("EVENT TRIGGER {}", quote_ident(name)),
        _ => return Err(invalid()),
    })
}

impl ChangeKind for OwnerChange {
    fn object_type(&self) -> &'static str {
        "owner"
    }

    fn operation(&self) -> Operation {
        Operation::Alter
    }

    fn scope(&self) -> Scope {
        Scope::Owner
    }

    fn target(&self) -> ObjectId {
        self.object.clone()
    }

    fn creates(&self) -> Vec<ObjectId> {
        Vec::new()
    }

    fn requires(&self) -> Vec<ObjectId> {
        vec![
            self.object.clone(),
            ObjectId::Role {
                name: self.owner.clone(),
            },
        ]
    }

    fn drops(&self) -> Vec<ObjectId> {
        Vec::new()
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        Ok(format!(
            "{} {} {} {}",
            ctx.kw("ALTER"),
            owner_target(&self.object)?,
            ctx.kw("OWNER TO"),
            quote_ident(&self.owner)
        ))
    }
}
