use crate::catalog::id::ObjectId;
use crate::catalog::schema::SchemaDef;
use crate::change::quote::quote_ident;
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum SchemaChange {
    Create { schema: SchemaDef },
    Drop { name: String },
}

impl ChangeKind for SchemaChange {
    fn object_type(&self) -> &'static str {
        "schema"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        match self {
            Self::Create { schema } => ObjectId::Schema {
                name: schema.name.clone(),
            },
            Self::Drop { name } => ObjectId::Schema { name: name.clone() },
        }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            Self::Drop { .. } => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        Vec::new()
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } => vec![self.target()],
            Self::Create { .. } => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        Ok(match self {
            Self::Create { schema } => {
                format!("{} {}", ctx.kw("CREATE SCHEMA"), quote_ident(&schema.name))
            }
            Self::Drop { name } => format!("{} {}", ctx.kw("DROP SCHEMA"), quote_ident(name)),
        })
    }
}
