use crate::catalog::extension::Extension;
use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_literal};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum ExtensionChange {
    Create { extension: Extension },
    Drop { name: String },
    SetSchema { name: String, schema: String },
    Update { name: String, version: String },
}

impl ChangeKind for ExtensionChange {
    fn object_type(&self) -> &'static str {
        "extension"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::SetSchema { .. } | Self::Update { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let name = match self {
            Self::Create { extension } => &extension.name,
            Self::Drop { name } | Self::SetSchema { name, .. } | Self::Update { name, .. } => name,
        };
        ObjectId::Extension { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { extension } => vec![ObjectId::Schema {
                name: extension.schema.clone(),
            }],
            Self::SetSchema { schema, .. } => vec![
                self.target(),
                ObjectId::Schema {
                    name: schema.clone(),
                },
            ],
            Self::Update { .. } => vec![self.target()],
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
            Self::Create { extension } => format!(
                "{} {} {} {} {} {}",
                ctx.kw("CREATE EXTENSION"),
                quote_ident(&extension.name),
                ctx.kw("WITH SCHEMA"),
                quote_ident(&extension.schema),
                ctx.kw("VERSION"),
                quote_literal(&extension.version)
            ),
            Self::Drop { name } => format!("{} {}", ctx.kw("DROP EXTENSION"), quote_ident(name)),
            Self::SetSchema { name, schema } => format!(
                "{} {} {} {}",
                ctx.kw("ALTER EXTENSION"),
                quote_ident(name),
                ctx.kw("SET SCHEMA"),
                quote_ident(schema)
            ),
            Self::Update { name, version } => format!(
                "{} {} {} {}",
                ctx.kw("ALTER EXTENSION"),
                quote_ident(name),
                ctx.kw("UPDATE TO"),
                quote_literal(version)
            ),
        })
    }
}
