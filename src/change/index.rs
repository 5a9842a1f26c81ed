use crate::catalog::id::ObjectId;
use crate::catalog::index::Index;
use crate::change::quote::quote_qualified;
use crate::change::{without_trailing_semicolon, ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

/// Indexes are definition-based: any difference replaces the index.
#[derive(Debug, Clone)]
pub enum IndexChange {
    Create { index: Index },
    Drop { schema: String, name: String },
}

impl ChangeKind for IndexChange {
    fn object_type(&self) -> &'static str {
        "index"
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
            Self::Create { index } => ObjectId::Index {
                schema: index.schema.clone(),
                name: index.name.clone(),
            },
            Self::Drop { schema, name } => ObjectId::Index {
                schema: schema.clone(),
                name: name.clone(),
            },
        }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            Self::Drop { .. } => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { index } => vec![ObjectId::Table {
                schema: index.schema.clone(),
                name: index.table.clone(),
            }],
            Self::Drop { .. } => Vec::new(),
        }
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } => vec![self.target()],
            Self::Create { .. } => Vec::new(),
        }
    }

    fn emit(&self, _ctx: &EmitContext) -> Result<String, EmitError> {
        Ok(match self {
            // The extracted definition is already a complete CREATE INDEX.
            Self::Create { index } => without_trailing_semicolon(&index.definition).to_string(),
            Self::Drop { schema, name } => {
                format!("DROP INDEX {}", quote_qualified(schema, name))
            }
        })
    }
}
