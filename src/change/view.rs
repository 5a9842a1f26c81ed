//! View and materialized-view changes. Definition changes never use
//! CREATE OR REPLACE: they arrive as Drop + Create pairs so dependents can be
//! interleaved between the two statements.

use crate::catalog::id::ObjectId;
use crate::catalog::view::{MaterializedView, View};
use crate::change::quote::quote_qualified;
use crate::change::{without_trailing_semicolon, ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum ViewChange {
    Create {
        view: View,
    },
    Drop {
        schema: String,
        name: String,
    },
    SetOptions {
        schema: String,
        name: String,
        options: Vec<String>,
    },
}

impl ChangeKind for ViewChange {
    fn object_type(&self) -> &'static str {
        "view"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::SetOptions { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        match self {
            Self::Create { view } => ObjectId::View {
                schema: view.schema.clone(),
                name: view.name.clone(),
            },
            Self::Drop { schema, name } | Self::SetOptions { schema, name, .. } => ObjectId::View {
                schema: schema.clone(),
                name: name.clone(),
            },
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
            Self::Create { view } => vec![ObjectId::Schema {
                name: view.schema.clone(),
            }],
            Self::Drop { .. } => Vec::new(),
            Self::SetOptions { .. } => vec![self.target()],
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
            Self::Create { view } => {
                let mut sql = format!(
                    "{} {}",
                    ctx.kw("CREATE VIEW"),
                    quote_qualified(&view.schema, &view.name)
                );
                if !view.options.is_empty() {
                    sql.push_str(&format!(" {} ({})", ctx.kw("WITH"), view.options.join(", ")));
                }
                sql.push_str(&format!(
                    " {} {}",
                    ctx.kw("AS"),
                    without_trailing_semicolon(&view.definition)
                ));
                sql
            }
            Self::Drop { schema, name } => {
                format!("{} {}", ctx.kw("DROP VIEW"), quote_qualified(schema, name))
            }
            Self::SetOptions {
                schema,
                name,
                options,
            } => format!(
                "{} {} {} ({})",
                ctx.kw("ALTER VIEW"),
                quote_qualified(schema, name),
                ctx.kw("SET"),
                options.join(", ")
            ),
        })
    }
}

#[derive(Debug, Clone)]
pub enum MaterializedViewChange {
    Create { view: MaterializedView },
    Drop { schema: String, name: String },
}

impl ChangeKind for MaterializedViewChange {
    fn object_type(&self) -> &'static str {
        "materialized_view"
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
            Self::Create { view } => ObjectId::MaterializedView {
                schema: view.schema.clone(),
                name: view.name.clone(),
            },
            Self::Drop { schema, name } => ObjectId::MaterializedView {
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
            Self::Create { view } => vec![ObjectId::Schema {
                name: view.schema.clone(),
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

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        Ok(match self {
            Self::Create { view } => {
                let mut sql = format!(
                    "{} {}",
                    ctx.kw("CREATE MATERIALIZED VIEW"),
                    quote_qualified(&view.schema, &view.name)
                );
                if !view.options.is_empty() {
                    sql.push_str(&format!(" {} ({})", ctx.kw("WITH"), view.options.join(", ")));
                }
                sql.push_str(&format!(
                    " {} {}",
                    ctx.kw("AS"),
                    without_trailing_semicolon(&view.definition)
                ));
                if !view.is_populated {
                    sql.push_str(&format!(" {}", ctx.kw("WITH NO DATA")));
                }
                sql
            }
            Self::Drop { schema, name } => format!(
                "{} {}",
                ctx.kw("DROP MATERIALIZED VIEW"),
                quote_qualified(schema, name)
            ),
        })
    }
}
