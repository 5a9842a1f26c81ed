use crate::catalog::collation::Collation;
use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_literal, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

/// Collations have no alterable facets; every difference replaces the object.
#[derive(Debug, Clone)]
pub enum CollationChange {
    Create { collation: Collation },
    Drop { schema: String, name: String },
}

impl ChangeKind for CollationChange {
    fn object_type(&self) -> &'static str {
        "collation"
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
            Self::Create { collation } => ObjectId::Collation {
                schema: collation.schema.clone(),
                name: collation.name.clone(),
            },
            Self::Drop { schema, name } => ObjectId::Collation {
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
            Self::Create { collation } => vec![ObjectId::Schema {
                name: collation.schema.clone(),
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
            Self::Create { collation } => {
                let mut options = vec![format!(
                    "{} = {}",
                    ctx.kw("provider"),
                    collation.provider
                )];
                if let Some(locale) = &collation.locale {
                    options.push(format!("{} = {}", ctx.kw("locale"), quote_literal(locale)));
                }
                if let Some(lc_collate) = &collation.lc_collate {
                    options.push(format!(
                        "{} = {}",
                        ctx.kw("lc_collate"),
                        quote_literal(lc_collate)
                    ));
                }
                if let Some(lc_ctype) = &collation.lc_ctype {
                    options.push(format!(
                        "{} = {}",
                        ctx.kw("lc_ctype"),
                        quote_literal(lc_ctype)
                    ));
                }
                if !collation.deterministic {
                    options.push(format!("{} = false", ctx.kw("deterministic")));
                }
                format!(
                    "{} {} {}",
                    ctx.kw("CREATE COLLATION"),
                    quote_qualified(&collation.schema, &collation.name),
                    ctx.paren_list(&options)
                )
            }
            Self::Drop { schema, name } => format!(
                "{} {}",
                ctx.kw("DROP COLLATION"),
                quote_qualified(schema, name)
            ),
        })
    }
}
