use crate::catalog::domain::{Domain, DomainConstraint};
use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum DomainChange {
    Create {
        domain: Domain,
    },
    Drop {
        schema: String,
        name: String,
    },
    SetDefault {
        schema: String,
        name: String,
        default: String,
    },
    DropDefault {
        schema: String,
        name: String,
    },
    SetNotNull {
        schema: String,
        name: String,
    },
    DropNotNull {
        schema: String,
        name: String,
    },
    AddConstraint {
        schema: String,
        name: String,
        constraint: DomainConstraint,
    },
    DropConstraint {
        schema: String,
        name: String,
        constraint: String,
    },
    ValidateConstraint {
        schema: String,
        name: String,
        constraint: String,
    },
}

impl DomainChange {
    fn schema_and_name(&self) -> (&str, &str) {
        match self {
            Self::Create { domain } => (&domain.schema, &domain.name),
            Self::Drop { schema, name }
            | Self::SetDefault { schema, name, .. }
            | Self::DropDefault { schema, name }
            | Self::SetNotNull { schema, name }
            | Self::DropNotNull { schema, name }
            | Self::AddConstraint { schema, name, .. }
            | Self::DropConstraint { schema, name, .. }
            | Self::ValidateConstraint { schema, name, .. } => (schema, name),
        }
    }
}

impl ChangeKind for DomainChange {
    fn object_type(&self) -> &'static str {
        "domain"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            _ => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        match self {
            Self::AddConstraint { .. }
            | Self::DropConstraint { .. }
            | Self::ValidateConstraint { .. } => Scope::Constraint,
            _ => Scope::Object,
        }
    }

    fn target(&self) -> ObjectId {
        let (schema, name) = self.schema_and_name();
        ObjectId::Domain {
            schema: schema.to_string(),
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
            Self::Create { domain } => vec![ObjectId::Schema {
                name: domain.schema.clone(),
            }],
            Self::Drop { .. } => Vec::new(),
            _ => vec![self.target()],
        }
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        let (schema, name) = self.schema_and_name();
        let qualified = quote_qualified(schema, name);
        Ok(match self {
            Self::Create { domain } => {
                let mut sql = format!(
                    "{} {} {} {}",
                    ctx.kw("CREATE DOMAIN"),
                    qualified,
                    ctx.kw("AS"),
                    domain.base_type
                );
                if let Some(collation) = &domain.collation {
                    sql.push_str(&format!(" {} {}", ctx.kw("COLLATE"), collation));
                }
                if let Some(default) = &domain.default {
                    sql.push_str(&format!(" {} {}", ctx.kw("DEFAULT"), default));
                }
                if domain.not_null {
                    sql.push_str(&format!(" {}", ctx.kw("NOT NULL")));
                }
                for constraint in &domain.constraints {
                    sql.push_str(&format!(
                        " {} {} {}",
                        ctx.kw("CONSTRAINT"),
                        quote_ident(&constraint.name),
                        constraint.definition
                    ));
                }
                sql
            }
            Self::Drop { .. } => format!("{} {}", ctx.kw("DROP DOMAIN"), qualified),
            Self::SetDefault { default, .. } => format!(
                "{} {} {} {}",
                ctx.kw("ALTER DOMAIN"),
                qualified,
                ctx.kw("SET DEFAULT"),
                default
            ),
            Self::DropDefault { .. } => format!(
                "{} {} {}",
                ctx.kw("ALTER DOMAIN"),
                qualified,
                ctx.kw("DROP DEFAULT")
            ),
            Self::SetNotNull { .. } => format!(
                "{} {} {}",
                ctx.kw("ALTER DOMAIN"),
                qualified,
                ctx.kw("SET NOT NULL")
            ),
            Self::DropNotNull { .. } => format!(
                "{} {} {}",
                ctx.kw("ALTER DOMAIN"),
                qualified,
                ctx.kw("DROP NOT NULL")
            ),
            Self::AddConstraint { constraint, .. } => {
                let mut sql = format!(
                    "{} {} {} {} {}",
                    ctx.kw("ALTER DOMAIN"),
                    qualified,
                    ctx.kw("ADD CONSTRAINT"),
                    quote_ident(&constraint.name),
                    constraint.definition
                );
                if !constraint.validated {
                    sql.push_str(&format!(" {}", ctx.kw("NOT VALID")));
                }
                sql
            }
            Self::DropConstraint { constraint, .. } => format!(
                "{} {} {} {}",
                ctx.kw("ALTER DOMAIN"),
                qualified,
                ctx.kw("DROP CONSTRAINT"),
                quote_ident(constraint)
            ),
            Self::ValidateConstraint { constraint, .. } => format!(
                "{} {} {} {}",
                ctx.kw("ALTER DOMAIN"),
                qualified,
                ctx.kw("VALIDATE CONSTRAINT"),
                quote_ident(constraint)
            ),
        })
    }
}
