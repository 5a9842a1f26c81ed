use crate::catalog::id::ObjectId;
use crate::catalog::rule::Rule;
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{
    with_or_replace, without_trailing_semicolon, ChangeKind, EmitContext, Operation, Scope,
};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum RuleChange {
    Create {
        rule: Rule,
        /// rewrite the extracted `CREATE` head into `CREATE OR REPLACE`
        or_replace: bool,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
}

impl ChangeKind for RuleChange {
    fn object_type(&self) -> &'static str {
        "rule"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { or_replace: false, .. } => Operation::Create,
            Self::Create { or_replace: true, .. } => Operation::Alter,
            Self::Drop { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        match self {
            Self::Create { rule, .. } => ObjectId::Rule {
                schema: rule.schema.clone(),
                table: rule.table.clone(),
                name: rule.name.clone(),
            },
            Self::Drop {
                schema,
                table,
                name,
            } => ObjectId::Rule {
                schema: schema.clone(),
                table: table.clone(),
                name: name.clone(),
            },
        }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { or_replace: false, .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { rule, .. } => vec![rule.table_id()],
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
            Self::Create { rule, or_replace } => {
                let definition = without_trailing_semicolon(&rule.definition);
                if *or_replace {
                    with_or_replace(definition)
                } else {
                    definition.to_string()
                }
            }
            Self::Drop {
                schema,
                table,
                name,
            } => format!(
                "{} {} {} {}",
                ctx.kw("DROP RULE"),
                quote_ident(name),
                ctx.kw("ON"),
                quote_qualified(schema, table)
            ),
        })
    }
}
