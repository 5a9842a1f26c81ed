//! Enum, composite and range type changes.
//!
//! PostgreSQL cannot remove or reorder enum labels, so those diffs arrive here
//! as Drop + Create pairs; only label additions alter in place, with the
//! position resolved by the diff.

use crate::catalog::custom_type::{TypeDef, TypeKind};
use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_literal, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValuePosition {
    Before(String),
    After(String),
    Last,
}

#[derive(Debug, Clone)]
pub enum TypeChange {
    Create {
        type_def: TypeDef,
    },
    Drop {
        schema: String,
        name: String,
    },
    AddEnumValue {
        schema: String,
        name: String,
        value: String,
        position: EnumValuePosition,
    },
}

impl ChangeKind for TypeChange {
    fn object_type(&self) -> &'static str {
        "type"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::AddEnumValue { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        match self {
            Self::Create { type_def } => ObjectId::Type {
                schema: type_def.schema.clone(),
                name: type_def.name.clone(),
            },
            Self::Drop { schema, name } | Self::AddEnumValue { schema, name, .. } => {
                ObjectId::Type {
                    schema: schema.clone(),
                    name: name.clone(),
                }
            }
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
            Self::Create { type_def } => vec![ObjectId::Schema {
                name: type_def.schema.clone(),
            }],
            Self::AddEnumValue { .. } => vec![self.target()],
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
            Self::Create { type_def } => emit_create(ctx, type_def),
            Self::Drop { schema, name } => {
                format!("{} {}", ctx.kw("DROP TYPE"), quote_qualified(schema, name))
            }
            Self::AddEnumValue {
                schema,
                name,
                value,
                position,
            } => {
                let mut sql = format!(
                    "{} {} {} {}",
                    ctx.kw("ALTER TYPE"),
                    quote_qualified(schema, name),
                    ctx.kw("ADD VALUE"),
                    quote_literal(value)
                );
                match position {
                    EnumValuePosition::Before(anchor) => {
                        sql.push_str(&format!(" {} {}", ctx.kw("BEFORE"), quote_literal(anchor)));
                    }
                    EnumValuePosition::After(anchor) => {
                        sql.push_str(&format!(" {} {}", ctx.kw("AFTER"), quote_literal(anchor)));
                    }
                    EnumValuePosition::Last => {}
                }
                sql
            }
        })
    }
}

fn emit_create(ctx: &EmitContext, type_def: &TypeDef) -> String {
    let name = quote_qualified(&type_def.schema, &type_def.name);
    match &type_def.kind {
        TypeKind::Enum { labels } => {
            let values: Vec<String> = labels.iter().map(|l| quote_literal(&l.name)).collect();
            format!(
                "{} {} {} {}",
                ctx.kw("CREATE TYPE"),
                name,
                ctx.kw("AS ENUM"),
                ctx.paren_list(&values)
            )
        }
        TypeKind::Composite { attributes } => {
            let attrs: Vec<String> = attributes
                .iter()
                .map(|a| {
                    let mut def = format!("{} {}", quote_ident(&a.name), a.data_type);
                    if let Some(collation) = &a.collation {
                        def.push_str(&format!(" {} {}", ctx.kw("COLLATE"), collation));
                    }
                    def
                })
                .collect();
            format!(
                "{} {} {} {}",
                ctx.kw("CREATE TYPE"),
                name,
                ctx.kw("AS"),
                ctx.paren_list(&attrs)
            )
        }
        TypeKind::Range {
            subtype,
            subtype_opclass,
            collation,
            canonical,
            subtype_diff,
            multirange_type_name,
        } => {
            let mut options = vec![format!("{} = {}", ctx.kw("subtype"), subtype)];
            if let Some(opclass) = subtype_opclass {
                options.push(format!("{} = {}", ctx.kw("subtype_opclass"), opclass));
            }
            if let Some(collation) = collation {
                options.push(format!("{} = {}", ctx.kw("collation"), collation));
            }
            if let Some(canonical) = canonical {
                options.push(format!("{} = {}", ctx.kw("canonical"), canonical));
            }
            if let Some(diff) = subtype_diff {
                options.push(format!("{} = {}", ctx.kw("subtype_diff"), diff));
            }
            if let Some(multirange) = multirange_type_name {
                options.push(format!("{} = {}", ctx.kw("multirange_type_name"), multirange));
            }
            format!(
                "{} {} {} {}",
                ctx.kw("CREATE TYPE"),
                name,
                ctx.kw("AS RANGE"),
                ctx.paren_list(&options)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::custom_type::EnumLabel;

    fn status_enum(labels: &[&str]) -> TypeDef {
        TypeDef {
            schema: "public".into(),
            name: "status".into(),
            owner: "postgres".into(),
            kind: TypeKind::Enum {
                labels: labels
                    .iter()
                    .enumerate()
                    .map(|(i, l)| EnumLabel {
                        name: l.to_string(),
                        sort_order: i as f64 + 1.0,
                    })
                    .collect(),
            },
            comment: None,
            privileges: Vec::new(),
        }
    }

    #[test]
    fn test_create_enum() {
        let change = TypeChange::Create {
            type_def: status_enum(&["a", "c"]),
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "CREATE TYPE public.status AS ENUM ('a', 'c')"
        );
    }

    #[test]
    fn test_add_value_positions() {
        let before = TypeChange::AddEnumValue {
            schema: "public".into(),
            name: "status".into(),
            value: "b".into(),
            position: EnumValuePosition::Before("c".into()),
        };
        assert_eq!(
            before.emit(&EmitContext::plain()).unwrap(),
            "ALTER TYPE public.status ADD VALUE 'b' BEFORE 'c'"
        );

        let last = TypeChange::AddEnumValue {
            schema: "public".into(),
            name: "status".into(),
            value: "z".into(),
            position: EnumValuePosition::Last,
        };
        assert_eq!(
            last.emit(&EmitContext::plain()).unwrap(),
            "ALTER TYPE public.status ADD VALUE 'z'"
        );
    }
}
