use crate::catalog::id::ObjectId;
use crate::catalog::sequence::Sequence;
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum SequenceFacet {
    AsType(String),
    Increment(i64),
    MinValue(i64),
    MaxValue(i64),
    Start(i64),
    Cache(i64),
    Cycle(bool),
}

#[derive(Debug, Clone)]
pub enum SequenceChange {
    Create {
        sequence: Sequence,
    },
    Drop {
        schema: String,
        name: String,
    },
    /// All changed numeric facets fused into one ALTER SEQUENCE statement.
    Alter {
        schema: String,
        name: String,
        facets: Vec<SequenceFacet>,
    },
    /// Ownership is deferred to its own statement so a sequence can be created
    /// before the table whose column it will belong to.
    SetOwnedBy {
        schema: String,
        name: String,
        owned_by: Option<String>,
    },
}

fn facet_sql(ctx: &EmitContext, facet: &SequenceFacet) -> String {
    match facet {
        SequenceFacet::AsType(data_type) => format!("{} {}", ctx.kw("AS"), data_type),
        SequenceFacet::Increment(v) => format!("{} {}", ctx.kw("INCREMENT BY"), v),
        SequenceFacet::MinValue(v) => format!("{} {}", ctx.kw("MINVALUE"), v),
        SequenceFacet::MaxValue(v) => format!("{} {}", ctx.kw("MAXVALUE"), v),
        SequenceFacet::Start(v) => format!("{} {}", ctx.kw("START WITH"), v),
        SequenceFacet::Cache(v) => format!("{} {}", ctx.kw("CACHE"), v),
        SequenceFacet::Cycle(true) => ctx.kw("CYCLE"),
        SequenceFacet::Cycle(false) => ctx.kw("NO CYCLE"),
    }
}

/// Renders `schema.table.column` ownership as a qualified identifier chain.
fn owned_by_target(owned_by: &str) -> String {
    let parts: Vec<&str> = owned_by.splitn(3, '.').collect();
    if parts.len() == 3 {
        format!(
            "{}.{}.{}",
            quote_ident(parts[0]),
            quote_ident(parts[1]),
            quote_ident(parts[2])
        )
    } else {
        owned_by.to_string()
    }
}

impl ChangeKind for SequenceChange {
    fn object_type(&self) -> &'static str {
        "sequence"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::Alter { .. } | Self::SetOwnedBy { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let (schema, name) = match self {
            Self::Create { sequence } => (&sequence.schema, &sequence.name),
            Self::Drop { schema, name }
            | Self::Alter { schema, name, .. }
            | Self::SetOwnedBy { schema, name, .. } => (schema, name),
        };
        ObjectId::Sequence {
            schema: schema.clone(),
            name: name.clone(),
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
            Self::Create { sequence } => vec![ObjectId::Schema {
                name: sequence.schema.clone(),
            }],
            Self::Drop { .. } => Vec::new(),
            Self::Alter { .. } => vec![self.target()],
            Self::SetOwnedBy { owned_by, .. } => {
                let mut requires = vec![self.target()];
                if let Some(owned_by) = owned_by {
                    let parts: Vec<&str> = owned_by.splitn(3, '.').collect();
                    if parts.len() == 3 {
                        requires.push(ObjectId::Column {
                            schema: parts[0].to_string(),
                            table: parts[1].to_string(),
                            name: parts[2].to_string(),
                        });
                    }
                }
                requires
            }
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
            Self::Create { sequence } => {
                let mut sql = format!(
                    "{} {} {} {}",
                    ctx.kw("CREATE SEQUENCE"),
                    quote_qualified(&sequence.schema, &sequence.name),
                    ctx.kw("AS"),
                    sequence.data_type
                );
                sql.push_str(&format!(
                    " {} {} {} {} {} {} {} {} {} {}",
                    ctx.kw("INCREMENT BY"),
                    sequence.increment,
                    ctx.kw("MINVALUE"),
                    sequence.min_value,
                    ctx.kw("MAXVALUE"),
                    sequence.max_value,
                    ctx.kw("START WITH"),
                    sequence.start_value,
                    ctx.kw("CACHE"),
                    sequence.cache
                ));
                if sequence.cycle {
                    sql.push_str(&format!(" {}", ctx.kw("CYCLE")));
                }
                sql
            }
            Self::Drop { schema, name } => format!(
                "{} {}",
                ctx.kw("DROP SEQUENCE"),
                quote_qualified(schema, name)
            ),
            Self::Alter {
                schema,
                name,
                facets,
            } => {
                let clauses: Vec<String> = facets.iter().map(|f| facet_sql(ctx, f)).collect();
                format!(
                    "{} {} {}",
                    ctx.kw("ALTER SEQUENCE"),
                    quote_qualified(schema, name),
                    clauses.join(" ")
                )
            }
            Self::SetOwnedBy {
                schema,
                name,
                owned_by,
            } => {
                let owner_sql = match owned_by {
                    Some(owned_by) => owned_by_target(owned_by),
                    None => ctx.kw("NONE"),
                };
                format!(
                    "{} {} {} {}",
                    ctx.kw("ALTER SEQUENCE"),
                    quote_qualified(schema, name),
                    ctx.kw("OWNED BY"),
                    owner_sql
                )
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_id_seq() -> Sequence {
        Sequence {
            schema: "public".into(),
            name: "users_id_seq".into(),
            owner: "postgres".into(),
            data_type: "bigint".into(),
            increment: 1,
            min_value: 1,
            max_value: 9223372036854775807,
            start_value: 1,
            cache: 1,
            cycle: false,
            owned_by: Some("public.users.id".into()),
            comment: None,
            privileges: Vec::new(),
        }
    }

    #[test]
    fn test_create_sequence() {
        let change = SequenceChange::Create {
            sequence: users_id_seq(),
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "CREATE SEQUENCE public.users_id_seq AS bigint INCREMENT BY 1 MINVALUE 1 \
             MAXVALUE 9223372036854775807 START WITH 1 CACHE 1"
        );
    }

    #[test]
    fn test_set_owned_by() {
        let change = SequenceChange::SetOwnedBy {
            schema: "public".into(),
            name: "users_id_seq".into(),
            owned_by: Some("public.users.id".into()),
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "ALTER SEQUENCE public.users_id_seq OWNED BY public.users.id"
        );
        assert!(change.requires().contains(&ObjectId::Column {
            schema: "public".into(),
            table: "users".into(),
            name: "id".into()
        }));
    }

    #[test]
    fn test_owned_by_none() {
        let change = SequenceChange::SetOwnedBy {
            schema: "public".into(),
            name: "orphan_seq".into(),
            owned_by: None,
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "ALTER SEQUENCE public.orphan_seq OWNED BY NONE"
        );
    }
}
