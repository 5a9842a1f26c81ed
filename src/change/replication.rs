//! Publication and subscription changes. Subscription connection strings are
//! masked before they reach a plan: the emitted SQL carries a typed
//! placeholder and the real secret never leaves the catalog.

use crate::catalog::id::ObjectId;
use crate::catalog::replication::{Publication, Subscription};
use crate::change::foreign::with_sensitive_warning;
use crate::change::quote::{quote_ident, quote_literal, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope, SensitiveField};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum PublicationChange {
    Create {
        publication: Publication,
    },
    Drop {
        name: String,
    },
    SetTables {
        name: String,
        tables: Vec<String>,
    },
    SetOptions {
        name: String,
        publish: Vec<String>,
        via_partition_root: bool,
    },
}

fn table_list(tables: &[String]) -> String {
    tables
        .iter()
        .map(|entry| match entry.split_once('.') {
            Some((schema, name)) => quote_qualified(schema, name),
            None => quote_ident(entry),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn table_ids(tables: &[String]) -> Vec<ObjectId> {
    tables
        .iter()
        .filter_map(|entry| {
            entry.split_once('.').map(|(schema, name)| ObjectId::Table {
                schema: schema.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

impl ChangeKind for PublicationChange {
    fn object_type(&self) -> &'static str {
        "publication"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::SetTables { .. } | Self::SetOptions { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let name = match self {
            Self::Create { publication } => &publication.name,
            Self::Drop { name }
            | Self::SetTables { name, .. }
            | Self::SetOptions { name, .. } => name,
        };
        ObjectId::Publication { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { publication } => table_ids(&publication.tables),
            Self::SetTables { tables, .. } => {
                let mut requires = vec![self.target()];
                requires.extend(table_ids(tables));
                requires
            }
            Self::SetOptions { .. } => vec![self.target()],
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
            Self::Create { publication } => {
                let mut sql = format!(
                    "{} {}",
                    ctx.kw("CREATE PUBLICATION"),
                    quote_ident(&publication.name)
                );
                if publication.all_tables {
                    sql.push_str(&format!(" {}", ctx.kw("FOR ALL TABLES")));
                } else if !publication.tables.is_empty() {
                    sql.push_str(&format!(
                        " {} {}",
                        ctx.kw("FOR TABLE"),
                        table_list(&publication.tables)
                    ));
                }
                let mut with = Vec::new();
                if !publication.publish.is_empty() {
                    with.push(format!(
                        "{} = {}",
                        ctx.kw("publish"),
                        quote_literal(&publication.publish.join(", "))
                    ));
                }
                if publication.via_partition_root {
                    with.push(format!("{} = true", ctx.kw("publish_via_partition_root")));
                }
                if !with.is_empty() {
                    sql.push_str(&format!(" {} ({})", ctx.kw("WITH"), with.join(", ")));
                }
                sql
            }
            Self::Drop { name } => {
                format!("{} {}", ctx.kw("DROP PUBLICATION"), quote_ident(name))
            }
            Self::SetTables { name, tables } => format!(
                "{} {} {} {}",
                ctx.kw("ALTER PUBLICATION"),
                quote_ident(name),
                ctx.kw("SET TABLE"),
                table_list(tables)
            ),
            Self::SetOptions {
                name,
                publish,
                via_partition_root,
            } => format!(
                "{} {} {} ({} = {}, {} = {})",
                ctx.kw("ALTER PUBLICATION"),
                quote_ident(name),
                ctx.kw("SET"),
                ctx.kw("publish"),
                quote_literal(&publish.join(", ")),
                ctx.kw("publish_via_partition_root"),
                via_partition_root
            ),
        })
    }
}

/// Replaces `password=…` fields inside a conninfo string.
pub(crate) fn mask_conninfo(conninfo: &str) -> (String, Vec<SensitiveField>) {
    let mut sensitive = Vec::new();
    let masked: Vec<String> = conninfo
        .split_whitespace()
        .map(|token| {
            if token
                .to_ascii_lowercase()
                .starts_with("password=")
            {
                sensitive.push(SensitiveField {
                    key: "password".to_string(),
                    placeholder: "__SENSITIVE_PASSWORD__".to_string(),
                });
                "password=__SENSITIVE_PASSWORD__".to_string()
            } else {
                token.to_string()
            }
        })
        .collect();
    (masked.join(" "), sensitive)
}

#[derive(Debug, Clone)]
pub enum SubscriptionChange {
    Create {
        subscription: Subscription,
    },
    Drop {
        name: String,
    },
    SetConninfo {
        name: String,
        conninfo: String,
    },
    SetPublications {
        name: String,
        publications: Vec<String>,
    },
    SetEnabled {
        name: String,
        enabled: bool,
    },
    SetOption {
        name: String,
        option: String,
        value: String,
    },
}

impl ChangeKind for SubscriptionChange {
    fn object_type(&self) -> &'static str {
        "subscription"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            _ => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let name = match self {
            Self::Create { subscription } => &subscription.name,
            Self::Drop { name }
            | Self::SetConninfo { name, .. }
            | Self::SetPublications { name, .. }
            | Self::SetEnabled { name, .. }
            | Self::SetOption { name, .. } => name,
        };
        ObjectId::Subscription { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } | Self::Drop { .. } => Vec::new(),
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
        let sql = match self {
            Self::Create { subscription } => {
                let (conninfo, _) = mask_conninfo(&subscription.conninfo);
                let publications: Vec<String> = subscription
                    .publications
                    .iter()
                    .map(|p| quote_ident(p))
                    .collect();
                let mut with = Vec::new();
                if !subscription.enabled {
                    with.push(format!("{} = false", ctx.kw("enabled")));
                }
                if let Some(slot) = &subscription.slot_name {
                    with.push(format!("{} = {}", ctx.kw("slot_name"), quote_literal(slot)));
                }
                if let Some(commit) = &subscription.synchronous_commit {
                    with.push(format!(
                        "{} = {}",
                        ctx.kw("synchronous_commit"),
                        quote_literal(commit)
                    ));
                }
                if subscription.two_phase {
                    with.push(format!("{} = true", ctx.kw("two_phase")));
                }
                let mut sql = format!(
                    "{} {} {} {} {} {}",
                    ctx.kw("CREATE SUBSCRIPTION"),
                    quote_ident(&subscription.name),
                    ctx.kw("CONNECTION"),
                    quote_literal(&conninfo),
                    ctx.kw("PUBLICATION"),
                    publications.join(", ")
                );
                if !with.is_empty() {
                    sql.push_str(&format!(" {} ({})", ctx.kw("WITH"), with.join(", ")));
                }
                sql
            }
            Self::Drop { name } => {
                format!("{} {}", ctx.kw("DROP SUBSCRIPTION"), quote_ident(name))
            }
            Self::SetConninfo { name, conninfo } => {
                let (conninfo, _) = mask_conninfo(conninfo);
                format!(
                    "{} {} {} {}",
                    ctx.kw("ALTER SUBSCRIPTION"),
                    quote_ident(name),
                    ctx.kw("CONNECTION"),
                    quote_literal(&conninfo)
                )
            }
            Self::SetPublications { name, publications } => {
                let publications: Vec<String> =
                    publications.iter().map(|p| quote_ident(p)).collect();
                format!(
                    "{} {} {} {}",
                    ctx.kw("ALTER SUBSCRIPTION"),
                    quote_ident(name),
                    ctx.kw("SET PUBLICATION"),
                    publications.join(", ")
                )
            }
            Self::SetEnabled { name, enabled } => format!(
                "{} {} {}",
                ctx.kw("ALTER SUBSCRIPTION"),
                quote_ident(name),
                if *enabled {
                    ctx.kw("ENABLE")
                } else {
                    ctx.kw("DISABLE")
                }
            ),
            Self::SetOption {
                name,
                option,
                value,
            } => format!(
                "{} {} {} ({option} = {value})",
                ctx.kw("ALTER SUBSCRIPTION"),
                quote_ident(name),
                ctx.kw("SET")
            ),
        };
        Ok(with_sensitive_warning(sql, &self.sensitive_info()))
    }

    fn sensitive_info(&self) -> Vec<SensitiveField> {
        match self {
            Self::Create { subscription } => mask_conninfo(&subscription.conninfo).1,
            Self::SetConninfo { conninfo, .. } => mask_conninfo(conninfo).1,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_conninfo_is_masked() {
        let change = SubscriptionChange::Create {
            subscription: Subscription {
                name: "upstream".into(),
                owner: "postgres".into(),
                conninfo: "host=primary dbname=app password=hunter2".into(),
                publications: vec!["app_pub".into()],
                enabled: true,
                slot_name: None,
                synchronous_commit: None,
                two_phase: false,
                comment: None,
            },
        };
        let sql = change.emit(&EmitContext::plain()).unwrap();
        assert!(sql.starts_with("-- contains masked secrets"));
        assert!(sql.contains("password=__SENSITIVE_PASSWORD__"));
        assert!(!sql.contains("hunter2"));
    }

    #[test]
    fn test_publication_tables_require_tables() {
        let change = PublicationChange::Create {
            publication: Publication {
                name: "app_pub".into(),
                owner: "postgres".into(),
                all_tables: false,
                tables: vec!["public.users".into()],
                publish: vec!["insert".into(), "update".into()],
                via_partition_root: false,
                comment: None,
            },
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "CREATE PUBLICATION app_pub FOR TABLE public.users WITH (publish = 'insert, update')"
        );
        assert!(change.requires().contains(&ObjectId::Table {
            schema: "public".into(),
            name: "users".into()
        }));
    }
}
