//! Changes for foreign-data wrappers, servers, user mappings and foreign
//! tables. Option values whose keys look secret are masked with typed
//! placeholders and surfaced through `sensitive_info`.

use crate::catalog::foreign::{ForeignDataWrapper, ForeignTable, Server, UserMapping};
use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_literal, quote_qualified};
use crate::change::table::column_definition;
use crate::change::{ChangeKind, EmitContext, Operation, Scope, SensitiveField};
use crate::error::EmitError;

pub(crate) fn is_sensitive_key(key: &str) -> bool {
    key.to_ascii_lowercase().contains("password")
}

pub(crate) fn sensitive_placeholder(key: &str) -> String {
    format!("__SENSITIVE_{}__", key.to_ascii_uppercase())
}

fn masked_value(key: &str, value: &str) -> String {
    if is_sensitive_key(key) {
        quote_literal(&sensitive_placeholder(key))
    } else {
        quote_literal(value)
    }
}

fn sensitive_fields(options: &[(String, String)]) -> Vec<SensitiveField> {
    options
        .iter()
        .filter(|(key, _)| is_sensitive_key(key))
        .map(|(key, _)| SensitiveField {
            key: key.clone(),
            placeholder: sensitive_placeholder(key),
        })
        .collect()
}

fn options_clause(ctx: &EmitContext, options: &[(String, String)]) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let rendered: Vec<String> = options
        .iter()
        .map(|(key, value)| format!("{key} {}", masked_value(key, value)))
        .collect();
    Some(format!("{} ({})", ctx.kw("OPTIONS"), rendered.join(", ")))
}

/// Prefixes a warning line when the statement contains masked secrets.
pub(crate) fn with_sensitive_warning(sql: String, sensitive: &[SensitiveField]) -> String {
    if sensitive.is_empty() {
        sql
    } else {
        format!("-- contains masked secrets; substitute placeholders before running\n{sql}")
    }
}

/// Option edits fused into one `OPTIONS (ADD …, SET …, DROP …)` clause.
#[derive(Debug, Clone, Default)]
pub struct OptionsDelta {
    pub add: Vec<(String, String)>,
    pub set: Vec<(String, String)>,
    pub drop: Vec<String>,
}

impl OptionsDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.set.is_empty() && self.drop.is_empty()
    }

    fn clause(&self, ctx: &EmitContext) -> String {
        let mut parts = Vec::new();
        for (key, value) in &self.add {
            parts.push(format!("{} {key} {}", ctx.kw("ADD"), masked_value(key, value)));
        }
        for (key, value) in &self.set {
            parts.push(format!("{} {key} {}", ctx.kw("SET"), masked_value(key, value)));
        }
        for key in &self.drop {
            parts.push(format!("{} {key}", ctx.kw("DROP")));
        }
        format!("{} ({})", ctx.kw("OPTIONS"), parts.join(", "))
    }

    fn sensitive(&self) -> Vec<SensitiveField> {
        let mut fields = sensitive_fields(&self.add);
        fields.extend(sensitive_fields(&self.set));
        fields
    }
}

#[derive(Debug, Clone)]
pub enum FdwChange {
    Create { wrapper: ForeignDataWrapper },
    Drop { name: String },
    Options { name: String, delta: OptionsDelta },
}

impl ChangeKind for FdwChange {
    fn object_type(&self) -> &'static str {
        "foreign_data_wrapper"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::Options { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let name = match self {
            Self::Create { wrapper } => &wrapper.name,
            Self::Drop { name } | Self::Options { name, .. } => name,
        };
        ObjectId::ForeignDataWrapper { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Options { .. } => vec![self.target()],
            _ => Vec::new(),
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
            Self::Create { wrapper } => {
                let mut sql = format!(
                    "{} {}",
                    ctx.kw("CREATE FOREIGN DATA WRAPPER"),
                    quote_ident(&wrapper.name)
                );
                if let Some(handler) = &wrapper.handler {
                    sql.push_str(&format!(" {} {handler}", ctx.kw("HANDLER")));
                }
                if let Some(validator) = &wrapper.validator {
                    sql.push_str(&format!(" {} {validator}", ctx.kw("VALIDATOR")));
                }
                if let Some(options) = options_clause(ctx, &wrapper.options) {
                    sql.push_str(&format!(" {options}"));
                }
                sql
            }
            Self::Drop { name } => format!(
                "{} {}",
                ctx.kw("DROP FOREIGN DATA WRAPPER"),
                quote_ident(name)
            ),
            Self::Options { name, delta } => format!(
                "{} {} {}",
                ctx.kw("ALTER FOREIGN DATA WRAPPER"),
                quote_ident(name),
                delta.clause(ctx)
            ),
        };
        Ok(with_sensitive_warning(sql, &self.sensitive_info()))
    }

    fn sensitive_info(&self) -> Vec<SensitiveField> {
        match self {
            Self::Create { wrapper } => sensitive_fields(&wrapper.options),
            Self::Options { delta, .. } => delta.sensitive(),
            Self::Drop { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ServerChange {
    Create {
        server: Server,
    },
    Drop {
        name: String,
    },
    Options {
        name: String,
        delta: OptionsDelta,
    },
    SetVersion {
        name: String,
        version: String,
    },
}

impl ChangeKind for ServerChange {
    fn object_type(&self) -> &'static str {
        "server"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::Options { .. } | Self::SetVersion { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let name = match self {
            Self::Create { server } => &server.name,
            Self::Drop { name } | Self::Options { name, .. } | Self::SetVersion { name, .. } => {
                name
            }
        };
        ObjectId::Server { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { server } => vec![ObjectId::ForeignDataWrapper {
                name: server.wrapper.clone(),
            }],
            Self::Options { .. } | Self::SetVersion { .. } => vec![self.target()],
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
        let sql = match self {
            Self::Create { server } => {
                let mut sql = format!("{} {}", ctx.kw("CREATE SERVER"), quote_ident(&server.name));
                if let Some(server_type) = &server.server_type {
                    sql.push_str(&format!(" {} {}", ctx.kw("TYPE"), quote_literal(server_type)));
                }
                if let Some(version) = &server.version {
                    sql.push_str(&format!(" {} {}", ctx.kw("VERSION"), quote_literal(version)));
                }
                sql.push_str(&format!(
                    " {} {}",
                    ctx.kw("FOREIGN DATA WRAPPER"),
                    quote_ident(&server.wrapper)
                ));
                if let Some(options) = options_clause(ctx, &server.options) {
                    sql.push_str(&format!(" {options}"));
                }
                sql
            }
            Self::Drop { name } => format!("{} {}", ctx.kw("DROP SERVER"), quote_ident(name)),
            Self::Options { name, delta } => format!(
                "{} {} {}",
                ctx.kw("ALTER SERVER"),
                quote_ident(name),
                delta.clause(ctx)
            ),
            Self::SetVersion { name, version } => format!(
                "{} {} {} {}",
                ctx.kw("ALTER SERVER"),
                quote_ident(name),
                ctx.kw("VERSION"),
                quote_literal(version)
            ),
        };
        Ok(with_sensitive_warning(sql, &self.sensitive_info()))
    }

    fn sensitive_info(&self) -> Vec<SensitiveField> {
        match self {
            Self::Create { server } => sensitive_fields(&server.options),
            Self::Options { delta, .. } => delta.sensitive(),
            _ => Vec::new(),
        }
    }
}

fn mapping_user_clause(user: &str) -> String {
    match user {
        "PUBLIC" | "CURRENT_USER" | "CURRENT_ROLE" => user.to_string(),
        other => quote_ident(other),
    }
}

#[derive(Debug, Clone)]
pub enum UserMappingChange {
    Create {
        mapping: UserMapping,
    },
    Drop {
        server: String,
        user: String,
    },
    Options {
        server: String,
        user: String,
        delta: OptionsDelta,
    },
}

impl ChangeKind for UserMappingChange {
    fn object_type(&self) -> &'static str {
        "user_mapping"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::Options { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let (server, user) = match self {
            Self::Create { mapping } => (&mapping.server, &mapping.user),
            Self::Drop { server, user } | Self::Options { server, user, .. } => (server, user),
        };
        ObjectId::UserMapping {
            server: server.clone(),
            user: user.clone(),
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
            Self::Create { mapping } => {
                let mut requires = vec![ObjectId::Server {
                    name: mapping.server.clone(),
                }];
                if !matches!(
                    mapping.user.as_str(),
                    "PUBLIC" | "CURRENT_USER" | "CURRENT_ROLE"
                ) {
                    requires.push(ObjectId::Role {
                        name: mapping.user.clone(),
                    });
                }
                requires
            }
            Self::Options { .. } => vec![self.target()],
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
        let sql = match self {
            Self::Create { mapping } => {
                let mut sql = format!(
                    "{} {} {} {}",
                    ctx.kw("CREATE USER MAPPING FOR"),
                    mapping_user_clause(&mapping.user),
                    ctx.kw("SERVER"),
                    quote_ident(&mapping.server)
                );
                if let Some(options) = options_clause(ctx, &mapping.options) {
                    sql.push_str(&format!(" {options}"));
                }
                sql
            }
            Self::Drop { server, user } => format!(
                "{} {} {} {}",
                ctx.kw("DROP USER MAPPING FOR"),
                mapping_user_clause(user),
                ctx.kw("SERVER"),
                quote_ident(server)
            ),
            Self::Options {
                server,
                user,
                delta,
            } => format!(
                "{} {} {} {} {}",
                ctx.kw("ALTER USER MAPPING FOR"),
                mapping_user_clause(user),
                ctx.kw("SERVER"),
                quote_ident(server),
                delta.clause(ctx)
            ),
        };
        Ok(with_sensitive_warning(sql, &self.sensitive_info()))
    }

    fn sensitive_info(&self) -> Vec<SensitiveField> {
        match self {
            Self::Create { mapping } => sensitive_fields(&mapping.options),
            Self::Options { delta, .. } => delta.sensitive(),
            Self::Drop { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ForeignTableChange {
    Create {
        table: ForeignTable,
    },
    Drop {
        schema: String,
        name: String,
    },
    Options {
        schema: String,
        name: String,
        delta: OptionsDelta,
    },
}

impl ChangeKind for ForeignTableChange {
    fn object_type(&self) -> &'static str {
        "foreign_table"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::Options { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        match self {
            Self::Create { table } => ObjectId::ForeignTable {
                schema: table.schema.clone(),
                name: table.name.clone(),
            },
            Self::Drop { schema, name } | Self::Options { schema, name, .. } => {
                ObjectId::ForeignTable {
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
            Self::Create { table } => vec![
                ObjectId::Schema {
                    name: table.schema.clone(),
                },
                ObjectId::Server {
                    name: table.server.clone(),
                },
            ],
            Self::Options { .. } => vec![self.target()],
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
        let sql = match self {
            Self::Create { table } => {
                let columns: Vec<String> = table
                    .columns
                    .iter()
                    .map(|c| column_definition(ctx, c))
                    .collect();
                let mut sql = format!(
                    "{} {} {} {} {}",
                    ctx.kw("CREATE FOREIGN TABLE"),
                    quote_qualified(&table.schema, &table.name),
                    ctx.paren_list(&columns),
                    ctx.kw("SERVER"),
                    quote_ident(&table.server)
                );
                if let Some(options) = options_clause(ctx, &table.options) {
                    sql.push_str(&format!(" {options}"));
                }
                sql
            }
            Self::Drop { schema, name } => format!(
                "{} {}",
                ctx.kw("DROP FOREIGN TABLE"),
                quote_qualified(schema, name)
            ),
            Self::Options {
                schema,
                name,
                delta,
            } => format!(
                "{} {} {}",
                ctx.kw("ALTER FOREIGN TABLE"),
                quote_qualified(schema, name),
                delta.clause(ctx)
            ),
        };
        Ok(with_sensitive_warning(sql, &self.sensitive_info()))
    }

    fn sensitive_info(&self) -> Vec<SensitiveField> {
        match self {
            Self::Create { table } => sensitive_fields(&table.options),
            Self::Options { delta, .. } => delta.sensitive(),
            Self::Drop { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_mapping_masks_password() {
        let change = UserMappingChange::Create {
            mapping: UserMapping {
                server: "warehouse".into(),
                user: "analyst".into(),
                options: vec![
                    ("user".into(), "analyst".into()),
                    ("password".into(), "hunter2".into()),
                ],
            },
        };
        let sql = change.emit(&EmitContext::plain()).unwrap();
        assert!(sql.starts_with("-- contains masked secrets"));
        assert!(sql.contains("password '__SENSITIVE_PASSWORD__'"));
        assert!(!sql.contains("hunter2"));
        assert_eq!(
            change.sensitive_info(),
            vec![SensitiveField {
                key: "password".into(),
                placeholder: "__SENSITIVE_PASSWORD__".into()
            }]
        );
    }

    #[test]
    fn test_server_options_delta() {
        let change = ServerChange::Options {
            name: "warehouse".into(),
            delta: OptionsDelta {
                add: vec![("fetch_size".into(), "1000".into())],
                set: vec![("host".into(), "db.internal".into())],
                drop: vec!["use_remote_estimate".into()],
            },
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "ALTER SERVER warehouse OPTIONS (ADD fetch_size '1000', SET host 'db.internal', \
             DROP use_remote_estimate)"
        );
    }
}
