use crate::catalog::id::ObjectId;
use crate::catalog::role::Role;
use crate::change::quote::{quote_ident, quote_literal};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

/// One alterable role facet per variant, so every statement stays atomic.
#[derive(Debug, Clone)]
pub enum RoleFacet {
    Login(bool),
    Superuser(bool),
    CreateDb(bool),
    CreateRole(bool),
    Inherit(bool),
    Replication(bool),
    BypassRls(bool),
    ConnectionLimit(i64),
    ValidUntil(Option<String>),
    Set { parameter: String, value: String },
    Reset { parameter: String },
}

#[derive(Debug, Clone)]
pub enum RoleChange {
    Create { role: Role },
    Drop { name: String },
    Alter { name: String, facet: RoleFacet },
}

fn role_options(role: &Role) -> Vec<String> {
    let mut options = Vec::new();
    if role.superuser {
        options.push("SUPERUSER".to_string());
    }
    if role.create_db {
        options.push("CREATEDB".to_string());
    }
    if role.create_role {
        options.push("CREATEROLE".to_string());
    }
    if !role.inherit {
        options.push("NOINHERIT".to_string());
    }
    if role.login {
        options.push("LOGIN".to_string());
    }
    if role.replication {
        options.push("REPLICATION".to_string());
    }
    if role.bypass_rls {
        options.push("BYPASSRLS".to_string());
    }
    if role.connection_limit >= 0 {
        options.push(format!("CONNECTION LIMIT {}", role.connection_limit));
    }
    if let Some(until) = &role.valid_until {
        options.push(format!("VALID UNTIL {}", quote_literal(until)));
    }
    options
}

fn facet_sql(facet: &RoleFacet) -> String {
    fn toggle(on: bool, yes: &str, no: &str) -> String {
        if on { yes.to_string() } else { no.to_string() }
    }

    match facet {
        RoleFacet::Login(on) => toggle(*on, "LOGIN", "NOLOGIN"),
        RoleFacet::Superuser(on) => toggle(*on, "SUPERUSER", "NOSUPERUSER"),
        RoleFacet::CreateDb(on) => toggle(*on, "CREATEDB", "NOCREATEDB"),
        RoleFacet::CreateRole(on) => toggle(*on, "CREATEROLE", "NOCREATEROLE"),
        RoleFacet::Inherit(on) => toggle(*on, "INHERIT", "NOINHERIT"),
        RoleFacet::Replication(on) => toggle(*on, "REPLICATION", "NOREPLICATION"),
        RoleFacet::BypassRls(on) => toggle(*on, "BYPASSRLS", "NOBYPASSRLS"),
        RoleFacet::ConnectionLimit(limit) => format!("CONNECTION LIMIT {limit}"),
        RoleFacet::ValidUntil(Some(until)) => format!("VALID UNTIL {}", quote_literal(until)),
        RoleFacet::ValidUntil(None) => "VALID UNTIL 'infinity'".to_string(),
        RoleFacet::Set { parameter, value } => format!("SET {parameter} = {value}"),
        RoleFacet::Reset { parameter } => format!("RESET {parameter}"),
    }
}

impl ChangeKind for RoleChange {
    fn object_type(&self) -> &'static str {
        "role"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
            Self::Alter { .. } => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let name = match self {
            Self::Create { role } => &role.name,
            Self::Drop { name } | Self::Alter { name, .. } => name,
        };
        ObjectId::Role { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Alter { .. } => vec![self.target()],
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
        Ok(match self {
            Self::Create { role } => {
                let options = role_options(role);
                if options.is_empty() {
                    format!("{} {}", ctx.kw("CREATE ROLE"), quote_ident(&role.name))
                } else {
                    format!(
                        "{} {} {} {}",
                        ctx.kw("CREATE ROLE"),
                        quote_ident(&role.name),
                        ctx.kw("WITH"),
                        options.join(" ")
                    )
                }
            }
            Self::Drop { name } => format!("{} {}", ctx.kw("DROP ROLE"), quote_ident(name)),
            Self::Alter { name, facet } => format!(
                "{} {} {}",
                ctx.kw("ALTER ROLE"),
                quote_ident(name),
                facet_sql(facet)
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_with_options() {
        let mut role = Role::new("app_user");
        role.login = true;
        role.connection_limit = 10;
        let change = RoleChange::Create { role };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "CREATE ROLE app_user WITH LOGIN CONNECTION LIMIT 10"
        );
    }

    #[test]
    fn test_alter_role_facet() {
        let change = RoleChange::Alter {
            name: "app_user".into(),
            facet: RoleFacet::Login(false),
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "ALTER ROLE app_user NOLOGIN"
        );
    }
}
