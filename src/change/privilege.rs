//! GRANT/REVOKE changes: object privileges, default privileges and role
//! memberships. Each grant or revoke is modeled as creating or dropping a
//! virtual ACL identity, which is what lets the sorter place grants after
//! creates and revokes with the other teardown work.

use crate::catalog::acl::PUBLIC;
use crate::catalog::id::ObjectId;
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

fn grantee_clause(grantee: &str) -> String {
    if grantee == PUBLIC {
        "PUBLIC".to_string()
    } else {
        quote_ident(grantee)
    }
}

/// Renders the `ON <KIND> <identifier>` clause of GRANT/REVOKE. Relations of
/// every flavor use the TABLE keyword, matching what PostgreSQL itself prints.
fn privilege_object(id: &ObjectId) -> Result<String, EmitError> {
    let invalid = || EmitError::InvalidTarget {
        change: "privilege",
        target: id.to_string(),
    };

    Ok(match id {
        ObjectId::Table { schema, name }
        | ObjectId::View { schema, name }
        | ObjectId::MaterializedView { schema, name }
        | ObjectId::ForeignTable { schema, name } => {
            format!("TABLE {}", quote_qualified(schema, name))
        }
        ObjectId::Sequence { schema, name } => {
            format!("SEQUENCE {}", quote_qualified(schema, name))
        }
        ObjectId::Schema { name } => format!("SCHEMA {}", quote_ident(name)),
        ObjectId::Function {
            schema,
            name,
            arguments,
        } => format!("FUNCTION {}({arguments})", quote_qualified(schema, name)),
        ObjectId::Procedure {
            schema,
            name,
            arguments,
        } => format!("PROCEDURE {}({arguments})", quote_qualified(schema, name)),
        ObjectId::Aggregate {
            schema,
            name,
            arguments,
        } => format!("FUNCTION {}({arguments})", quote_qualified(schema, name)),
        ObjectId::Type { schema, name } => format!("TYPE {}", quote_qualified(schema, name)),
        ObjectId::Domain { schema, name } => format!("DOMAIN {}", quote_qualified(schema, name)),
        ObjectId::Language { name } => format!("LANGUAGE {}", quote_ident(name)),
        ObjectId::ForeignDataWrapper { name } => {
            format!("FOREIGN DATA WRAPPER {}", quote_ident(name))
        }
        ObjectId::Server { name } => format!("FOREIGN SERVER {}", quote_ident(name)),
        _ => return Err(invalid()),
    })
}

#[derive(Debug, Clone)]
pub enum PrivilegeChange {
    Grant {
        object: ObjectId,
        grantee: String,
        privileges: Vec<String>,
        grantable: bool,
    },
    Revoke {
        object: ObjectId,
        grantee: String,
        privileges: Vec<String>,
    },
    /// Downgrades a grantable privilege without revoking the privilege itself.
    RevokeGrantOption {
        object: ObjectId,
        grantee: String,
        privileges: Vec<String>,
    },
}

impl PrivilegeChange {
    fn object(&self) -> &ObjectId {
        match self {
            Self::Grant { object, .. }
            | Self::Revoke { object, .. }
            | Self::RevokeGrantOption { object, .. } => object,
        }
    }

    fn grantee(&self) -> &str {
        match self {
            Self::Grant { grantee, .. }
            | Self::Revoke { grantee, .. }
            | Self::RevokeGrantOption { grantee, .. } => grantee,
        }
    }
}

impl ChangeKind for PrivilegeChange {
    fn object_type(&self) -> &'static str {
        "privilege"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Grant { .. } => Operation::Create,
            Self::Revoke { .. } | Self::RevokeGrantOption { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Privilege
    }

    fn target(&self) -> ObjectId {
        self.object().clone().acl_for(self.grantee())
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Grant { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        let mut requires = vec![self.object().clone()];
        if self.grantee() != PUBLIC {
            requires.push(ObjectId::Role {
                name: self.grantee().to_string(),
            });
        }
        requires
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Revoke { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        let object = privilege_object(self.object())?;
        Ok(match self {
            Self::Grant {
                grantee,
                privileges,
                grantable,
                ..
            } => {
                let mut sql = format!(
                    "{} {} {} {object} {} {}",
                    ctx.kw("GRANT"),
                    privileges.join(", "),
                    ctx.kw("ON"),
                    ctx.kw("TO"),
                    grantee_clause(grantee)
                );
                if *grantable {
                    sql.push_str(&format!(" {}", ctx.kw("WITH GRANT OPTION")));
                }
                sql
            }
            Self::Revoke {
                grantee,
                privileges,
                ..
            } => format!(
                "{} {} {} {object} {} {}",
                ctx.kw("REVOKE"),
                privileges.join(", "),
                ctx.kw("ON"),
                ctx.kw("FROM"),
                grantee_clause(grantee)
            ),
            Self::RevokeGrantOption {
                grantee,
                privileges,
                ..
            } => format!(
                "{} {} {} {object} {} {}",
                ctx.kw("REVOKE GRANT OPTION FOR"),
                privileges.join(", "),
                ctx.kw("ON"),
                ctx.kw("FROM"),
                grantee_clause(grantee)
            ),
        })
    }
}

fn objtype_keyword(objtype: char) -> &'static str {
    match objtype {
        'r' => "TABLES",
        'S' => "SEQUENCES",
        'f' => "FUNCTIONS",
        'T' => "TYPES",
        'n' => "SCHEMAS",
        _ => "TABLES",
    }
}

#[derive(Debug, Clone)]
pub enum DefaultPrivilegeChange {
    Grant {
        grantor: String,
        objtype: char,
        schema: Option<String>,
        grantee: String,
        privileges: Vec<String>,
        grantable: bool,
    },
    Revoke {
        grantor: String,
        objtype: char,
        schema: Option<String>,
        grantee: String,
        privileges: Vec<String>,
    },
}

impl DefaultPrivilegeChange {
    pub fn objtype(&self) -> char {
        match self {
            Self::Grant { objtype, .. } | Self::Revoke { objtype, .. } => *objtype,
        }
    }

    pub fn schema(&self) -> Option<&str> {
        match self {
            Self::Grant { schema, .. } | Self::Revoke { schema, .. } => schema.as_deref(),
        }
    }

    fn parts(&self) -> (&str, Option<&str>, &str) {
        match self {
            Self::Grant {
                grantor,
                schema,
                grantee,
                ..
            }
            | Self::Revoke {
                grantor,
                schema,
                grantee,
                ..
            } => (grantor, schema.as_deref(), grantee),
        }
    }
}

impl ChangeKind for DefaultPrivilegeChange {
    fn object_type(&self) -> &'static str {
        "default_privilege"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Grant { .. } => Operation::Create,
            Self::Revoke { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Privilege
    }

    fn target(&self) -> ObjectId {
        let (grantor, schema, grantee) = self.parts();
        ObjectId::DefaultAcl {
            grantor: grantor.to_string(),
            objtype: self.objtype(),
            schema: schema.map(str::to_string),
            grantee: grantee.to_string(),
        }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Grant { .. } => vec![self.target()],
            Self::Revoke { .. } => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        let (grantor, schema, grantee) = self.parts();
        let mut requires = vec![ObjectId::Role {
            name: grantor.to_string(),
        }];
        if grantee != PUBLIC {
            requires.push(ObjectId::Role {
                name: grantee.to_string(),
            });
        }
        if let Some(schema) = schema {
            requires.push(ObjectId::Schema {
                name: schema.to_string(),
            });
        }
        requires
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Revoke { .. } => vec![self.target()],
            Self::Grant { .. } => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        let (grantor, schema, grantee) = self.parts();
        let mut sql = format!(
            "{} {}",
            ctx.kw("ALTER DEFAULT PRIVILEGES FOR ROLE"),
            quote_ident(grantor)
        );
        if let Some(schema) = schema {
            sql.push_str(&format!(" {} {}", ctx.kw("IN SCHEMA"), quote_ident(schema)));
        }
        sql.push(' ');
        match self {
            Self::Grant {
                privileges,
                grantable,
                ..
            } => {
                sql.push_str(&format!(
                    "{} {} {} {} {} {}",
                    ctx.kw("GRANT"),
                    privileges.join(", "),
                    ctx.kw("ON"),
                    objtype_keyword(self.objtype()),
                    ctx.kw("TO"),
                    grantee_clause(grantee)
                ));
                if *grantable {
                    sql.push_str(&format!(" {}", ctx.kw("WITH GRANT OPTION")));
                }
            }
            Self::Revoke { privileges, .. } => {
                sql.push_str(&format!(
                    "{} {} {} {} {} {}",
                    ctx.kw("REVOKE"),
                    privileges.join(", "),
                    ctx.kw("ON"),
                    objtype_keyword(self.objtype()),
                    ctx.kw("FROM"),
                    grantee_clause(grantee)
                ));
            }
        }
        Ok(sql)
    }
}

#[derive(Debug, Clone)]
pub enum MembershipChange {
    Grant { role: String, member: String },
    Revoke { role: String, member: String },
}

impl MembershipChange {
    fn parts(&self) -> (&str, &str) {
        match self {
            Self::Grant { role, member } | Self::Revoke { role, member } => (role, member),
        }
    }
}

impl ChangeKind for MembershipChange {
    fn object_type(&self) -> &'static str {
        "membership"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Grant { .. } => Operation::Create,
            Self::Revoke { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Membership
    }

    fn target(&self) -> ObjectId {
        let (role, member) = self.parts();
        ObjectId::Membership {
            role: role.to_string(),
            member: member.to_string(),
        }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Grant { .. } => vec![self.target()],
            Self::Revoke { .. } => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        let (role, member) = self.parts();
        vec![
            ObjectId::Role {
                name: role.to_string(),
            },
            ObjectId::Role {
                name: member.to_string(),
            },
        ]
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Revoke { .. } => vec![self.target()],
            Self::Grant { .. } => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        let (role, member) = self.parts();
        Ok(match self {
            Self::Grant { .. } => format!(
                "{} {} {} {}",
                ctx.kw("GRANT"),
                quote_ident(role),
                ctx.kw("TO"),
                quote_ident(member)
            ),
            Self::Revoke { .. } => format!(
                "{} {} {} {}",
                ctx.kw("REVOKE"),
                quote_ident(role),
                ctx.kw("FROM"),
                quote_ident(member)
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_on_table() {
        let change = PrivilegeChange::Grant {
            object: ObjectId::Table {
                schema: "app".into(),
                name: "users".into(),
            },
            grantee: "reader".into(),
            privileges: vec!["SELECT".into()],
            grantable: false,
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "GRANT SELECT ON TABLE app.users TO reader"
        );
    }

    #[test]
    fn test_revoke_grant_option() {
        let change = PrivilegeChange::RevokeGrantOption {
            object: ObjectId::Sequence {
                schema: "app".into(),
                name: "ids".into(),
            },
            grantee: "writer".into(),
            privileges: vec!["USAGE".into()],
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "REVOKE GRANT OPTION FOR USAGE ON SEQUENCE app.ids FROM writer"
        );
    }

    #[test]
    fn test_default_privileges_in_schema() {
        let change = DefaultPrivilegeChange::Grant {
            grantor: "owner".into(),
            objtype: 'r',
            schema: Some("app".into()),
            grantee: "reader".into(),
            privileges: vec!["SELECT".into()],
            grantable: false,
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "ALTER DEFAULT PRIVILEGES FOR ROLE owner IN SCHEMA app GRANT SELECT ON TABLES TO reader"
        );
    }

    #[test]
    fn test_membership() {
        let change = MembershipChange::Grant {
            role: "admins".into(),
            member: "alice".into(),
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "GRANT admins TO alice"
        );
        assert_eq!(
            change.creates(),
            vec![ObjectId::Membership {
                role: "admins".into(),
                member: "alice".into()
            }]
        );
    }
}
