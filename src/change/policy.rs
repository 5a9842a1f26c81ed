use crate::catalog::id::ObjectId;
use crate::catalog::policy::Policy;
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum PolicyChange {
    Create {
        policy: Policy,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
    /// Roles and expressions are alterable in place; command and permissive
    /// are not and arrive as Drop + Create instead.
    Alter {
        policy: Policy,
    },
}

fn roles_clause(roles: &[String]) -> String {
    roles
        .iter()
        .map(|role| {
            if role == "PUBLIC" {
                role.clone()
            } else {
                quote_ident(role)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl ChangeKind for PolicyChange {
    fn object_type(&self) -> &'static str {
        "rls_policy"
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
        match self {
            Self::Create { policy } | Self::Alter { policy } => ObjectId::Policy {
                schema: policy.schema.clone(),
                table: policy.table.clone(),
                name: policy.name.clone(),
            },
            Self::Drop {
                schema,
                table,
                name,
            } => ObjectId::Policy {
                schema: schema.clone(),
                table: table.clone(),
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
            Self::Create { policy } | Self::Alter { policy } => {
                let mut requires = vec![policy.table_id()];
                for role in &policy.roles {
                    if role != "PUBLIC" {
                        requires.push(ObjectId::Role { name: role.clone() });
                    }
                }
                requires
            }
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
            Self::Create { policy } => {
                let mut sql = format!(
                    "{} {} {} {}",
                    ctx.kw("CREATE POLICY"),
                    quote_ident(&policy.name),
                    ctx.kw("ON"),
                    quote_qualified(&policy.schema, &policy.table)
                );
                if !policy.permissive {
                    sql.push_str(&format!(" {}", ctx.kw("AS RESTRICTIVE")));
                }
                if policy.command != "ALL" {
                    sql.push_str(&format!(" {} {}", ctx.kw("FOR"), policy.command));
                }
                if !policy.roles.is_empty() {
                    sql.push_str(&format!(" {} {}", ctx.kw("TO"), roles_clause(&policy.roles)));
                }
                if let Some(using) = &policy.using_expr {
                    sql.push_str(&format!(" {} ({using})", ctx.kw("USING")));
                }
                if let Some(check) = &policy.check_expr {
                    sql.push_str(&format!(" {} ({check})", ctx.kw("WITH CHECK")));
                }
                sql
            }
            Self::Drop {
                schema,
                table,
                name,
            } => format!(
                "{} {} {} {}",
                ctx.kw("DROP POLICY"),
                quote_ident(name),
                ctx.kw("ON"),
                quote_qualified(schema, table)
            ),
            Self::Alter { policy } => {
                let mut sql = format!(
                    "{} {} {} {}",
                    ctx.kw("ALTER POLICY"),
                    quote_ident(&policy.name),
                    ctx.kw("ON"),
                    quote_qualified(&policy.schema, &policy.table)
                );
                if !policy.roles.is_empty() {
                    sql.push_str(&format!(" {} {}", ctx.kw("TO"), roles_clause(&policy.roles)));
                }
                if let Some(using) = &policy.using_expr {
                    sql.push_str(&format!(" {} ({using})", ctx.kw("USING")));
                }
                if let Some(check) = &policy.check_expr {
                    sql.push_str(&format!(" {} ({check})", ctx.kw("WITH CHECK")));
                }
                sql
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_policy() {
        let change = PolicyChange::Create {
            policy: Policy {
                schema: "public".into(),
                table: "users".into(),
                name: "tenant_isolation".into(),
                command: "SELECT".into(),
                permissive: true,
                roles: vec!["app_user".into()],
                using_expr: Some("tenant_id = current_setting('app.tenant')::bigint".into()),
                check_expr: None,
                comment: None,
            },
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "CREATE POLICY tenant_isolation ON public.users FOR SELECT TO app_user \
             USING (tenant_id = current_setting('app.tenant')::bigint)"
        );
    }
}
