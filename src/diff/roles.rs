use std::collections::BTreeSet;

use crate::catalog::role::Role;
use crate::change::privilege::MembershipChange;
use crate::change::role::{RoleChange, RoleFacet};
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

fn membership_grants(role: &Role) -> Vec<Change> {
    role.members
        .iter()
        .map(|member| {
            Change::Membership(MembershipChange::Grant {
                role: role.name.clone(),
                member: member.clone(),
            })
        })
        .collect()
}

pub(crate) fn diff(_ctx: &DiffContext<'_>, old: Option<&Role>, new: Option<&Role>) -> Vec<Change> {
    use crate::change::ChangeKind;

    match (old, new) {
        (None, Some(n)) => {
            let create = RoleChange::Create { role: n.clone() };
            let id = create.target();
            let mut changes = vec![Change::Role(create)];
            changes.extend(comment_changes(&id, None, n.comment.as_deref()));
            changes.extend(membership_grants(n));
            changes
        }
        (Some(o), None) => {
            // memberships vanish with the role; only the role itself drops
            vec![Change::Role(RoleChange::Drop {
                name: o.name.clone(),
            })]
        }
        (Some(o), Some(n)) => {
            let mut facets = Vec::new();
            if o.login != n.login {
                facets.push(RoleFacet::Login(n.login));
            }
            if o.superuser != n.superuser {
                facets.push(RoleFacet::Superuser(n.superuser));
            }
            if o.create_db != n.create_db {
                facets.push(RoleFacet::CreateDb(n.create_db));
            }
            if o.create_role != n.create_role {
                facets.push(RoleFacet::CreateRole(n.create_role));
            }
            if o.inherit != n.inherit {
                facets.push(RoleFacet::Inherit(n.inherit));
            }
            if o.replication != n.replication {
                facets.push(RoleFacet::Replication(n.replication));
            }
            if o.bypass_rls != n.bypass_rls {
                facets.push(RoleFacet::BypassRls(n.bypass_rls));
            }
            if o.connection_limit != n.connection_limit {
                facets.push(RoleFacet::ConnectionLimit(n.connection_limit));
            }
            if o.valid_until != n.valid_until {
                facets.push(RoleFacet::ValidUntil(n.valid_until.clone()));
            }

            // role-level SET parameters, as key=value strings
            let old_config: BTreeSet<(&str, &str)> =
                o.config.iter().filter_map(|c| c.split_once('=')).collect();
            let new_config: BTreeSet<(&str, &str)> =
                n.config.iter().filter_map(|c| c.split_once('=')).collect();
            for (parameter, value) in &new_config {
                let changed = old_config
                    .iter()
                    .find(|(p, _)| p == parameter)
                    .is_none_or(|(_, v)| v != value);
                if changed {
                    facets.push(RoleFacet::Set {
                        parameter: parameter.to_string(),
                        value: value.to_string(),
                    });
                }
            }
            for (parameter, _) in &old_config {
                if !new_config.iter().any(|(p, _)| p == parameter) {
                    facets.push(RoleFacet::Reset {
                        parameter: parameter.to_string(),
                    });
                }
            }

            let mut changes: Vec<Change> = facets
                .into_iter()
                .map(|facet| {
                    Change::Role(RoleChange::Alter {
                        name: n.name.clone(),
                        facet,
                    })
                })
                .collect();

            let old_members: BTreeSet<&String> = o.members.iter().collect();
            let new_members: BTreeSet<&String> = n.members.iter().collect();
            for member in new_members.difference(&old_members) {
                changes.push(Change::Membership(MembershipChange::Grant {
                    role: n.name.clone(),
                    member: (*member).clone(),
                }));
            }
            for member in old_members.difference(&new_members) {
                changes.push(Change::Membership(MembershipChange::Revoke {
                    role: n.name.clone(),
                    member: (*member).clone(),
                }));
            }

            let id = crate::catalog::id::ObjectId::Role {
                name: n.name.clone(),
            };
            changes.extend(comment_changes(
                &id,
                o.comment.as_deref(),
                n.comment.as_deref(),
            ));
            changes
        }
        (None, None) => Vec::new(),
    }
}
