//! Diff of `ALTER DEFAULT PRIVILEGES` state. Entries are keyed by
//! (grantor, objtype, schema); the grantor's own implicit privileges are
//! never emitted.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::catalog::acl::DefaultPrivilegeState;
use crate::change::privilege::DefaultPrivilegeChange;
use crate::change::Change;
use crate::diff::DiffContext;

type Key = (String, char, Option<String>);

fn acl_index(
    state: &DefaultPrivilegeState,
) -> BTreeMap<Key, BTreeMap<(String, String), bool>> {
    let mut index: BTreeMap<Key, BTreeMap<(String, String), bool>> = BTreeMap::new();
    for entry in &state.entries {
        let key = (entry.grantor.clone(), entry.objtype, entry.schema.clone());
        let acl = index.entry(key).or_default();
        for item in &entry.acl {
            if item.grantee == entry.grantor {
                continue;
            }
            acl.insert((item.grantee.clone(), item.privilege.clone()), item.grantable);
        }
    }
    index
}

pub(crate) fn diff(ctx: &DiffContext<'_>) -> Vec<Change> {
    let old = acl_index(&ctx.source.default_privileges);
    let new = acl_index(&ctx.target.default_privileges);
    let keys: BTreeSet<&Key> = old.keys().chain(new.keys()).collect();

    let mut changes = Vec::new();
    for key in keys {
        let (grantor, objtype, schema) = key;
        let empty = BTreeMap::new();
        let old_acl = old.get(key).unwrap_or(&empty);
        let new_acl = new.get(key).unwrap_or(&empty);

        let mut grants: Vec<((String, bool), String)> = Vec::new();
        let mut revokes: Vec<(String, String)> = Vec::new();

        for ((grantee, privilege), grantable) in new_acl {
            match old_acl.get(&(grantee.clone(), privilege.clone())) {
                Some(old_grantable) if old_grantable == grantable => {}
                Some(_) => {
                    // grantability changed: rebuild the entry
                    revokes.push((grantee.clone(), privilege.clone()));
                    grants.push(((grantee.clone(), *grantable), privilege.clone()));
                }
                None => grants.push(((grantee.clone(), *grantable), privilege.clone())),
            }
        }
        for (grantee, privilege) in old_acl.keys() {
            if !new_acl.contains_key(&(grantee.clone(), privilege.clone())) {
                revokes.push((grantee.clone(), privilege.clone()));
            }
        }

        for (grantee, privileges) in revokes.into_iter().into_group_map().into_iter().sorted() {
            changes.push(Change::DefaultPrivilege(DefaultPrivilegeChange::Revoke {
                grantor: grantor.clone(),
                objtype: *objtype,
                schema: schema.clone(),
                grantee,
                privileges,
            }));
        }
        for ((grantee, grantable), privileges) in
            grants.into_iter().into_group_map().into_iter().sorted()
        {
            changes.push(Change::DefaultPrivilege(DefaultPrivilegeChange::Grant {
                grantor: grantor.clone(),
                objtype: *objtype,
                schema: schema.clone(),
                grantee,
                privileges,
                grantable,
            }));
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::acl::{AclItem, DefaultAclEntry};
    use crate::catalog::Catalog;
    use crate::change::{ChangeKind, EmitContext};

    #[test]
    fn test_new_entry_emits_grant() {
        let source = Catalog::empty();
        let mut target = Catalog::empty();
        target.default_privileges.entries.push(DefaultAclEntry {
            grantor: "owner".into(),
            objtype: 'r',
            schema: Some("app".into()),
            acl: vec![
                AclItem::new("owner", "SELECT", true),
                AclItem::new("reader", "SELECT", false),
            ],
        });

        let ctx = DiffContext::new(&source, &target);
        let changes = diff(&ctx);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].emit(&EmitContext::plain()).unwrap(),
            "ALTER DEFAULT PRIVILEGES FOR ROLE owner IN SCHEMA app GRANT SELECT ON TABLES TO reader"
        );
    }

    #[test]
    fn test_removed_entry_emits_revoke() {
        let mut source = Catalog::empty();
        source.default_privileges.entries.push(DefaultAclEntry {
            grantor: "owner".into(),
            objtype: 'S',
            schema: None,
            acl: vec![AclItem::new("writer", "USAGE", false)],
        });
        let target = Catalog::empty();

        let ctx = DiffContext::new(&source, &target);
        let changes = diff(&ctx);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].emit(&EmitContext::plain()).unwrap(),
            "ALTER DEFAULT PRIVILEGES FOR ROLE owner REVOKE USAGE ON SEQUENCES FROM writer"
        );
    }
}
