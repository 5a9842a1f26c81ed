//! Sub-diffs shared by every object kind: ownership, comments and privileges.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::catalog::acl::{objtype_for, AclItem};
use crate::catalog::id::ObjectId;
use crate::change::comment::CommentChange;
use crate::change::owner::OwnerChange;
use crate::change::privilege::PrivilegeChange;
use crate::change::Change;
use crate::diff::DiffContext;

/// Comment transitions for one object.
pub(crate) fn comment_changes(
    object: &ObjectId,
    old: Option<&str>,
    new: Option<&str>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(text)) => vec![Change::Comment(CommentChange::Set {
            object: object.clone(),
            text: text.to_string(),
        })],
        (Some(_), None) => vec![Change::Comment(CommentChange::Drop {
            object: object.clone(),
        })],
        (Some(old_text), Some(new_text)) if old_text != new_text => {
            vec![Change::Comment(CommentChange::Set {
                object: object.clone(),
                text: new_text.to_string(),
            })]
        }
        _ => Vec::new(),
    }
}

/// Resolves a record's ACL list. An empty list means the catalog column was
/// NULL, i.e. the object carries the effective default ACL for its kind.
fn resolve_acl(
    ctx: &DiffContext<'_>,
    object: &ObjectId,
    owner: &str,
    privileges: &[AclItem],
) -> BTreeSet<AclItem> {
    if privileges.is_empty() {
        let Some(objtype) = objtype_for(object) else {
            return BTreeSet::new();
        };
        ctx.target
            .default_privileges
            .effective_acl(owner, objtype, object.schema())
    } else {
        privileges.iter().cloned().collect()
    }
}

/// GRANT/REVOKE/REVOKE-GRANT-OPTION changes turning `current` into `desired`.
/// The owner's implicit privileges never appear in the output.
pub(crate) fn privilege_delta(
    object: &ObjectId,
    owner: &str,
    current: &BTreeSet<AclItem>,
    desired: &BTreeSet<AclItem>,
) -> Vec<Change> {
    let index = |acl: &BTreeSet<AclItem>| -> BTreeMap<(String, String), bool> {
        acl.iter()
            .filter(|item| item.grantee != owner)
            .map(|item| {
                (
                    (item.grantee.clone(), item.privilege.clone()),
                    item.grantable,
                )
            })
            .collect()
    };
    let current = index(current);
    let desired = index(desired);

    let mut grants: Vec<((String, bool), String)> = Vec::new();
    let mut revokes: Vec<(String, String)> = Vec::new();
    let mut option_revokes: Vec<(String, String)> = Vec::new();

    for ((grantee, privilege), grantable) in &desired {
        match current.get(&(grantee.clone(), privilege.clone())) {
            None => grants.push(((grantee.clone(), *grantable), privilege.clone())),
            Some(current_grantable) if current_grantable == grantable => {}
            // held WITH GRANT OPTION but should not be
            Some(true) => option_revokes.push((grantee.clone(), privilege.clone())),
            // held plain but should be grantable
            Some(false) => grants.push(((grantee.clone(), true), privilege.clone())),
        }
    }
    for (grantee, privilege) in current.keys() {
        if !desired.contains_key(&(grantee.clone(), privilege.clone())) {
            revokes.push((grantee.clone(), privilege.clone()));
        }
    }

    let mut changes = Vec::new();
    for (grantee, privileges) in revokes.into_iter().into_group_map().into_iter().sorted() {
        changes.push(Change::Privilege(PrivilegeChange::Revoke {
            object: object.clone(),
            grantee,
            privileges,
        }));
    }
    for (grantee, privileges) in option_revokes
        .into_iter()
        .into_group_map()
        .into_iter()
        .sorted()
    {
        changes.push(Change::Privilege(PrivilegeChange::RevokeGrantOption {
            object: object.clone(),
            grantee,
            privileges,
        }));
    }
    for ((grantee, grantable), privileges) in
        grants.into_iter().into_group_map().into_iter().sorted()
    {
        changes.push(Change::Privilege(PrivilegeChange::Grant {
            object: object.clone(),
            grantee,
            privileges,
            grantable,
        }));
    }
    changes
}

/// Owner, comment and privilege changes accompanying a freshly created object.
/// The privilege baseline is the effective default ACL the object inherits,
/// so redundant grants are never emitted.
pub(crate) fn created_object_changes(
    ctx: &DiffContext<'_>,
    object: &ObjectId,
    owner: &str,
    comment: Option<&str>,
    privileges: &[AclItem],
) -> Vec<Change> {
    let mut changes = Vec::new();
    if owner != ctx.current_user() {
        changes.push(Change::Owner(OwnerChange {
            object: object.clone(),
            owner: owner.to_string(),
        }));
    }
    changes.extend(comment_changes(object, None, comment));

    if !privileges.is_empty()
        && let Some(objtype) = objtype_for(object)
    {
        let inherited = ctx
            .target
            .default_privileges
            .effective_acl(owner, objtype, object.schema());
        let desired = privileges.iter().cloned().collect();
        changes.extend(privilege_delta(object, owner, &inherited, &desired));
    }
    changes
}

/// Owner, comment and privilege changes for an object present on both sides.
pub(crate) fn altered_object_changes(
    ctx: &DiffContext<'_>,
    object: &ObjectId,
    old_owner: &str,
    new_owner: &str,
    old_comment: Option<&str>,
    new_comment: Option<&str>,
    old_privileges: &[AclItem],
    new_privileges: &[AclItem],
) -> Vec<Change> {
    let mut changes = Vec::new();
    if old_owner != new_owner {
        changes.push(Change::Owner(OwnerChange {
            object: object.clone(),
            owner: new_owner.to_string(),
        }));
    }
    changes.extend(comment_changes(object, old_comment, new_comment));

    let current = resolve_acl(ctx, object, new_owner, old_privileges);
    let desired = resolve_acl(ctx, object, new_owner, new_privileges);
    if current != desired {
        changes.extend(privilege_delta(object, new_owner, &current, &desired));
    }
    changes
}

/// Computes add/set/drop edits between two FDW-style option lists.
pub(crate) fn options_delta(
    old: &[(String, String)],
    new: &[(String, String)],
) -> crate::change::foreign::OptionsDelta {
    let old_map: BTreeMap<&String, &String> = old.iter().map(|(k, v)| (k, v)).collect();
    let new_map: BTreeMap<&String, &String> = new.iter().map(|(k, v)| (k, v)).collect();

    let mut delta = crate::change::foreign::OptionsDelta::default();
    for (key, value) in &new_map {
        match old_map.get(*key) {
            None => delta.add.push(((*key).clone(), (*value).clone())),
            Some(old_value) if old_value != value => {
                delta.set.push(((*key).clone(), (*value).clone()));
            }
            _ => {}
        }
    }
    for key in old_map.keys() {
        if !new_map.contains_key(*key) {
            delta.drop.push((*key).clone());
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::change::ChangeKind;

    fn table_id() -> ObjectId {
        ObjectId::Table {
            schema: "app".into(),
            name: "users".into(),
        }
    }

    #[test]
    fn test_privilege_delta_grant_revoke_and_option_downgrade() {
        let current: BTreeSet<AclItem> = [
            AclItem::new("owner", "SELECT", true),
            AclItem::new("reader", "SELECT", false),
            AclItem::new("writer", "INSERT", true),
        ]
        .into_iter()
        .collect();
        let desired: BTreeSet<AclItem> = [
            AclItem::new("owner", "SELECT", true),
            AclItem::new("writer", "INSERT", false),
            AclItem::new("writer", "UPDATE", false),
        ]
        .into_iter()
        .collect();

        let changes = privilege_delta(&table_id(), "owner", &current, &desired);
        let rendered: Vec<String> = changes
            .iter()
            .map(|c| c.emit(&crate::change::EmitContext::plain()).unwrap())
            .collect();

        assert!(rendered.contains(&"REVOKE SELECT ON TABLE app.users FROM reader".to_string()));
        assert!(rendered
            .contains(&"REVOKE GRANT OPTION FOR INSERT ON TABLE app.users FROM writer".to_string()));
        assert!(rendered.contains(&"GRANT UPDATE ON TABLE app.users TO writer".to_string()));
        // owner privileges are implicit and never emitted
        assert!(!rendered.iter().any(|sql| sql.contains("TO owner")));
    }

    #[test]
    fn test_equal_acls_produce_no_changes() {
        let acl: BTreeSet<AclItem> = [AclItem::new("reader", "SELECT", false)]
            .into_iter()
            .collect();
        assert!(privilege_delta(&table_id(), "owner", &acl, &acl).is_empty());
    }

    #[test]
    fn test_options_delta() {
        let old = vec![
            ("host".to_string(), "a".to_string()),
            ("port".to_string(), "5432".to_string()),
        ];
        let new = vec![
            ("host".to_string(), "b".to_string()),
            ("dbname".to_string(), "app".to_string()),
        ];
        let delta = options_delta(&old, &new);
        assert_eq!(delta.add, vec![("dbname".to_string(), "app".to_string())]);
        assert_eq!(delta.set, vec![("host".to_string(), "b".to_string())]);
        assert_eq!(delta.drop, vec!["port".to_string()]);
    }

    #[test]
    fn test_created_object_changes_skips_current_user_owner() {
        let source = Catalog::empty();
        let mut target = Catalog::empty();
        target.current_user = "postgres".into();
        let ctx = DiffContext::new(&source, &target);

        let changes = created_object_changes(&ctx, &table_id(), "postgres", None, &[]);
        assert!(changes.is_empty());

        let changes = created_object_changes(&ctx, &table_id(), "app_owner", None, &[]);
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], Change::Owner(_)));
    }
}
