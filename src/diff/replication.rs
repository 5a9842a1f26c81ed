use crate::catalog::replication::{Publication, Subscription};
use crate::catalog::CatalogEntity;
use crate::change::replication::{PublicationChange, SubscriptionChange};
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

fn owner_change(id: crate::catalog::id::ObjectId, owner: &str) -> Change {
    Change::Owner(crate::change::owner::OwnerChange {
        object: id,
        owner: owner.to_string(),
    })
}

pub(crate) fn diff_publication(
    ctx: &DiffContext<'_>,
    old: Option<&Publication>,
    new: Option<&Publication>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Publication(PublicationChange::Create {
                publication: n.clone(),
            })];
            if n.owner != ctx.current_user() {
                changes.push(owner_change(n.id(), &n.owner));
            }
            changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
            changes
        }
        (Some(o), None) => vec![Change::Publication(PublicationChange::Drop {
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            // FOR ALL TABLES is fixed at creation time
            if o.all_tables != n.all_tables {
                let mut changes = vec![Change::Publication(PublicationChange::Drop {
                    name: o.name.clone(),
                })];
                changes.extend(diff_publication(ctx, None, Some(n)));
                return changes;
            }

            let mut changes = Vec::new();
            if !n.all_tables && o.tables != n.tables {
                changes.push(Change::Publication(PublicationChange::SetTables {
                    name: n.name.clone(),
                    tables: n.tables.clone(),
                }));
            }
            if o.publish != n.publish || o.via_partition_root != n.via_partition_root {
                changes.push(Change::Publication(PublicationChange::SetOptions {
                    name: n.name.clone(),
                    publish: n.publish.clone(),
                    via_partition_root: n.via_partition_root,
                }));
            }
            if o.owner != n.owner {
                changes.push(owner_change(n.id(), &n.owner));
            }
            changes.extend(comment_changes(
                &n.id(),
                o.comment.as_deref(),
                n.comment.as_deref(),
            ));
            changes
        }
        (None, None) => Vec::new(),
    }
}

pub(crate) fn diff_subscription(
    ctx: &DiffContext<'_>,
    old: Option<&Subscription>,
    new: Option<&Subscription>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Subscription(SubscriptionChange::Create {
                subscription: n.clone(),
            })];
            if n.owner != ctx.current_user() {
                changes.push(owner_change(n.id(), &n.owner));
            }
            changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
            changes
        }
        (Some(o), None) => vec![Change::Subscription(SubscriptionChange::Drop {
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            // two_phase cannot be altered after creation
            if o.two_phase != n.two_phase {
                let mut changes = vec![Change::Subscription(SubscriptionChange::Drop {
                    name: o.name.clone(),
                })];
                changes.extend(diff_subscription(ctx, None, Some(n)));
                return changes;
            }

            let mut changes = Vec::new();
            if o.conninfo != n.conninfo {
                changes.push(Change::Subscription(SubscriptionChange::SetConninfo {
                    name: n.name.clone(),
                    conninfo: n.conninfo.clone(),
                }));
            }
            if o.publications != n.publications {
                changes.push(Change::Subscription(SubscriptionChange::SetPublications {
                    name: n.name.clone(),
                    publications: n.publications.clone(),
                }));
            }
            if o.slot_name != n.slot_name
                && let Some(slot) = &n.slot_name
            {
                changes.push(Change::Subscription(SubscriptionChange::SetOption {
                    name: n.name.clone(),
                    option: "slot_name".to_string(),
                    value: format!("'{slot}'"),
                }));
            }
            if o.synchronous_commit != n.synchronous_commit
                && let Some(commit) = &n.synchronous_commit
            {
                changes.push(Change::Subscription(SubscriptionChange::SetOption {
                    name: n.name.clone(),
                    option: "synchronous_commit".to_string(),
                    value: format!("'{commit}'"),
                }));
            }
            if o.enabled != n.enabled {
                changes.push(Change::Subscription(SubscriptionChange::SetEnabled {
                    name: n.name.clone(),
                    enabled: n.enabled,
                }));
            }
            if o.owner != n.owner {
                changes.push(owner_change(n.id(), &n.owner));
            }
            changes.extend(comment_changes(
                &n.id(),
                o.comment.as_deref(),
                n.comment.as_deref(),
            ));
            changes
        }
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_two_phase_flip_replaces_subscription() {
        let source = Catalog::empty();
        let target = Catalog::empty();
        let ctx = DiffContext::new(&source, &target);

        let old = Subscription {
            name: "upstream".into(),
            owner: "postgres".into(),
            conninfo: "host=primary".into(),
            publications: vec!["pub".into()],
            enabled: true,
            slot_name: None,
            synchronous_commit: None,
            two_phase: false,
            comment: None,
        };
        let mut new = old.clone();
        new.two_phase = true;

        let changes = diff_subscription(&ctx, Some(&old), Some(&new));
        assert!(matches!(
            changes[0],
            Change::Subscription(SubscriptionChange::Drop { .. })
        ));
        assert!(matches!(
            changes[1],
            Change::Subscription(SubscriptionChange::Create { .. })
        ));
    }
}
