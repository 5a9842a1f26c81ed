use crate::catalog::event_trigger::EventTrigger;
use crate::catalog::trigger::TriggerEnabled;
use crate::catalog::CatalogEntity;
use crate::change::event_trigger::EventTriggerChange;
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

fn create(ctx: &DiffContext<'_>, n: &EventTrigger) -> Vec<Change> {
    let mut changes = vec![Change::EventTrigger(EventTriggerChange::Create {
        trigger: n.clone(),
    })];
    if n.enabled != TriggerEnabled::Origin {
        changes.push(Change::EventTrigger(EventTriggerChange::SetEnabled {
            name: n.name.clone(),
            enabled: n.enabled,
        }));
    }
    if n.owner != ctx.current_user() {
        changes.push(Change::Owner(crate::change::owner::OwnerChange {
            object: n.id(),
            owner: n.owner.clone(),
        }));
    }
    changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
    changes
}

pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&EventTrigger>,
    new: Option<&EventTrigger>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create(ctx, n),
        (Some(o), None) => vec![Change::EventTrigger(EventTriggerChange::Drop {
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            if o.event != n.event || o.tags != n.tags || o.function != n.function {
                let mut changes = vec![Change::EventTrigger(EventTriggerChange::Drop {
                    name: o.name.clone(),
                })];
                changes.extend(create(ctx, n));
                return changes;
            }

            let mut changes = Vec::new();
            if o.enabled != n.enabled {
                changes.push(Change::EventTrigger(EventTriggerChange::SetEnabled {
                    name: n.name.clone(),
                    enabled: n.enabled,
                }));
            }
            if o.owner != n.owner {
                changes.push(Change::Owner(crate::change::owner::OwnerChange {
                    object: n.id(),
                    owner: n.owner.clone(),
                }));
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
