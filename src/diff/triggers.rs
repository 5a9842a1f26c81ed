use crate::catalog::trigger::{Trigger, TriggerEnabled};
use crate::catalog::CatalogEntity;
use crate::change::trigger::TriggerChange;
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

fn create(n: &Trigger) -> Vec<Change> {
    let mut changes = vec![Change::Trigger(TriggerChange::Create { trigger: n.clone() })];
    if n.enabled != TriggerEnabled::Origin {
        changes.push(Change::Trigger(TriggerChange::SetEnabled {
            schema: n.schema.clone(),
            table: n.table.clone(),
            name: n.name.clone(),
            enabled: n.enabled,
        }));
    }
    changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
    changes
}

pub(crate) fn diff(
    _ctx: &DiffContext<'_>,
    old: Option<&Trigger>,
    new: Option<&Trigger>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create(n),
        (Some(o), None) => vec![Change::Trigger(TriggerChange::Drop {
            schema: o.schema.clone(),
            table: o.table.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            if o.definition != n.definition {
                let mut changes = vec![Change::Trigger(TriggerChange::Drop {
                    schema: o.schema.clone(),
                    table: o.table.clone(),
                    name: o.name.clone(),
                })];
                changes.extend(create(n));
                return changes;
            }

            let mut changes = Vec::new();
            if o.enabled != n.enabled {
                changes.push(Change::Trigger(TriggerChange::SetEnabled {
                    schema: n.schema.clone(),
                    table: n.table.clone(),
                    name: n.name.clone(),
                    enabled: n.enabled,
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
