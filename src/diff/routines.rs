use crate::catalog::routine::Routine;
use crate::catalog::CatalogEntity;
use crate::change::routine::RoutineChange;
use crate::change::Change;
use crate::diff::common::{altered_object_changes, created_object_changes};
use crate::diff::DiffContext;

pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&Routine>,
    new: Option<&Routine>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::Routine(RoutineChange::Create { routine: n.clone() })];
            changes.extend(created_object_changes(
                ctx,
                &id,
                &n.owner,
                n.comment.as_deref(),
                &n.privileges,
            ));
            changes
        }
        (Some(o), None) => vec![Change::Routine(RoutineChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
            arguments: o.arguments.clone(),
            kind: o.kind,
        })],
        (Some(o), Some(n)) => {
            let mut changes = Vec::new();
            // The identity signature is stable here (it is part of the key),
            // so a changed definition can always be replaced in place.
            if o.definition != n.definition || o.language != n.language {
                changes.push(Change::Routine(RoutineChange::Replace {
                    routine: n.clone(),
                }));
            }
            changes.extend(altered_object_changes(
                ctx,
                &n.id(),
                &o.owner,
                &n.owner,
                o.comment.as_deref(),
                n.comment.as_deref(),
                &o.privileges,
                &n.privileges,
            ));
            changes
        }
        (None, None) => Vec::new(),
    }
}
