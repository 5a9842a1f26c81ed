use crate::catalog::constraint::Constraint;
use crate::catalog::CatalogEntity;
use crate::change::table_constraint::ConstraintChange;
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

pub(crate) fn diff(
    _ctx: &DiffContext<'_>,
    old: Option<&Constraint>,
    new: Option<&Constraint>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Constraint(ConstraintChange::Create {
                constraint: n.clone(),
            })];
            changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
            changes
        }
        (Some(o), None) => vec![Change::Constraint(ConstraintChange::Drop {
            schema: o.schema.clone(),
            table: o.table.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            if o.definition != n.definition || (o.validated && !n.validated) {
                let mut changes = vec![Change::Constraint(ConstraintChange::Drop {
                    schema: o.schema.clone(),
                    table: o.table.clone(),
                    name: o.name.clone(),
                })];
                changes.push(Change::Constraint(ConstraintChange::Create {
                    constraint: n.clone(),
                }));
                changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
                return changes;
            }

            let mut changes = Vec::new();
            if !o.validated && n.validated {
                changes.push(Change::Constraint(ConstraintChange::Validate {
                    schema: n.schema.clone(),
                    table: n.table.clone(),
                    name: n.name.clone(),
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
