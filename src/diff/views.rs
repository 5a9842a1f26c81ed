use crate::catalog::view::{MaterializedView, View};
use crate::catalog::CatalogEntity;
use crate::change::view::{MaterializedViewChange, ViewChange};
use crate::change::Change;
use crate::diff::common::{altered_object_changes, created_object_changes};
use crate::diff::DiffContext;

fn create(ctx: &DiffContext<'_>, n: &View) -> Vec<Change> {
    let id = n.id();
    let mut changes = vec![Change::View(ViewChange::Create { view: n.clone() })];
    changes.extend(created_object_changes(
        ctx,
        &id,
        &n.owner,
        n.comment.as_deref(),
        &n.privileges,
    ));
    changes
}

pub(crate) fn diff(ctx: &DiffContext<'_>, old: Option<&View>, new: Option<&View>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create(ctx, n),
        (Some(o), None) => vec![Change::View(ViewChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            // A definition change is a replacement, never CREATE OR REPLACE:
            // the sorter may need to interleave dependents between the two.
            if o.definition != n.definition {
                let mut changes = vec![Change::View(ViewChange::Drop {
                    schema: o.schema.clone(),
                    name: o.name.clone(),
                })];
                changes.extend(create(ctx, n));
                return changes;
            }

            let mut changes = Vec::new();
            if o.options != n.options && !n.options.is_empty() {
                changes.push(Change::View(ViewChange::SetOptions {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    options: n.options.clone(),
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

fn create_materialized(ctx: &DiffContext<'_>, n: &MaterializedView) -> Vec<Change> {
    let id = n.id();
    let mut changes = vec![Change::MaterializedView(MaterializedViewChange::Create {
        view: n.clone(),
    })];
    changes.extend(created_object_changes(
        ctx,
        &id,
        &n.owner,
        n.comment.as_deref(),
        &n.privileges,
    ));
    changes
}

pub(crate) fn diff_materialized(
    ctx: &DiffContext<'_>,
    old: Option<&MaterializedView>,
    new: Option<&MaterializedView>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create_materialized(ctx, n),
        (Some(o), None) => vec![Change::MaterializedView(MaterializedViewChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            if o.definition != n.definition || o.options != n.options {
                let mut changes = vec![Change::MaterializedView(MaterializedViewChange::Drop {
                    schema: o.schema.clone(),
                    name: o.name.clone(),
                })];
                changes.extend(create_materialized(ctx, n));
                return changes;
            }
            altered_object_changes(
                ctx,
                &n.id(),
                &o.owner,
                &n.owner,
                o.comment.as_deref(),
                n.comment.as_deref(),
                &o.privileges,
                &n.privileges,
            )
        }
        (None, None) => Vec::new(),
    }
}
