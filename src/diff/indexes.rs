use crate::catalog::index::Index;
use crate::catalog::CatalogEntity;
use crate::change::index::IndexChange;
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

pub(crate) fn diff(_ctx: &DiffContext<'_>, old: Option<&Index>, new: Option<&Index>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Index(IndexChange::Create { index: n.clone() })];
            changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
            changes
        }
        (Some(o), None) => vec![Change::Index(IndexChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            if o.definition != n.definition || o.table != n.table {
                let mut changes = vec![Change::Index(IndexChange::Drop {
                    schema: o.schema.clone(),
                    name: o.name.clone(),
                })];
                changes.push(Change::Index(IndexChange::Create { index: n.clone() }));
                changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
                changes
            } else {
                comment_changes(&n.id(), o.comment.as_deref(), n.comment.as_deref())
            }
        }
        (None, None) => Vec::new(),
    }
}
