use crate::catalog::policy::Policy;
use crate::catalog::CatalogEntity;
use crate::change::policy::PolicyChange;
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

pub(crate) fn diff(
    _ctx: &DiffContext<'_>,
    old: Option<&Policy>,
    new: Option<&Policy>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Policy(PolicyChange::Create { policy: n.clone() })];
            changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
            changes
        }
        (Some(o), None) => vec![Change::Policy(PolicyChange::Drop {
            schema: o.schema.clone(),
            table: o.table.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            // command and permissiveness are fixed at creation time
            if o.command != n.command || o.permissive != n.permissive {
                let mut changes = vec![Change::Policy(PolicyChange::Drop {
                    schema: o.schema.clone(),
                    table: o.table.clone(),
                    name: o.name.clone(),
                })];
                changes.push(Change::Policy(PolicyChange::Create { policy: n.clone() }));
                changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
                return changes;
            }

            let mut changes = Vec::new();
            if o.roles != n.roles || o.using_expr != n.using_expr || o.check_expr != n.check_expr {
                changes.push(Change::Policy(PolicyChange::Alter { policy: n.clone() }));
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
