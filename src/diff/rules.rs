use crate::catalog::rule::Rule;
use crate::catalog::CatalogEntity;
use crate::change::rule::RuleChange;
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

pub(crate) fn diff(_ctx: &DiffContext<'_>, old: Option<&Rule>, new: Option<&Rule>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Rule(RuleChange::Create {
                rule: n.clone(),
                or_replace: false,
            })];
            changes.extend(comment_changes(&n.id(), None, n.comment.as_deref()));
            changes
        }
        (Some(o), None) => vec![Change::Rule(RuleChange::Drop {
            schema: o.schema.clone(),
            table: o.table.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            let mut changes = Vec::new();
            if o.definition != n.definition {
                changes.push(Change::Rule(RuleChange::Create {
                    rule: n.clone(),
                    or_replace: true,
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
