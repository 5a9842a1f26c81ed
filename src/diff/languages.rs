use crate::catalog::language::Language;
use crate::catalog::CatalogEntity;
use crate::change::language::LanguageChange;
use crate::change::Change;
use crate::diff::common::{altered_object_changes, created_object_changes};
use crate::diff::DiffContext;

pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&Language>,
    new: Option<&Language>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::Language(LanguageChange::Create {
                language: n.clone(),
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
        (Some(o), None) => vec![Change::Language(LanguageChange::Drop {
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => altered_object_changes(
            ctx,
            &n.id(),
            &o.owner,
            &n.owner,
            o.comment.as_deref(),
            n.comment.as_deref(),
            &o.privileges,
            &n.privileges,
        ),
        (None, None) => Vec::new(),
    }
}
