use crate::catalog::extension::Extension;
use crate::catalog::CatalogEntity;
use crate::change::extension::ExtensionChange;
use crate::change::Change;
use crate::diff::common::comment_changes;
use crate::diff::DiffContext;

pub(crate) fn diff(
    _ctx: &DiffContext<'_>,
    old: Option<&Extension>,
    new: Option<&Extension>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::Extension(ExtensionChange::Create {
                extension: n.clone(),
            })];
            changes.extend(comment_changes(&id, None, n.comment.as_deref()));
            changes
        }
        (Some(o), None) => vec![Change::Extension(ExtensionChange::Drop {
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            let mut changes = Vec::new();
            if o.schema != n.schema {
                changes.push(Change::Extension(ExtensionChange::SetSchema {
                    name: n.name.clone(),
                    schema: n.schema.clone(),
                }));
            }
            if o.version != n.version {
                changes.push(Change::Extension(ExtensionChange::Update {
                    name: n.name.clone(),
                    version: n.version.clone(),
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
