use crate::catalog::schema::SchemaDef;
use crate::catalog::CatalogEntity;
use crate::change::schema::SchemaChange;
use crate::change::Change;
use crate::diff::common::{altered_object_changes, created_object_changes};
use crate::diff::DiffContext;

pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&SchemaDef>,
    new: Option<&SchemaDef>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::Schema(SchemaChange::Create { schema: n.clone() })];
            changes.extend(created_object_changes(
                ctx,
                &id,
                &n.owner,
                n.comment.as_deref(),
                &n.privileges,
            ));
            changes
        }
        (Some(o), None) => vec![Change::Schema(SchemaChange::Drop {
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
