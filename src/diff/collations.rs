use crate::catalog::collation::Collation;
use crate::catalog::CatalogEntity;
use crate::change::collation::CollationChange;
use crate::change::Change;
use crate::diff::common::{comment_changes, created_object_changes};
use crate::diff::DiffContext;

fn create(ctx: &DiffContext<'_>, n: &Collation) -> Vec<Change> {
    let id = n.id();
    let mut changes = vec![Change::Collation(CollationChange::Create {
        collation: n.clone(),
    })];
    changes.extend(created_object_changes(
        ctx,
        &id,
        &n.owner,
        n.comment.as_deref(),
        &[],
    ));
    changes
}

fn drop(o: &Collation) -> Change {
    Change::Collation(CollationChange::Drop {
        schema: o.schema.clone(),
        name: o.name.clone(),
    })
}

/// Collations have no alterable facets: any definitional difference replaces
/// the collation outright.
pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&Collation>,
    new: Option<&Collation>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create(ctx, n),
        (Some(o), None) => vec![drop(o)],
        (Some(o), Some(n)) => {
            let replaced = o.provider != n.provider
                || o.locale != n.locale
                || o.lc_collate != n.lc_collate
                || o.lc_ctype != n.lc_ctype
                || o.deterministic != n.deterministic;
            if replaced {
                let mut changes = vec![drop(o)];
                changes.extend(create(ctx, n));
                changes
            } else {
                let mut changes = Vec::new();
                if o.owner != n.owner {
                    changes.push(Change::Owner(crate::change::owner::OwnerChange {
                        object: n.id(),
                        owner: n.owner.clone(),
                    }));
                }
                changes.extend(comment_changes(
                    &n.id(),
                    o.comment.as_deref(),
                    n.comment.as_deref(),
                ));
                changes
            }
        }
        (None, None) => Vec::new(),
    }
}
