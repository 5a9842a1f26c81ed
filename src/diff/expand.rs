//! Replace-dependency expansion.
//!
//! When a diff replaces an object (a stable identity that is both created and
//! dropped), everything that transitively depends on it per pg_depend must be
//! dropped and recreated too, otherwise the destructive half of the replace
//! fails at execution time. The same applies to columns whose type changes in
//! place. This pass walks the source catalog's dependency rows from those
//! roots and synthesizes the missing Drop + Create pairs, re-deriving owner,
//! comment and privileges from the target.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::catalog::id::ObjectId;
use crate::change::table::{ColumnFacet, TableChange};
use crate::change::{Change, ChangeKind, Operation};
use crate::diff::{domains, routines, tables, types, views, DiffContext};

/// Collapses child identities to their owning object and filters out the
/// virtual and unknown prefixes that never participate in traversal.
fn normalize(id: &ObjectId) -> Option<ObjectId> {
    if id.is_virtual() || id.is_unknown() {
        return None;
    }
    Some(id.owning_object())
}

fn replaceable(id: &ObjectId) -> bool {
    matches!(
        id,
        ObjectId::Table { .. }
            | ObjectId::View { .. }
            | ObjectId::MaterializedView { .. }
            | ObjectId::Function { .. }
            | ObjectId::Procedure { .. }
            | ObjectId::Type { .. }
            | ObjectId::Domain { .. }
    )
}

/// Drop + Create (plus re-derived owner/comment/privilege changes) for an
/// object present in both catalogs.
fn synthesize(ctx: &DiffContext<'_>, id: &ObjectId) -> Option<Vec<Change>> {
    let mut changes = Vec::new();
    match id {
        ObjectId::Table { .. } => {
            let old = ctx.source.tables.get(id)?;
            let new = ctx.target.tables.get(id)?;
            changes.extend(tables::diff(ctx, Some(old), None));
            changes.extend(tables::diff(ctx, None, Some(new)));
        }
        ObjectId::View { .. } => {
            let old = ctx.source.views.get(id)?;
            let new = ctx.target.views.get(id)?;
            changes.extend(views::diff(ctx, Some(old), None));
            changes.extend(views::diff(ctx, None, Some(new)));
        }
        ObjectId::MaterializedView { .. } => {
            let old = ctx.source.materialized_views.get(id)?;
            let new = ctx.target.materialized_views.get(id)?;
            changes.extend(views::diff_materialized(ctx, Some(old), None));
            changes.extend(views::diff_materialized(ctx, None, Some(new)));
        }
        ObjectId::Function { .. } | ObjectId::Procedure { .. } => {
            let old = ctx.source.routines.get(id)?;
            let new = ctx.target.routines.get(id)?;
            changes.extend(routines::diff(ctx, Some(old), None));
            changes.extend(routines::diff(ctx, None, Some(new)));
        }
        ObjectId::Type { .. } => {
            let old = ctx.source.types.get(id)?;
            let new = ctx.target.types.get(id)?;
            changes.extend(types::diff(ctx, Some(old), None));
            changes.extend(types::diff(ctx, None, Some(new)));
        }
        ObjectId::Domain { .. } => {
            let old = ctx.source.domains.get(id)?;
            let new = ctx.target.domains.get(id)?;
            changes.extend(domains::diff(ctx, Some(old), None));
            changes.extend(domains::diff(ctx, None, Some(new)));
        }
        _ => return None,
    }
    Some(changes)
}

/// Identities of columns whose type is altered in place; their dependents
/// need the same treatment as replace roots.
fn type_changed_columns(changes: &[Change]) -> BTreeSet<ObjectId> {
    changes
        .iter()
        .filter_map(|change| match change {
            Change::Table(TableChange::AlterColumn {
                schema,
                table,
                name,
                facet: ColumnFacet::SetType { .. },
            }) => Some(ObjectId::Column {
                schema: schema.clone(),
                table: table.clone(),
                name: name.clone(),
            }),
            _ => None,
        })
        .collect()
}

pub fn expand_replacements(changes: Vec<Change>, ctx: &DiffContext<'_>) -> Vec<Change> {
    let mut created: BTreeSet<ObjectId> = BTreeSet::new();
    let mut dropped: BTreeSet<ObjectId> = BTreeSet::new();
    for change in &changes {
        created.extend(change.creates());
        dropped.extend(change.drops());
    }

    // Replace roots: replaced whole objects, plus type-changed columns.
    let mut roots: BTreeSet<ObjectId> = created
        .intersection(&dropped)
        .filter(|id| !id.is_virtual())
        .cloned()
        .collect();
    roots.extend(type_changed_columns(&changes));
    if roots.is_empty() {
        return changes;
    }

    // Reverse adjacency over the source catalog's dependency rows. Traversal
    // runs on raw identities so column-level rows stay addressable; dependents
    // are collapsed to their owning object when considered for replacement.
    let mut dependents_of: BTreeMap<ObjectId, Vec<ObjectId>> = BTreeMap::new();
    for row in &ctx.source.depends {
        if row.referenced.is_unknown() || row.dependent.is_unknown() {
            continue;
        }
        if row.referenced.is_virtual() || row.dependent.is_virtual() {
            continue;
        }
        dependents_of
            .entry(row.referenced.clone())
            .or_default()
            .push(row.dependent.clone());
    }

    let root_objects: BTreeSet<ObjectId> = roots.iter().filter_map(normalize).collect();
    let mut queue: VecDeque<ObjectId> = roots.into_iter().collect();
    let mut visited: BTreeSet<ObjectId> = BTreeSet::new();
    let mut synthesized: BTreeSet<ObjectId> = BTreeSet::new();
    let mut extra: Vec<Change> = Vec::new();

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id.clone()) {
            continue;
        }

        let Some(dependents) = dependents_of.get(&id) else {
            continue;
        };
        for dependent in dependents {
            queue.push_back(dependent.clone());

            let Some(object) = normalize(dependent) else {
                continue;
            };
            if root_objects.contains(&object)
                || synthesized.contains(&object)
                || dropped.contains(&object)
            {
                continue;
            }
            if !replaceable(&object) {
                continue;
            }
            if let Some(replacement) = synthesize(ctx, &object) {
                debug!(object = %object, "expanding replace dependency");
                for change in &replacement {
                    created.extend(change.creates());
                    dropped.extend(change.drops());
                }
                synthesized.insert(object.clone());
                queue.push_back(object);
                extra.extend(replacement);
            }
        }
    }

    if extra.is_empty() {
        return changes;
    }

    // Alters aimed at an object that is now dropped and recreated would fail
    // or be redundant; the synthesized pair supersedes them.
    let mut result: Vec<Change> = changes
        .into_iter()
        .filter(|change| {
            !(change.operation() == Operation::Alter
                && synthesized.contains(&change.target().owning_object()))
        })
        .collect();
    result.extend(extra);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::view::View;
    use crate::catalog::{Catalog, DepType, DependRow};
    use crate::change::view::ViewChange;

    fn orders_view() -> View {
        View {
            schema: "public".into(),
            name: "orders_view".into(),
            owner: "postgres".into(),
            definition: "SELECT id, total FROM public.orders".into(),
            options: Vec::new(),
            comment: None,
            privileges: Vec::new(),
        }
    }

    #[test]
    fn test_column_type_change_expands_dependent_view() {
        use crate::catalog::table::{Column, Table};

        let mut source = Catalog::empty();
        let mut target = Catalog::empty();
        source.insert(Table::new(
            "public",
            "orders",
            "postgres",
            vec![Column::new("total", 1, "integer")],
        ));
        target.insert(Table::new(
            "public",
            "orders",
            "postgres",
            vec![Column::new("total", 1, "bigint")],
        ));
        source.insert(orders_view());
        target.insert(orders_view());
        source.depends.push(DependRow {
            dependent: ObjectId::View {
                schema: "public".into(),
                name: "orders_view".into(),
            },
            referenced: ObjectId::Column {
                schema: "public".into(),
                table: "orders".into(),
                name: "total".into(),
            },
            deptype: DepType::Normal,
        });

        let ctx = DiffContext::new(&source, &target);
        let changes = vec![Change::Table(TableChange::AlterColumn {
            schema: "public".into(),
            table: "orders".into(),
            name: "total".into(),
            facet: ColumnFacet::SetType {
                data_type: "bigint".into(),
                collation: None,
            },
        })];

        let expanded = expand_replacements(changes, &ctx);
        assert!(expanded
            .iter()
            .any(|c| matches!(c, Change::View(ViewChange::Drop { .. }))));
        assert!(expanded
            .iter()
            .any(|c| matches!(c, Change::View(ViewChange::Create { .. }))));
    }

    #[test]
    fn test_no_roots_is_identity() {
        let source = Catalog::empty();
        let target = Catalog::empty();
        let ctx = DiffContext::new(&source, &target);
        let changes = vec![Change::Table(TableChange::Drop {
            schema: "public".into(),
            name: "gone".into(),
        })];
        assert_eq!(expand_replacements(changes.clone(), &ctx).len(), changes.len());
    }
}
