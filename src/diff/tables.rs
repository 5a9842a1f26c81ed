//! Table diffing: the object itself, its columns, row security, replica
//! identity and storage parameters.

use std::collections::BTreeSet;

use crate::catalog::id::ObjectId;
use crate::catalog::table::{Column, ReplicaIdentity, Table};
use crate::catalog::CatalogEntity;
use crate::change::table::{ColumnFacet, TableChange};
use crate::change::Change;
use crate::diff::common::{altered_object_changes, comment_changes, created_object_changes};
use crate::diff::DiffContext;

fn create(ctx: &DiffContext<'_>, n: &Table) -> Vec<Change> {
    let id = n.id();
    let mut changes = vec![Change::Table(TableChange::Create { table: n.clone() })];
    if n.rls_enabled {
        changes.push(Change::Table(TableChange::SetRowSecurity {
            schema: n.schema.clone(),
            name: n.name.clone(),
            enabled: true,
        }));
    }
    if n.rls_forced {
        changes.push(Change::Table(TableChange::ForceRowSecurity {
            schema: n.schema.clone(),
            name: n.name.clone(),
            forced: true,
        }));
    }
    if n.replica_identity != ReplicaIdentity::Default
        && n.replica_identity != ReplicaIdentity::Index
    {
        changes.push(Change::Table(TableChange::SetReplicaIdentity {
            schema: n.schema.clone(),
            name: n.name.clone(),
            identity: n.replica_identity,
        }));
    }
    for column in &n.columns {
        changes.extend(comment_changes(
            &n.column_id(&column.name),
            None,
            column.comment.as_deref(),
        ));
    }
    changes.extend(created_object_changes(
        ctx,
        &id,
        &n.owner,
        n.comment.as_deref(),
        &n.privileges,
    ));
    changes
}

fn drop(o: &Table) -> Change {
    Change::Table(TableChange::Drop {
        schema: o.schema.clone(),
        name: o.name.clone(),
    })
}

fn column_changes(n: &Table, old: &Column, new: &Column) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut facet = |facet: ColumnFacet| {
        Change::Table(TableChange::AlterColumn {
            schema: n.schema.clone(),
            table: n.name.clone(),
            name: new.name.clone(),
            facet,
        })
    };

    // A generation expression cannot be edited; rebuild the column.
    if old.generated != new.generated {
        return vec![
            Change::Table(TableChange::DropColumn {
                schema: n.schema.clone(),
                table: n.name.clone(),
                name: old.name.clone(),
            }),
            Change::Table(TableChange::AddColumn {
                schema: n.schema.clone(),
                table: n.name.clone(),
                column: new.clone(),
            }),
        ];
    }

    if old.data_type != new.data_type || old.collation != new.collation {
        changes.push(facet(ColumnFacet::SetType {
            data_type: new.data_type.clone(),
            collation: new.collation.clone(),
        }));
    }
    if old.default != new.default {
        changes.push(match &new.default {
            Some(default) => facet(ColumnFacet::SetDefault(default.clone())),
            None => facet(ColumnFacet::DropDefault),
        });
    }
    if old.not_null != new.not_null {
        changes.push(if new.not_null {
            facet(ColumnFacet::SetNotNull)
        } else {
            facet(ColumnFacet::DropNotNull)
        });
    }
    if old.identity != new.identity {
        if old.identity.is_some() {
            changes.push(facet(ColumnFacet::DropIdentity));
        }
        if let Some(kind) = new.identity {
            changes.push(facet(ColumnFacet::AddIdentity(kind)));
        }
    }
    changes
}

pub(crate) fn diff(ctx: &DiffContext<'_>, old: Option<&Table>, new: Option<&Table>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create(ctx, n),
        (Some(o), None) => vec![drop(o)],
        (Some(o), Some(n)) => {
            let replaced = o.persistence != n.persistence
                || o.partition_key != n.partition_key
                || o.is_partition != n.is_partition
                || o.parent_table != n.parent_table
                || o.partition_bound != n.partition_bound
                || (o.replica_identity != n.replica_identity
                    && (o.replica_identity == ReplicaIdentity::Index
                        || n.replica_identity == ReplicaIdentity::Index));
            if replaced {
                let mut changes = vec![drop(o)];
                changes.extend(create(ctx, n));
                return changes;
            }

            let mut changes = Vec::new();

            for old_column in &o.columns {
                match n.find_column(&old_column.name) {
                    None => changes.push(Change::Table(TableChange::DropColumn {
                        schema: n.schema.clone(),
                        table: n.name.clone(),
                        name: old_column.name.clone(),
                    })),
                    Some(new_column) => {
                        changes.extend(column_changes(n, old_column, new_column));
                        changes.extend(comment_changes(
                            &n.column_id(&new_column.name),
                            old_column.comment.as_deref(),
                            new_column.comment.as_deref(),
                        ));
                    }
                }
            }
            for new_column in &n.columns {
                if o.find_column(&new_column.name).is_none() {
                    changes.push(Change::Table(TableChange::AddColumn {
                        schema: n.schema.clone(),
                        table: n.name.clone(),
                        column: new_column.clone(),
                    }));
                    changes.extend(comment_changes(
                        &n.column_id(&new_column.name),
                        None,
                        new_column.comment.as_deref(),
                    ));
                }
            }

            if o.rls_enabled != n.rls_enabled {
                changes.push(Change::Table(TableChange::SetRowSecurity {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    enabled: n.rls_enabled,
                }));
            }
            if o.rls_forced != n.rls_forced {
                changes.push(Change::Table(TableChange::ForceRowSecurity {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    forced: n.rls_forced,
                }));
            }
            if o.replica_identity != n.replica_identity {
                changes.push(Change::Table(TableChange::SetReplicaIdentity {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    identity: n.replica_identity,
                }));
            }

            let old_options: BTreeSet<&String> = o.options.iter().collect();
            let new_options: BTreeSet<&String> = n.options.iter().collect();
            let set: Vec<String> = new_options
                .difference(&old_options)
                .map(|s| (*s).clone())
                .collect();
            let reset: Vec<String> = old_options
                .difference(&new_options)
                .filter_map(|entry| entry.split_once('=').map(|(key, _)| key.to_string()))
                .filter(|key| !n.options.iter().any(|e| e.starts_with(&format!("{key}="))))
                .collect();
            if !set.is_empty() {
                changes.push(Change::Table(TableChange::SetOptions {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    options: set,
                }));
            }
            if !reset.is_empty() {
                changes.push(Change::Table(TableChange::ResetOptions {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    options: reset,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::change::{ChangeKind, EmitContext};

    fn ctx_catalogs() -> (Catalog, Catalog) {
        (Catalog::empty(), Catalog::empty())
    }

    fn users(columns: Vec<Column>) -> Table {
        Table::new("public", "users", "postgres", columns)
    }

    #[test]
    fn test_identical_tables_produce_no_changes() {
        let (source, target) = ctx_catalogs();
        let ctx = DiffContext::new(&source, &target);
        let table = users(vec![Column::new("id", 1, "bigint")]);
        assert!(diff(&ctx, Some(&table), Some(&table)).is_empty());
    }

    #[test]
    fn test_dropped_column_is_a_single_drop() {
        let (source, target) = ctx_catalogs();
        let ctx = DiffContext::new(&source, &target);
        let old = users(vec![
            Column::new("id", 1, "bigint"),
            Column::new("email", 2, "text"),
        ]);
        let new = users(vec![Column::new("id", 1, "bigint")]);

        let changes = diff(&ctx, Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].emit(&EmitContext::plain()).unwrap(),
            "ALTER TABLE public.users DROP COLUMN email"
        );
    }

    #[test]
    fn test_type_change_emits_alter_column() {
        let (source, target) = ctx_catalogs();
        let ctx = DiffContext::new(&source, &target);
        let old = users(vec![Column::new("total", 1, "integer")]);
        let new = users(vec![Column::new("total", 1, "bigint")]);

        let changes = diff(&ctx, Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].emit(&EmitContext::plain()).unwrap(),
            "ALTER TABLE public.users ALTER COLUMN total TYPE bigint"
        );
    }

    #[test]
    fn test_persistence_change_replaces_table() {
        let (source, target) = ctx_catalogs();
        let ctx = DiffContext::new(&source, &target);
        let old = users(vec![Column::new("id", 1, "bigint")]);
        let mut new = users(vec![Column::new("id", 1, "bigint")]);
        new.persistence = crate::catalog::table::Persistence::Unlogged;

        let changes = diff(&ctx, Some(&old), Some(&new));
        assert!(matches!(
            changes[0],
            Change::Table(TableChange::Drop { .. })
        ));
        assert!(matches!(
            changes[1],
            Change::Table(TableChange::Create { .. })
        ));
    }
}
