//! Diffs for the foreign-data object family.

use crate::catalog::foreign::{ForeignDataWrapper, ForeignTable, Server, UserMapping};
use crate::catalog::CatalogEntity;
use crate::change::foreign::{FdwChange, ForeignTableChange, ServerChange, UserMappingChange};
use crate::change::Change;
use crate::diff::common::{
    altered_object_changes, comment_changes, created_object_changes, options_delta,
};
use crate::diff::DiffContext;

pub(crate) fn diff_wrapper(
    ctx: &DiffContext<'_>,
    old: Option<&ForeignDataWrapper>,
    new: Option<&ForeignDataWrapper>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::ForeignDataWrapper(FdwChange::Create {
                wrapper: n.clone(),
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
        (Some(o), None) => vec![Change::ForeignDataWrapper(FdwChange::Drop {
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            // handler/validator swaps replace the wrapper
            if o.handler != n.handler || o.validator != n.validator {
                let mut changes = vec![Change::ForeignDataWrapper(FdwChange::Drop {
                    name: o.name.clone(),
                })];
                changes.extend(diff_wrapper(ctx, None, Some(n)));
                return changes;
            }

            let mut changes = Vec::new();
            let delta = options_delta(&o.options, &n.options);
            if !delta.is_empty() {
                changes.push(Change::ForeignDataWrapper(FdwChange::Options {
                    name: n.name.clone(),
                    delta,
                }));
            }
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
        (None, None) => Vec::new(),
    }
}

pub(crate) fn diff_server(
    ctx: &DiffContext<'_>,
    old: Option<&Server>,
    new: Option<&Server>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::Server(ServerChange::Create { server: n.clone() })];
            changes.extend(created_object_changes(
                ctx,
                &id,
                &n.owner,
                n.comment.as_deref(),
                &n.privileges,
            ));
            changes
        }
        (Some(o), None) => vec![Change::Server(ServerChange::Drop {
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            if o.wrapper != n.wrapper || o.server_type != n.server_type {
                let mut changes = vec![Change::Server(ServerChange::Drop {
                    name: o.name.clone(),
                })];
                changes.extend(diff_server(ctx, None, Some(n)));
                return changes;
            }

            let mut changes = Vec::new();
            if o.version != n.version
                && let Some(version) = &n.version
            {
                changes.push(Change::Server(ServerChange::SetVersion {
                    name: n.name.clone(),
                    version: version.clone(),
                }));
            }
            let delta = options_delta(&o.options, &n.options);
            if !delta.is_empty() {
                changes.push(Change::Server(ServerChange::Options {
                    name: n.name.clone(),
                    delta,
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

pub(crate) fn diff_user_mapping(
    _ctx: &DiffContext<'_>,
    old: Option<&UserMapping>,
    new: Option<&UserMapping>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::UserMapping(UserMappingChange::Create {
            mapping: n.clone(),
        })],
        (Some(o), None) => vec![Change::UserMapping(UserMappingChange::Drop {
            server: o.server.clone(),
            user: o.user.clone(),
        })],
        (Some(o), Some(n)) => {
            let delta = options_delta(&o.options, &n.options);
            if delta.is_empty() {
                Vec::new()
            } else {
                vec![Change::UserMapping(UserMappingChange::Options {
                    server: n.server.clone(),
                    user: n.user.clone(),
                    delta,
                })]
            }
        }
        (None, None) => Vec::new(),
    }
}

pub(crate) fn diff_foreign_table(
    ctx: &DiffContext<'_>,
    old: Option<&ForeignTable>,
    new: Option<&ForeignTable>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::ForeignTable(ForeignTableChange::Create {
                table: n.clone(),
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
        (Some(o), None) => vec![Change::ForeignTable(ForeignTableChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            // column or server changes rebuild the foreign table
            if o.server != n.server || o.columns != n.columns {
                let mut changes = vec![Change::ForeignTable(ForeignTableChange::Drop {
                    schema: o.schema.clone(),
                    name: o.name.clone(),
                })];
                changes.extend(diff_foreign_table(ctx, None, Some(n)));
                return changes;
            }

            let mut changes = Vec::new();
            let delta = options_delta(&o.options, &n.options);
            if !delta.is_empty() {
                changes.push(Change::ForeignTable(ForeignTableChange::Options {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    delta,
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
