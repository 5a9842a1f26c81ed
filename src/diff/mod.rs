//! The diff engine: given two catalogs, produce the change set whose
//! application to the source yields the target.
//!
//! Every kind follows the same skeleton: set-difference the stable identities,
//! emit Create/Drop for one-sided objects, and inspect a fixed non-alterable
//! field set for two-sided ones. If a non-alterable field differs the object
//! is replaced (Drop + Create, with owner/comment/privileges re-derived from
//! the target); otherwise fine-grained alters cover each differing facet.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::catalog::id::ObjectId;
use crate::catalog::Catalog;
use crate::change::Change;

pub mod collations;
pub mod common;
pub mod constraints;
pub mod default_privileges;
pub mod domains;
pub mod event_triggers;
pub mod expand;
pub mod extensions;
pub mod foreign;
pub mod indexes;
pub mod languages;
pub mod policies;
pub mod replication;
pub mod roles;
pub mod routines;
pub mod rules;
pub mod schemas;
pub mod sequences;
pub mod tables;
pub mod triggers;
pub mod types;
pub mod views;

/// Read-only context handed to every per-kind diff and to the hook surface.
#[derive(Clone, Copy)]
pub struct DiffContext<'a> {
    pub source: &'a Catalog,
    pub target: &'a Catalog,
}

impl<'a> DiffContext<'a> {
    pub fn new(source: &'a Catalog, target: &'a Catalog) -> Self {
        Self { source, target }
    }

    /// The role creating objects on the target; owners differing from it get
    /// an explicit ALTER … OWNER TO.
    pub fn current_user(&self) -> &str {
        &self.target.current_user
    }
}

/// Walks both maps in stable identity order and hands each id's pair to the
/// kind-specific diff.
pub(crate) fn diff_objects<'a, T>(
    source: &'a BTreeMap<ObjectId, T>,
    target: &'a BTreeMap<ObjectId, T>,
    mut diff_fn: impl FnMut(Option<&'a T>, Option<&'a T>) -> Vec<Change>,
) -> Vec<Change> {
    let ids: BTreeSet<&ObjectId> = source.keys().chain(target.keys()).collect();
    ids.into_iter()
        .flat_map(|id| diff_fn(source.get(id), target.get(id)))
        .collect()
}

/// Produces the unordered change set transforming `source` into `target`.
pub fn diff_catalogs(ctx: &DiffContext<'_>) -> Vec<Change> {
    info!("diffing catalogs");
    let (source, target) = (ctx.source, ctx.target);
    let mut out = Vec::new();

    out.extend(diff_objects(&source.roles, &target.roles, |o, n| {
        roles::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.schemas, &target.schemas, |o, n| {
        schemas::diff(ctx, o, n)
    }));
    out.extend(diff_objects(
        &source.extensions,
        &target.extensions,
        |o, n| extensions::diff(ctx, o, n),
    ));
    out.extend(diff_objects(&source.languages, &target.languages, |o, n| {
        languages::diff(ctx, o, n)
    }));
    out.extend(diff_objects(
        &source.collations,
        &target.collations,
        |o, n| collations::diff(ctx, o, n),
    ));
    out.extend(diff_objects(&source.types, &target.types, |o, n| {
        types::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.domains, &target.domains, |o, n| {
        domains::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.sequences, &target.sequences, |o, n| {
        sequences::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.tables, &target.tables, |o, n| {
        tables::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.indexes, &target.indexes, |o, n| {
        indexes::diff(ctx, o, n)
    }));
    out.extend(diff_objects(
        &source.constraints,
        &target.constraints,
        |o, n| constraints::diff(ctx, o, n),
    ));
    out.extend(diff_objects(&source.views, &target.views, |o, n| {
        views::diff(ctx, o, n)
    }));
    out.extend(diff_objects(
        &source.materialized_views,
        &target.materialized_views,
        |o, n| views::diff_materialized(ctx, o, n),
    ));
    out.extend(diff_objects(&source.routines, &target.routines, |o, n| {
        routines::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.triggers, &target.triggers, |o, n| {
        triggers::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.rules, &target.rules, |o, n| {
        rules::diff(ctx, o, n)
    }));
    out.extend(diff_objects(&source.policies, &target.policies, |o, n| {
        policies::diff(ctx, o, n)
    }));
    out.extend(diff_objects(
        &source.foreign_data_wrappers,
        &target.foreign_data_wrappers,
        |o, n| foreign::diff_wrapper(ctx, o, n),
    ));
    out.extend(diff_objects(&source.servers, &target.servers, |o, n| {
        foreign::diff_server(ctx, o, n)
    }));
    out.extend(diff_objects(
        &source.user_mappings,
        &target.user_mappings,
        |o, n| foreign::diff_user_mapping(ctx, o, n),
    ));
    out.extend(diff_objects(
        &source.foreign_tables,
        &target.foreign_tables,
        |o, n| foreign::diff_foreign_table(ctx, o, n),
    ));
    out.extend(diff_objects(
        &source.publications,
        &target.publications,
        |o, n| replication::diff_publication(ctx, o, n),
    ));
    out.extend(diff_objects(
        &source.subscriptions,
        &target.subscriptions,
        |o, n| replication::diff_subscription(ctx, o, n),
    ));
    out.extend(diff_objects(
        &source.event_triggers,
        &target.event_triggers,
        |o, n| event_triggers::diff(ctx, o, n),
    ));
    out.extend(default_privileges::diff(ctx));

    info!(changes = out.len(), "diff complete");
    out
}
