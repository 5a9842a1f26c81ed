//! pgdrift compares two PostgreSQL catalog snapshots and produces an ordered
//! migration plan that transforms the first into the second, then applies it
//! transactionally with fingerprint safety checks.
//!
//! The pipeline: extract two [`catalog::Catalog`] values (via the external
//! [`extract::CatalogExtractor`] seam) → [`diff::diff_catalogs`] → hook
//! filtering → [`diff::expand::expand_replacements`] → [`sort::sort_changes`]
//! → [`plan::build_plan`] → [`apply::apply`].

pub mod apply;
pub mod catalog;
pub mod change;
pub mod diff;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod hooks;
pub mod plan;
pub mod sort;

pub use apply::{apply, ApplyOptions, ApplyOutcome};
pub use catalog::id::ObjectId;
pub use catalog::Catalog;
pub use change::{Change, ChangeKind, EmitContext, SqlFormat};
pub use diff::DiffContext;
pub use error::Error;
pub use hooks::Hooks;
pub use plan::{Plan, PlanOptions, Risk};
pub use sort::CycleError;

/// Runs the full planning pipeline: diff, hook filtering, replace-dependency
/// expansion, topological ordering and plan assembly.
pub fn plan_migration(
    source: &Catalog,
    target: &Catalog,
    hooks: &Hooks<'_>,
    options: &PlanOptions,
) -> Result<Plan, Error> {
    let ctx = DiffContext::new(source, target);

    let mut changes = diff::diff_catalogs(&ctx);
    changes.retain(|change| hooks.keeps(&ctx, change));
    let changes = diff::expand::expand_replacements(changes, &ctx);
    let ordered = sort::sort_changes(&changes, &ctx)?;
    plan::build_plan(&ctx, &ordered, hooks, options)
}
