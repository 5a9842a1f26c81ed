//! Error kinds surfaced by the diff/sort/plan/apply pipeline.

use thiserror::Error;

use crate::sort::CycleError;

#[derive(Debug, Error)]
pub enum Error {
    /// Extraction failure raised by a [`crate::extract::CatalogExtractor`];
    /// passed through unchanged.
    #[error("catalog extraction failed: {0}")]
    Catalog(#[source] anyhow::Error),

    /// A diff expected an object to exist on both sides but it did not.
    /// Unreachable unless a catalog violates its own invariants.
    #[error("diff invariant violated: {0}")]
    DiffInvariant(String),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    /// Plan JSON failed envelope validation.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// The plan is classified `data_loss` and the caller did not opt in.
    #[error("refusing to apply a data-loss plan without an explicit override")]
    DataLossRejected { statements: Vec<String> },
}

/// Emission was asked to render a statement whose required field is missing.
/// These are documented non-null preconditions; the diff never produces them.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("cannot emit {change}: required field `{field}` is missing")]
    MissingField {
        change: &'static str,
        field: &'static str,
    },

    #[error("cannot emit {change} for target `{target}`")]
    InvalidTarget { change: &'static str, target: String },
}
