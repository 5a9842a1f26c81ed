//! The apply engine: fingerprint-gated, transactional plan execution.

use tracing::{info, warn};

use crate::error::Error;
use crate::extract::{CatalogExtractor, ScriptExecutor};
use crate::fingerprint::fingerprint_scope;
use crate::plan::{Plan, PLAN_VERSION};

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// data-loss plans are refused unless this is set
    pub allow_data_loss: bool,
    /// re-extract and re-fingerprint after execution
    pub verify_post_apply: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            allow_data_loss: false,
            verify_post_apply: true,
        }
    }
}

#[derive(Debug)]
pub enum ApplyOutcome {
    InvalidPlan {
        reason: String,
    },
    /// The database matches neither the plan's source nor its target state;
    /// human intervention required.
    FingerprintMismatch {
        expected: String,
        actual: String,
    },
    AlreadyApplied,
    Applied {
        statements: Vec<String>,
        warnings: Vec<String>,
    },
    Failed {
        script: String,
        error: String,
    },
}

/// Joins plan statements into the executable script.
pub fn render_script(statements: &[String]) -> String {
    let mut script = statements.join(";\n\n");
    script.push(';');
    script
}

/// Applies a plan to the target database.
///
/// The target's current catalog is fingerprinted over the plan scope first:
/// matching the target fingerprint means the plan already ran; anything other
/// than the source fingerprint aborts before a single statement executes.
/// Execution is transactional (the executor contract), and an optional
/// post-apply verification re-extracts the catalog, surfacing divergence as
/// warnings rather than failure.
pub async fn apply<X, E>(
    plan: &Plan,
    extractor: &mut X,
    executor: &mut E,
    options: &ApplyOptions,
) -> Result<ApplyOutcome, Error>
where
    X: CatalogExtractor,
    E: ScriptExecutor,
{
    if plan.version != PLAN_VERSION {
        return Ok(ApplyOutcome::InvalidPlan {
            reason: format!("unsupported plan version {}", plan.version),
        });
    }
    if plan.is_data_loss() && !options.allow_data_loss {
        let statements = match &plan.risk {
            crate::plan::Risk::DataLoss { statements } => statements.clone(),
            crate::plan::Risk::Safe => Vec::new(),
        };
        return Err(Error::DataLossRejected { statements });
    }

    let scope = plan.scope_ids();
    let catalog = extractor.extract().await.map_err(Error::Catalog)?;
    let current = fingerprint_scope(&catalog, &scope);

    if current == plan.target.fingerprint {
        info!("target already matches plan fingerprint, nothing to do");
        return Ok(ApplyOutcome::AlreadyApplied);
    }
    if current != plan.source.fingerprint {
        warn!(
            expected = %plan.source.fingerprint,
            actual = %current,
            "database state does not match plan source"
        );
        return Ok(ApplyOutcome::FingerprintMismatch {
            expected: plan.source.fingerprint.clone(),
            actual: current,
        });
    }

    let script = render_script(&plan.statements);
    info!(statements = plan.statements.len(), "applying plan");
    if let Err(error) = executor.execute(&script).await {
        return Ok(ApplyOutcome::Failed {
            script,
            error: format!("{error:#}"),
        });
    }

    let mut warnings = Vec::new();
    if options.verify_post_apply {
        let catalog = extractor.extract().await.map_err(Error::Catalog)?;
        let post = fingerprint_scope(&catalog, &scope);
        if post != plan.target.fingerprint {
            warn!(
                expected = %plan.target.fingerprint,
                actual = %post,
                "post-apply fingerprint does not match plan target"
            );
            warnings.push(format!(
                "post-apply fingerprint {post} does not match plan target {}",
                plan.target.fingerprint
            ));
        }
    }

    Ok(ApplyOutcome::Applied {
        statements: plan.statements.clone(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_script_terminates_statements() {
        let script = render_script(&["CREATE SCHEMA app".into(), "CREATE TABLE app.t ()".into()]);
        assert_eq!(script, "CREATE SCHEMA app;\n\nCREATE TABLE app.t ();");
    }
}
