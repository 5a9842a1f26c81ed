//! Apply-engine behavior against fake extractor/executor seams.

mod common;

use std::collections::VecDeque;

use common::*;
use pgdrift::extract::{CatalogExtractor, ScriptExecutor};
use pgdrift::{
    apply, plan_migration, ApplyOptions, ApplyOutcome, Catalog, Error, Hooks, PlanOptions,
};

/// Returns queued snapshots in order, repeating the last one.
struct FakeExtractor {
    snapshots: VecDeque<Catalog>,
}

impl FakeExtractor {
    fn new(snapshots: Vec<Catalog>) -> Self {
        Self {
            snapshots: snapshots.into(),
        }
    }
}

impl CatalogExtractor for FakeExtractor {
    async fn extract(&mut self) -> anyhow::Result<Catalog> {
        if self.snapshots.len() > 1 {
            Ok(self.snapshots.pop_front().expect("snapshot"))
        } else {
            self.snapshots
                .front()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no snapshot available"))
        }
    }
}

#[derive(Default)]
struct FakeExecutor {
    scripts: Vec<String>,
    fail_with: Option<String>,
}

impl ScriptExecutor for FakeExecutor {
    async fn execute(&mut self, script: &str) -> anyhow::Result<()> {
        self.scripts.push(script.to_string());
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

fn source_catalog() -> Catalog {
    let mut cat = catalog();
    cat.insert(table("public", "users", vec![column("id", 1, "bigint")]));
    cat
}

fn target_catalog() -> Catalog {
    let mut cat = catalog();
    cat.insert(table(
        "public",
        "users",
        vec![column("id", 1, "bigint"), column("email", 2, "text")],
    ));
    cat
}

fn users_plan() -> pgdrift::Plan {
    plan_migration(
        &source_catalog(),
        &target_catalog(),
        &Hooks::none(),
        &PlanOptions::default(),
    )
    .expect("plan")
}

#[tokio::test]
async fn test_apply_executes_and_verifies() {
    let plan = users_plan();
    let mut extractor = FakeExtractor::new(vec![source_catalog(), target_catalog()]);
    let mut executor = FakeExecutor::default();

    let outcome = apply(&plan, &mut extractor, &mut executor, &ApplyOptions::default())
        .await
        .unwrap();

    match outcome {
        ApplyOutcome::Applied {
            statements,
            warnings,
        } => {
            assert_eq!(statements, plan.statements);
            assert!(warnings.is_empty(), "{warnings:?}");
        }
        other => panic!("expected Applied, got {other:?}"),
    }
    assert_eq!(executor.scripts.len(), 1);
    assert_eq!(
        executor.scripts[0],
        "ALTER TABLE public.users ADD COLUMN email text;"
    );
}

#[tokio::test]
async fn test_apply_is_idempotent_on_matching_target() {
    let plan = users_plan();
    let mut extractor = FakeExtractor::new(vec![target_catalog()]);
    let mut executor = FakeExecutor::default();

    let outcome = apply(&plan, &mut extractor, &mut executor, &ApplyOptions::default())
        .await
        .unwrap();

    assert!(matches!(outcome, ApplyOutcome::AlreadyApplied));
    assert!(executor.scripts.is_empty());
}

#[tokio::test]
async fn test_apply_refuses_unrecognized_state() {
    let plan = users_plan();
    // a database in some third state: same table, different column type
    let mut drifted = catalog();
    drifted.insert(table("public", "users", vec![column("id", 1, "integer")]));

    let mut extractor = FakeExtractor::new(vec![drifted]);
    let mut executor = FakeExecutor::default();

    let outcome = apply(&plan, &mut extractor, &mut executor, &ApplyOptions::default())
        .await
        .unwrap();

    match outcome {
        ApplyOutcome::FingerprintMismatch { expected, actual } => {
            assert_eq!(expected, plan.source.fingerprint);
            assert_ne!(actual, plan.source.fingerprint);
        }
        other => panic!("expected FingerprintMismatch, got {other:?}"),
    }
    assert!(executor.scripts.is_empty());
}

#[tokio::test]
async fn test_apply_surfaces_post_verify_divergence_as_warning() {
    let plan = users_plan();
    // execution "succeeds" but the fake database never changes state
    let mut extractor = FakeExtractor::new(vec![source_catalog(), source_catalog()]);
    let mut executor = FakeExecutor::default();

    let outcome = apply(&plan, &mut extractor, &mut executor, &ApplyOptions::default())
        .await
        .unwrap();

    match outcome {
        ApplyOutcome::Applied { warnings, .. } => {
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].contains("post-apply fingerprint"));
        }
        other => panic!("expected Applied with warnings, got {other:?}"),
    }
}

#[tokio::test]
async fn test_apply_failure_reports_script_and_error() {
    let plan = users_plan();
    let mut extractor = FakeExtractor::new(vec![source_catalog()]);
    let mut executor = FakeExecutor {
        scripts: Vec::new(),
        fail_with: Some("column \"email\" already exists".to_string()),
    };

    let outcome = apply(&plan, &mut extractor, &mut executor, &ApplyOptions::default())
        .await
        .unwrap();

    match outcome {
        ApplyOutcome::Failed { script, error } => {
            assert!(script.contains("ADD COLUMN email"));
            assert!(error.contains("already exists"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_data_loss_plan_requires_override() {
    // reversed direction: dropping the email column
    let plan = plan_migration(
        &target_catalog(),
        &source_catalog(),
        &Hooks::none(),
        &PlanOptions::default(),
    )
    .unwrap();
    assert!(plan.is_data_loss());

    let mut extractor = FakeExtractor::new(vec![target_catalog(), source_catalog()]);
    let mut executor = FakeExecutor::default();

    let refused = apply(&plan, &mut extractor, &mut executor, &ApplyOptions::default()).await;
    assert!(matches!(refused, Err(Error::DataLossRejected { .. })));
    assert!(executor.scripts.is_empty());

    let options = ApplyOptions {
        allow_data_loss: true,
        ..ApplyOptions::default()
    };
    let outcome = apply(&plan, &mut extractor, &mut executor, &options)
        .await
        .unwrap();
    assert!(matches!(outcome, ApplyOutcome::Applied { .. }));
}

#[tokio::test]
async fn test_invalid_plan_version_is_rejected() {
    let mut plan = users_plan();
    plan.version = 99;

    let mut extractor = FakeExtractor::new(vec![source_catalog()]);
    let mut executor = FakeExecutor::default();
    let outcome = apply(&plan, &mut extractor, &mut executor, &ApplyOptions::default())
        .await
        .unwrap();
    assert!(matches!(outcome, ApplyOutcome::InvalidPlan { .. }));
}
