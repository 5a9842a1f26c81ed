//! The plan artifact: ordered statements bound to source and target
//! fingerprints, with a risk classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::catalog::id::ObjectId;
use crate::catalog::routine::RoutineKind;
use crate::change::routine::RoutineChange;
use crate::change::types::TypeChange;
use crate::change::{Change, ChangeKind, EmitContext, SqlFormat};
use crate::diff::DiffContext;
use crate::error::Error;
use crate::fingerprint::{collect_scope, fingerprint_scope};
use crate::hooks::Hooks;

/// Envelope schema version understood by this crate.
pub const PLAN_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEndpoint {
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Risk {
    Safe,
    DataLoss { statements: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub version: u32,
    #[serde(rename = "toolVersion", skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    pub source: PlanEndpoint,
    pub target: PlanEndpoint,
    pub statements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// opaque integration configuration, carried but never interpreted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialize: Option<Value>,
    pub risk: Risk,
    /// stable identities the fingerprints cover
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
}

impl Plan {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let plan: Plan =
            serde_json::from_str(raw).map_err(|e| Error::InvalidPlan(e.to_string()))?;
        if plan.version != PLAN_VERSION {
            return Err(Error::InvalidPlan(format!(
                "unsupported plan version {} (expected {PLAN_VERSION})",
                plan.version
            )));
        }
        if plan.source.fingerprint.is_empty() || plan.target.fingerprint.is_empty() {
            return Err(Error::InvalidPlan("missing fingerprints".to_string()));
        }
        Ok(plan)
    }

    pub fn is_data_loss(&self) -> bool {
        matches!(self.risk, Risk::DataLoss { .. })
    }

    /// The fingerprint scope, recovered from the persisted identity list.
    pub fn scope_ids(&self) -> std::collections::BTreeSet<ObjectId> {
        self.scope
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub role: Option<String>,
    pub tool_version: Option<String>,
    pub format: Option<SqlFormat>,
    /// recorded on the envelope for the integration that produced them
    pub filter_config: Option<Value>,
    pub serialize_config: Option<Value>,
}

/// A change destroys user data when it drops a data-carrying identity:
/// tables, table columns, materialized views, sequences, or an enum type
/// (labels can only be removed by replacing the type).
fn destroys_data(ctx: &DiffContext<'_>, change: &Change) -> bool {
    if let Change::Type(TypeChange::Drop { .. }) = change {
        return ctx
            .source
            .types
            .get(&change.target())
            .is_some_and(|t| t.enum_labels().is_some());
    }
    change.drops().iter().any(|id| {
        matches!(
            id,
            ObjectId::Table { .. }
                | ObjectId::Column { .. }
                | ObjectId::MaterializedView { .. }
                | ObjectId::Sequence { .. }
        )
    })
}

/// Procedures and aggregates are validated eagerly at definition time, so any
/// plan that creates or replaces one runs with lazy body checking.
fn needs_function_body_prelude(changes: &[&Change]) -> bool {
    changes.iter().any(|change| match change {
        Change::Routine(RoutineChange::Create { routine })
        | Change::Routine(RoutineChange::Replace { routine }) => {
            matches!(routine.kind, RoutineKind::Procedure | RoutineKind::Aggregate)
        }
        _ => false,
    })
}

/// Assembles the plan from an ordered change list: session preludes, emitted
/// statements (with serializer-hook overrides), risk classification and the
/// scope-restricted fingerprints of both catalogs.
pub fn build_plan(
    ctx: &DiffContext<'_>,
    ordered: &[&Change],
    hooks: &Hooks<'_>,
    options: &PlanOptions,
) -> Result<Plan, Error> {
    let emit_ctx = options
        .format
        .clone()
        .map(EmitContext::formatted)
        .unwrap_or_default();

    let mut statements = Vec::new();
    if let Some(role) = &options.role {
        statements.push(format!(
            "SET ROLE {}",
            crate::change::quote::quote_ident(role)
        ));
    }
    if needs_function_body_prelude(ordered) {
        statements.push("SET check_function_bodies = false".to_string());
    }

    let mut data_loss_statements = Vec::new();
    for change in ordered {
        let sql = match hooks.serialize_override(ctx, change) {
            Some(overridden) => overridden,
            None => change.emit(&emit_ctx)?,
        };
        if destroys_data(ctx, change) {
            data_loss_statements.push(sql.clone());
        }
        statements.push(sql);
    }

    let scope = collect_scope(ordered.iter().copied());
    let source_fingerprint = fingerprint_scope(ctx.source, &scope);
    let target_fingerprint = fingerprint_scope(ctx.target, &scope);

    let risk = if data_loss_statements.is_empty() {
        Risk::Safe
    } else {
        Risk::DataLoss {
            statements: data_loss_statements,
        }
    };

    info!(
        statements = statements.len(),
        data_loss = matches!(risk, Risk::DataLoss { .. }),
        "plan assembled"
    );

    Ok(Plan {
        version: PLAN_VERSION,
        tool_version: options.tool_version.clone(),
        source: PlanEndpoint {
            fingerprint: source_fingerprint,
        },
        target: PlanEndpoint {
            fingerprint: target_fingerprint,
        },
        statements,
        role: options.role.clone(),
        filter: options.filter_config.clone(),
        serialize: options.serialize_config.clone(),
        risk,
        scope: scope.iter().map(ObjectId::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_json_round_trip() {
        let plan = Plan {
            version: PLAN_VERSION,
            tool_version: Some("0.1.0".into()),
            source: PlanEndpoint {
                fingerprint: "ab".into(),
            },
            target: PlanEndpoint {
                fingerprint: "cd".into(),
            },
            statements: vec!["CREATE SCHEMA app".into()],
            role: Some("migrator".into()),
            filter: None,
            serialize: None,
            risk: Risk::Safe,
            scope: vec!["schema:app".into()],
        };
        let json = plan.to_json();
        assert!(json.contains("\"toolVersion\""));
        assert!(json.contains("\"level\": \"safe\""));

        let parsed = Plan::from_json(&json).unwrap();
        assert_eq!(parsed.statements, plan.statements);
        assert_eq!(parsed.risk, Risk::Safe);
    }

    #[test]
    fn test_unsupported_version_is_invalid() {
        let raw = r#"{
            "version": 99,
            "source": {"fingerprint": "ab"},
            "target": {"fingerprint": "cd"},
            "statements": [],
            "risk": {"level": "safe"}
        }"#;
        assert!(Plan::from_json(raw).is_err());
    }

    #[test]
    fn test_data_loss_risk_serialization() {
        let risk = Risk::DataLoss {
            statements: vec!["DROP TABLE public.users".into()],
        };
        let json = serde_json::to_string(&risk).unwrap();
        assert_eq!(
            json,
            "{\"level\":\"data_loss\",\"statements\":[\"DROP TABLE public.users\"]}"
        );
    }
}
