//! Mermaid rendering of a phase's dependency graph, for debugging sort
//! problems. Gated by the `PGDRIFT_DEBUG_GRAPH` environment variable; purely
//! diagnostic and never part of any output contract.

use crate::change::{Change, ChangeKind};
use crate::sort::Constraint;

const ENV_VAR: &str = "PGDRIFT_DEBUG_GRAPH";

pub(crate) fn dump_graph(
    phase: &str,
    changes: &[&Change],
    constraints: &[Constraint],
    cycle: &[usize],
) {
    if std::env::var(ENV_VAR).map(|v| v.is_empty() || v == "0").unwrap_or(true) {
        return;
    }
    eprintln!("{}", render_mermaid(phase, changes, constraints, cycle));
}

pub(crate) fn render_mermaid(
    phase: &str,
    changes: &[&Change],
    constraints: &[Constraint],
    cycle: &[usize],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("%% {phase} phase dependency graph\n"));
    out.push_str("flowchart TD\n");

    for (i, change) in changes.iter().enumerate() {
        let label = change
            .creates()
            .first()
            .map(|id| id.to_string())
            .unwrap_or_else(|| change.target().to_string());
        let label = label.replace('"', "'");
        out.push_str(&format!("    n{i}[\"{} {label}\"]\n", change.describe()));
    }
    for constraint in constraints {
        out.push_str(&format!(
            "    n{} -->|{}| n{}\n",
            constraint.from,
            match constraint.source {
                crate::sort::ConstraintSource::Catalog => "catalog",
                crate::sort::ConstraintSource::Explicit => "explicit",
                crate::sort::ConstraintSource::Custom => "custom",
            },
            constraint.to
        ));
    }
    for &node in cycle {
        out.push_str(&format!(
            "    style n{node} fill:#f66,stroke:#900,stroke-width:2px\n"
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::SchemaDef;
    use crate::change::schema::SchemaChange;
    use crate::sort::{ConstraintSource, EdgeReason};

    #[test]
    fn test_render_mermaid_marks_cycle_nodes() {
        let a = Change::Schema(SchemaChange::Create {
            schema: SchemaDef {
                name: "app".into(),
                owner: "postgres".into(),
                comment: None,
                privileges: Vec::new(),
            },
        });
        let b = Change::Schema(SchemaChange::Drop { name: "old".into() });
        let changes: Vec<&Change> = vec![&a, &b];
        let constraints = vec![Constraint {
            source: ConstraintSource::Explicit,
            from: 0,
            to: 1,
            reason: Some(EdgeReason {
                dependent: None,
                referenced: crate::catalog::id::ObjectId::Schema { name: "app".into() },
            }),
        }];

        let rendered = render_mermaid("create", &changes, &constraints, &[1]);
        assert!(rendered.starts_with("%% create phase dependency graph\nflowchart TD\n"));
        assert!(rendered.contains("n0 -->|explicit| n1"));
        assert!(rendered.contains("style n1"));
    }
}
