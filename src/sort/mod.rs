//! Topological ordering of changes.
//!
//! Changes are partitioned into four phases (drops; revokes and other alters;
//! creates; grants, comments and ownership), each phase sorted independently
//! against a constraint graph and concatenated. Constraints come from three
//! sources: pg_depend rows, each change's explicit `requires` set, and a small
//! enumerated family of custom rules. Only one class of cycle is broken
//! automatically: the benign sequence-ownership loop between a sequence and
//! the column whose default consumes it, which a later `ALTER SEQUENCE OWNED
//! BY` realizes anyway.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;

use tracing::{debug, info};

use crate::catalog::id::ObjectId;
use crate::catalog::{CatalogEntity, DependRow};
use crate::change::privilege::DefaultPrivilegeChange;
use crate::change::sequence::SequenceChange;
use crate::change::{Change, ChangeKind, Operation, Scope};
use crate::diff::DiffContext;

pub mod debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Drop,
    Alter,
    Create,
    Post,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Drop => "drop",
            Phase::Alter => "alter",
            Phase::Create => "create",
            Phase::Post => "post",
        }
    }
}

/// Assigns a change to its emission phase.
pub(crate) fn phase_of(change: &Change) -> Phase {
    match change {
        // ownership is realized after both the sequence and the table exist
        Change::Sequence(SequenceChange::SetOwnedBy { .. }) => return Phase::Post,
        // default privileges sort with creates: custom edges place them before
        // the creates they cover, explicit edges place them after the roles
        // and schemas they mention
        Change::DefaultPrivilege(_) => return Phase::Create,
        _ => {}
    }

    match (change.operation(), change.scope()) {
        (Operation::Drop, Scope::Privilege | Scope::Comment | Scope::Membership) => Phase::Alter,
        (Operation::Drop, _) => Phase::Drop,
        (Operation::Alter, Scope::Owner) => Phase::Post,
        (Operation::Alter, _) => Phase::Alter,
        (Operation::Create, Scope::Privilege | Scope::Comment | Scope::Membership) => Phase::Post,
        (Operation::Create, _) => Phase::Create,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSource {
    Catalog,
    Explicit,
    Custom,
}

impl ConstraintSource {
    fn name(self) -> &'static str {
        match self {
            ConstraintSource::Catalog => "catalog",
            ConstraintSource::Explicit => "explicit",
            ConstraintSource::Custom => "custom",
        }
    }
}

/// The identity pair that justified a catalog or explicit edge; used by the
/// cycle-breaking filters and by diagnostics.
#[derive(Debug, Clone)]
pub struct EdgeReason {
    pub dependent: Option<ObjectId>,
    pub referenced: ObjectId,
}

/// One ordering constraint: the change at `from` emits before the one at `to`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub source: ConstraintSource,
    pub from: usize,
    pub to: usize,
    pub reason: Option<EdgeReason>,
}

/// A node inside an unresolvable cycle.
#[derive(Debug, Clone)]
pub struct CycleNode {
    pub index: usize,
    pub constructor: String,
    pub creates: Vec<String>,
}

/// One edge of an unresolvable cycle, with the filter verdict that failed to
/// remove it.
#[derive(Debug, Clone)]
pub struct CycleEdge {
    pub from: usize,
    pub to: usize,
    pub source: ConstraintSource,
    pub dependent: Option<String>,
    pub referenced: Option<String>,
    pub filter_result: String,
}

#[derive(Debug)]
pub struct CycleError {
    pub phase: &'static str,
    pub nodes: Vec<CycleNode>,
    pub edges: Vec<CycleEdge>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "unresolvable dependency cycle in {} phase involving {} changes:",
            self.phase,
            self.nodes.len()
        )?;
        for node in &self.nodes {
            writeln!(
                f,
                "  [{}] {} creates {}",
                node.index,
                node.constructor,
                if node.creates.is_empty() {
                    "nothing".to_string()
                } else {
                    node.creates.join(", ")
                }
            )?;
        }
        for edge in &self.edges {
            write!(
                f,
                "  edge {} -> {} ({})",
                edge.from,
                edge.to,
                edge.source.name()
            )?;
            if let Some(referenced) = &edge.referenced {
                write!(f, " referenced={referenced}")?;
            }
            if let Some(dependent) = &edge.dependent {
                write!(f, " dependent={dependent}")?;
            }
            writeln!(f, "; {}", edge.filter_result)?;
        }
        Ok(())
    }
}

impl std::error::Error for CycleError {}

/// Index from identity to the node positions that provide it. Lookups fall
/// back to the owning object so column- and constraint-level identities
/// resolve to the change creating their table.
struct IdIndex {
    map: BTreeMap<ObjectId, Vec<usize>>,
}

impl IdIndex {
    fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    fn insert(&mut self, id: ObjectId, node: usize) {
        self.map.entry(id).or_default().push(node);
    }

    fn lookup(&self, id: &ObjectId) -> &[usize] {
        if let Some(nodes) = self.map.get(id) {
            return nodes;
        }
        let owner = id.owning_object();
        if owner != *id
            && let Some(nodes) = self.map.get(&owner)
        {
            return nodes;
        }
        &[]
    }
}

fn build_constraints(phase: Phase, changes: &[&Change], depends: &[DependRow]) -> Vec<Constraint> {
    let mut creators = IdIndex::new();
    let mut requirers = IdIndex::new();

    for (i, change) in changes.iter().enumerate() {
        for id in change.creates() {
            creators.insert(id, i);
        }
        for id in change.requires() {
            requirers.insert(id, i);
        }
        // in the drop phase, edges are derived from the identities about to
        // be destroyed
        if phase == Phase::Drop {
            for id in change.drops() {
                creators.insert(id, i);
            }
        }
    }

    let mut constraints = Vec::new();
    let mut push = |source: ConstraintSource, from: usize, to: usize, reason: Option<EdgeReason>| {
        if from != to {
            constraints.push(Constraint {
                source,
                from,
                to,
                reason,
            });
        }
    };

    // catalog edges from pg_depend
    for row in depends {
        if row.dependent.is_unknown() || row.referenced.is_unknown() {
            continue;
        }
        let reason = EdgeReason {
            dependent: Some(row.dependent.clone()),
            referenced: row.referenced.clone(),
        };
        if phase == Phase::Drop {
            // dependents drop before their dependencies
            for &from in creators.lookup(&row.dependent) {
                for &to in creators.lookup(&row.referenced) {
                    push(ConstraintSource::Catalog, from, to, Some(reason.clone()));
                }
            }
        } else {
            for &from in creators.lookup(&row.referenced) {
                for &to in creators.lookup(&row.dependent) {
                    push(ConstraintSource::Catalog, from, to, Some(reason.clone()));
                }
                for &to in requirers.lookup(&row.dependent) {
                    push(ConstraintSource::Catalog, from, to, Some(reason.clone()));
                }
            }
        }
    }

    // explicit edges from each change's requires set
    if phase != Phase::Drop {
        for (to, change) in changes.iter().enumerate() {
            for required in change.requires() {
                for &from in creators.lookup(&required) {
                    push(
                        ConstraintSource::Explicit,
                        from,
                        to,
                        Some(EdgeReason {
                            dependent: None,
                            referenced: required.clone(),
                        }),
                    );
                }
            }
        }
    }

    // custom rule: default-privilege changes emit before the creates whose
    // effective ACL they alter; role and schema creates are their
    // dependencies and stay ahead of them via explicit edges
    if phase == Phase::Create {
        let default_privilege_nodes: Vec<(usize, &DefaultPrivilegeChange)> = changes
            .iter()
            .enumerate()
            .filter_map(|(i, change)| match change {
                Change::DefaultPrivilege(dp) => Some((i, dp)),
                _ => None,
            })
            .collect();

        if !default_privilege_nodes.is_empty() {
            for (to, change) in changes.iter().enumerate() {
                if change.operation() != Operation::Create {
                    continue;
                }
                let target = change.target();
                if matches!(target, ObjectId::Role { .. } | ObjectId::Schema { .. }) {
                    continue;
                }
                let Some(objtype) = crate::catalog::acl::objtype_for(&target) else {
                    continue;
                };
                for (from, dp) in &default_privilege_nodes {
                    let schema_matches = match dp.schema() {
                        None => true,
                        Some(schema) => target.schema() == Some(schema),
                    };
                    if dp.objtype() == objtype && schema_matches {
                        push(ConstraintSource::Custom, *from, to, None);
                    }
                }
            }
        }
    }

    constraints
}

/// Kahn's algorithm with a min-heap on node index: deterministic whenever
/// several nodes are simultaneously free. Returns `None` on a cycle.
fn stable_toposort(n: usize, constraints: &[Constraint]) -> Option<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for c in constraints {
        adjacency[c.from].push(c.to);
        indegree[c.to] += 1;
    }

    let mut heap: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| indegree[i] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(Reverse(node)) = heap.pop() {
        order.push(node);
        for &next in &adjacency[node] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                heap.push(Reverse(next));
            }
        }
    }

    (order.len() == n).then_some(order)
}

/// Finds one directed cycle via DFS, returned as a node sequence where each
/// node has an edge to the next (wrapping around).
fn find_cycle(n: usize, constraints: &[Constraint]) -> Vec<usize> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for c in constraints {
        adjacency[c.from].push(c.to);
    }

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state = vec![0u8; n];
    let mut stack: Vec<usize> = Vec::new();

    fn dfs(
        node: usize,
        adjacency: &[Vec<usize>],
        state: &mut [u8],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        state[node] = 1;
        stack.push(node);
        for &next in &adjacency[node] {
            match state[next] {
                0 => {
                    if let Some(cycle) = dfs(next, adjacency, state, stack) {
                        return Some(cycle);
                    }
                }
                1 => {
                    let start = stack.iter().position(|&x| x == next).unwrap_or(0);
                    return Some(stack[start..].to_vec());
                }
                _ => {}
            }
        }
        stack.pop();
        state[node] = 2;
        None
    }

    for start in 0..n {
        if state[start] == 0
            && let Some(cycle) = dfs(start, &adjacency, &mut state, &mut stack)
        {
            return cycle;
        }
        stack.clear();
    }
    Vec::new()
}

/// The sequence-ownership cycle filter. A catalog edge whose dependent is a
/// sequence created in this phase, where that sequence's OWNED BY column (or
/// its table) is the edge's referenced identity, is benign: ownership is
/// realized by a later `ALTER SEQUENCE OWNED BY` statement.
fn sequence_ownership_edge(changes: &[&Change], constraint: &Constraint) -> bool {
    if constraint.source != ConstraintSource::Catalog {
        return false;
    }
    let Some(reason) = &constraint.reason else {
        return false;
    };
    let Some(dependent) = &reason.dependent else {
        return false;
    };
    if !matches!(dependent, ObjectId::Sequence { .. }) {
        return false;
    }

    let Change::Sequence(SequenceChange::Create { sequence }) = changes[constraint.to] else {
        return false;
    };
    if &sequence.id() != dependent {
        return false;
    }
    match sequence.owned_by_column() {
        Some(column) => column == reason.referenced || column.owning_object() == reason.referenced,
        None => false,
    }
}

fn cycle_error(
    phase: Phase,
    changes: &[&Change],
    constraints: &[Constraint],
    cycle: &[usize],
) -> CycleError {
    let nodes = cycle
        .iter()
        .map(|&index| CycleNode {
            index,
            constructor: changes[index].describe(),
            creates: changes[index]
                .creates()
                .iter()
                .take(2)
                .map(ObjectId::to_string)
                .collect(),
        })
        .collect();

    let mut edges = Vec::new();
    for (pos, &from) in cycle.iter().enumerate() {
        let to = cycle[(pos + 1) % cycle.len()];
        for constraint in constraints.iter().filter(|c| c.from == from && c.to == to) {
            let filter_result = match constraint.source {
                ConstraintSource::Custom => "custom edges are never filtered".to_string(),
                ConstraintSource::Explicit => "explicit edges are never filtered".to_string(),
                ConstraintSource::Catalog => {
                    if sequence_ownership_edge(changes, constraint) {
                        "matched the sequence-ownership filter".to_string()
                    } else {
                        "did not match the sequence-ownership filter".to_string()
                    }
                }
            };
            edges.push(CycleEdge {
                from,
                to,
                source: constraint.source,
                dependent: constraint
                    .reason
                    .as_ref()
                    .and_then(|r| r.dependent.as_ref())
                    .map(ObjectId::to_string),
                referenced: constraint
                    .reason
                    .as_ref()
                    .map(|r| r.referenced.to_string()),
                filter_result,
            });
        }
    }

    CycleError {
        phase: phase.name(),
        nodes,
        edges,
    }
}

fn sort_phase<'a>(
    phase: Phase,
    changes: Vec<&'a Change>,
    depends: &[DependRow],
) -> Result<Vec<&'a Change>, CycleError> {
    if changes.len() <= 1 {
        return Ok(changes);
    }

    let mut constraints = build_constraints(phase, &changes, depends);
    debug!(
        phase = phase.name(),
        nodes = changes.len(),
        edges = constraints.len(),
        "sorting phase"
    );

    loop {
        if let Some(order) = stable_toposort(changes.len(), &constraints) {
            debug::dump_graph(phase.name(), &changes, &constraints, &[]);
            return Ok(order.into_iter().map(|i| changes[i]).collect());
        }

        let cycle = find_cycle(changes.len(), &constraints);
        debug::dump_graph(phase.name(), &changes, &constraints, &cycle);

        // drop filterable edges on this cycle only
        let mut removed = false;
        constraints.retain(|constraint| {
            let on_cycle = cycle.iter().enumerate().any(|(pos, &from)| {
                constraint.from == from && constraint.to == cycle[(pos + 1) % cycle.len()]
            });
            if on_cycle && sequence_ownership_edge(&changes, constraint) {
                removed = true;
                false
            } else {
                true
            }
        });

        if !removed {
            return Err(cycle_error(phase, &changes, &constraints, &cycle));
        }
    }
}

/// Orders a filtered change list for emission. Drop-phase edges come from the
/// source catalog's dependency rows (those identities exist only there); the
/// remaining phases use the target's.
pub fn sort_changes<'a>(
    changes: &'a [Change],
    ctx: &DiffContext<'_>,
) -> Result<Vec<&'a Change>, CycleError> {
    info!(changes = changes.len(), "ordering changes");

    let mut drops = Vec::new();
    let mut revokes = Vec::new();
    let mut alters = Vec::new();
    let mut creates = Vec::new();
    let mut post = Vec::new();

    for change in changes {
        match phase_of(change) {
            Phase::Drop => drops.push(change),
            Phase::Alter => {
                // privilege reductions lead the alter phase
                if change.operation() == Operation::Drop {
                    revokes.push(change);
                } else {
                    alters.push(change);
                }
            }
            Phase::Create => creates.push(change),
            Phase::Post => post.push(change),
        }
    }
    revokes.extend(alters);

    let mut ordered = Vec::with_capacity(changes.len());
    ordered.extend(sort_phase(Phase::Drop, drops, &ctx.source.depends)?);
    ordered.extend(sort_phase(Phase::Alter, revokes, &ctx.target.depends)?);
    ordered.extend(sort_phase(Phase::Create, creates, &ctx.target.depends)?);
    ordered.extend(sort_phase(Phase::Post, post, &ctx.target.depends)?);
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sequence::Sequence;
    use crate::catalog::table::{Column, Table};
    use crate::catalog::{Catalog, DepType};
    use crate::change::table::TableChange;

    fn users_id_seq() -> Sequence {
        Sequence {
            schema: "public".into(),
            name: "users_id_seq".into(),
            owner: "postgres".into(),
            data_type: "bigint".into(),
            increment: 1,
            min_value: 1,
            max_value: 9223372036854775807,
            start_value: 1,
            cache: 1,
            cycle: false,
            owned_by: Some("public.users.id".into()),
            comment: None,
            privileges: Vec::new(),
        }
    }

    fn users_table() -> Table {
        let mut id = Column::new("id", 1, "bigint");
        id.not_null = true;
        id.default = Some("nextval('public.users_id_seq'::regclass)".into());
        Table::new("public", "users", "postgres", vec![id])
    }

    #[test]
    fn test_sequence_ownership_cycle_is_broken() {
        let source = Catalog::empty();
        let mut target = Catalog::empty();
        target.depends.push(DependRow {
            dependent: ObjectId::Sequence {
                schema: "public".into(),
                name: "users_id_seq".into(),
            },
            referenced: ObjectId::Column {
                schema: "public".into(),
                table: "users".into(),
                name: "id".into(),
            },
            deptype: DepType::Auto,
        });
        target.depends.push(DependRow {
            dependent: ObjectId::Column {
                schema: "public".into(),
                table: "users".into(),
                name: "id".into(),
            },
            referenced: ObjectId::Sequence {
                schema: "public".into(),
                name: "users_id_seq".into(),
            },
            deptype: DepType::Normal,
        });

        let changes = vec![
            Change::Table(TableChange::Create {
                table: users_table(),
            }),
            Change::Sequence(SequenceChange::Create {
                sequence: users_id_seq(),
            }),
            Change::Sequence(SequenceChange::SetOwnedBy {
                schema: "public".into(),
                name: "users_id_seq".into(),
                owned_by: Some("public.users.id".into()),
            }),
        ];

        let ctx = DiffContext::new(&source, &target);
        let ordered = sort_changes(&changes, &ctx).expect("cycle should be broken");
        let rendered: Vec<String> = ordered
            .iter()
            .map(|c| c.emit(&crate::change::EmitContext::plain()).unwrap())
            .collect();

        let seq_pos = rendered
            .iter()
            .position(|s| s.starts_with("CREATE SEQUENCE"))
            .unwrap();
        let table_pos = rendered
            .iter()
            .position(|s| s.starts_with("CREATE TABLE"))
            .unwrap();
        let owned_pos = rendered
            .iter()
            .position(|s| s.contains("OWNED BY"))
            .unwrap();
        assert!(seq_pos < table_pos);
        assert!(table_pos < owned_pos);
    }

    #[test]
    fn test_unbreakable_cycle_reports_edges() {
        // two views selecting from each other: no filter applies
        let source = Catalog::empty();
        let mut target = Catalog::empty();
        let a = ObjectId::View {
            schema: "public".into(),
            name: "a".into(),
        };
        let b = ObjectId::View {
            schema: "public".into(),
            name: "b".into(),
        };
        target.depends.push(DependRow {
            dependent: a.clone(),
            referenced: b.clone(),
            deptype: DepType::Normal,
        });
        target.depends.push(DependRow {
            dependent: b.clone(),
            referenced: a.clone(),
            deptype: DepType::Normal,
        });

        let view = |name: &str| {
            Change::View(crate::change::view::ViewChange::Create {
                view: crate::catalog::view::View {
                    schema: "public".into(),
                    name: name.into(),
                    owner: "postgres".into(),
                    definition: "SELECT 1".into(),
                    options: Vec::new(),
                    comment: None,
                    privileges: Vec::new(),
                },
            })
        };
        let changes = vec![view("a"), view("b")];
        let ctx = DiffContext::new(&source, &target);

        let err = sort_changes(&changes, &ctx).unwrap_err();
        assert_eq!(err.phase, "create");
        assert_eq!(err.nodes.len(), 2);
        assert!(!err.edges.is_empty());
        assert!(err
            .edges
            .iter()
            .all(|e| e.filter_result.contains("did not match")));
    }

    #[test]
    fn test_stable_order_without_constraints() {
        let source = Catalog::empty();
        let target = Catalog::empty();
        let ctx = DiffContext::new(&source, &target);
        let changes = vec![
            Change::Schema(crate::change::schema::SchemaChange::Create {
                schema: crate::catalog::schema::SchemaDef {
                    name: "b".into(),
                    owner: "postgres".into(),
                    comment: None,
                    privileges: Vec::new(),
                },
            }),
            Change::Schema(crate::change::schema::SchemaChange::Create {
                schema: crate::catalog::schema::SchemaDef {
                    name: "a".into(),
                    owner: "postgres".into(),
                    comment: None,
                    privileges: Vec::new(),
                },
            }),
        ];
        let ordered = sort_changes(&changes, &ctx).unwrap();
        // input order is preserved when nothing constrains the nodes
        assert_eq!(
            ordered[0].emit(&crate::change::EmitContext::plain()).unwrap(),
            "CREATE SCHEMA b"
        );
    }
}
