//! Enum, composite and range type diffing.
//!
//! Enum labels can only be added in place. Each addition is positioned
//! relative to a *working list* that starts as the source label order and is
//! updated after every insertion, so the emitted BEFORE/AFTER anchors always
//! exist at execution time. Removed or reordered labels force a replacement,
//! since PostgreSQL has no DROP VALUE.

use crate::catalog::custom_type::{EnumLabel, TypeDef, TypeKind};
use crate::catalog::CatalogEntity;
use crate::change::types::{EnumValuePosition, TypeChange};
use crate::change::Change;
use crate::diff::common::{altered_object_changes, created_object_changes};
use crate::diff::DiffContext;

fn create(ctx: &DiffContext<'_>, n: &TypeDef) -> Vec<Change> {
    let id = n.id();
    let mut changes = vec![Change::Type(TypeChange::Create {
        type_def: n.clone(),
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

fn drop(o: &TypeDef) -> Change {
    Change::Type(TypeChange::Drop {
        schema: o.schema.clone(),
        name: o.name.clone(),
    })
}

fn replace(ctx: &DiffContext<'_>, o: &TypeDef, n: &TypeDef) -> Vec<Change> {
    let mut changes = vec![drop(o)];
    changes.extend(create(ctx, n));
    changes
}

/// Resolves positions for labels present in `target` but not in `source`.
/// Returns `None` when a source label is missing from the target, which means
/// the enum must be replaced instead.
pub(crate) fn enum_additions(
    source: &[EnumLabel],
    target: &[EnumLabel],
) -> Option<Vec<(String, EnumValuePosition)>> {
    let mut working: Vec<&str> = source.iter().map(|l| l.name.as_str()).collect();
    let target_names: Vec<&str> = target.iter().map(|l| l.name.as_str()).collect();

    if working.iter().any(|name| !target_names.contains(name)) {
        return None;
    }

    // Surviving labels must keep their relative order, otherwise only a
    // replacement can realize the target.
    let surviving: Vec<&str> = target_names
        .iter()
        .copied()
        .filter(|name| working.contains(name))
        .collect();
    if surviving != working {
        return None;
    }

    let mut additions = Vec::new();
    for (i, name) in target_names.iter().enumerate() {
        if working.contains(name) {
            continue;
        }

        let next = target_names.get(i + 1).copied();
        let previous = i.checked_sub(1).and_then(|p| target_names.get(p)).copied();

        let (position, insert_at) = if let Some(next) =
            next.filter(|next| working.contains(next))
        {
            let at = working.iter().position(|w| w == &next).unwrap_or(working.len());
            (EnumValuePosition::Before(next.to_string()), at)
        } else if let Some(previous) = previous.filter(|previous| working.contains(previous)) {
            let at = working
                .iter()
                .position(|w| w == &previous)
                .map(|p| p + 1)
                .unwrap_or(working.len());
            (EnumValuePosition::After(previous.to_string()), at)
        } else if let Some(anchor) = target_names[i + 1..]
            .iter()
            .find(|candidate| working.contains(*candidate))
        {
            let at = working
                .iter()
                .position(|w| w == anchor)
                .unwrap_or(working.len());
            (EnumValuePosition::Before(anchor.to_string()), at)
        } else if let Some(last) = working.last().copied() {
            (EnumValuePosition::After(last.to_string()), working.len())
        } else {
            (EnumValuePosition::Last, working.len())
        };

        working.insert(insert_at, *name);
        additions.push((name.to_string(), position));
    }
    Some(additions)
}

pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&TypeDef>,
    new: Option<&TypeDef>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create(ctx, n),
        (Some(o), None) => vec![drop(o)],
        (Some(o), Some(n)) => {
            let replaced = match (&o.kind, &n.kind) {
                (TypeKind::Enum { labels: old_labels }, TypeKind::Enum { labels: new_labels }) => {
                    match enum_additions(old_labels, new_labels) {
                        None => true,
                        Some(additions) => {
                            let mut changes: Vec<Change> = additions
                                .into_iter()
                                .map(|(value, position)| {
                                    Change::Type(TypeChange::AddEnumValue {
                                        schema: n.schema.clone(),
                                        name: n.name.clone(),
                                        value,
                                        position,
                                    })
                                })
                                .collect();
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
                            return changes;
                        }
                    }
                }
                (
                    TypeKind::Composite {
                        attributes: old_attrs,
                    },
                    TypeKind::Composite {
                        attributes: new_attrs,
                    },
                ) => old_attrs != new_attrs,
                (TypeKind::Range { .. }, TypeKind::Range { .. }) => o.kind != n.kind,
                // the kind itself changed
                _ => true,
            };

            if replaced {
                replace(ctx, o, n)
            } else {
                altered_object_changes(
                    ctx,
                    &n.id(),
                    &o.owner,
                    &n.owner,
                    o.comment.as_deref(),
                    n.comment.as_deref(),
                    &o.privileges,
                    &n.privileges,
                )
            }
        }
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<EnumLabel> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| EnumLabel {
                name: name.to_string(),
                sort_order: i as f64 + 1.0,
            })
            .collect()
    }

    #[test]
    fn test_insert_before_existing_neighbor() {
        let additions = enum_additions(&labels(&["a", "c"]), &labels(&["a", "b", "c"])).unwrap();
        assert_eq!(
            additions,
            vec![("b".to_string(), EnumValuePosition::Before("c".to_string()))]
        );
    }

    #[test]
    fn test_appends_become_after_chain() {
        let additions =
            enum_additions(&labels(&["a", "b"]), &labels(&["a", "b", "x", "y", "z"])).unwrap();
        assert_eq!(
            additions,
            vec![
                ("x".to_string(), EnumValuePosition::After("b".to_string())),
                ("y".to_string(), EnumValuePosition::After("x".to_string())),
                ("z".to_string(), EnumValuePosition::After("y".to_string())),
            ]
        );
    }

    #[test]
    fn test_prefix_inserts_anchor_on_survivor() {
        let additions = enum_additions(&labels(&["c"]), &labels(&["x", "y", "c"])).unwrap();
        assert_eq!(
            additions,
            vec![
                ("x".to_string(), EnumValuePosition::Before("c".to_string())),
                ("y".to_string(), EnumValuePosition::Before("c".to_string())),
            ]
        );
    }

    #[test]
    fn test_removed_label_forces_replacement() {
        assert!(enum_additions(&labels(&["a", "b"]), &labels(&["a"])).is_none());
    }

    #[test]
    fn test_reorder_forces_replacement() {
        assert!(enum_additions(&labels(&["a", "b"]), &labels(&["b", "a"])).is_none());
    }

    #[test]
    fn test_empty_source_appends_in_order() {
        let additions = enum_additions(&labels(&[]), &labels(&["a", "b"])).unwrap();
        assert_eq!(
            additions,
            vec![
                ("a".to_string(), EnumValuePosition::Last),
                ("b".to_string(), EnumValuePosition::After("a".to_string())),
            ]
        );
    }
}
