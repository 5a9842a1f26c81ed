use crate::catalog::domain::Domain;
use crate::catalog::CatalogEntity;
use crate::change::domain::DomainChange;
use crate::change::Change;
use crate::diff::common::{altered_object_changes, created_object_changes};
use crate::diff::DiffContext;

fn create(ctx: &DiffContext<'_>, n: &Domain) -> Vec<Change> {
    let id = n.id();
    let mut changes = vec![Change::Domain(DomainChange::Create { domain: n.clone() })];
    changes.extend(created_object_changes(
        ctx,
        &id,
        &n.owner,
        n.comment.as_deref(),
        &n.privileges,
    ));
    changes
}

fn drop(o: &Domain) -> Change {
    Change::Domain(DomainChange::Drop {
        schema: o.schema.clone(),
        name: o.name.clone(),
    })
}

pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&Domain>,
    new: Option<&Domain>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => create(ctx, n),
        (Some(o), None) => vec![drop(o)],
        (Some(o), Some(n)) => {
            // The underlying type and collation cannot change in place.
            if o.base_type != n.base_type || o.collation != n.collation {
                let mut changes = vec![drop(o)];
                changes.extend(create(ctx, n));
                return changes;
            }

            let mut changes = Vec::new();
            let schema = n.schema.clone();
            let name = n.name.clone();

            match (&o.default, &n.default) {
                (old_default, Some(default)) if old_default.as_ref() != Some(default) => {
                    changes.push(Change::Domain(DomainChange::SetDefault {
                        schema: schema.clone(),
                        name: name.clone(),
                        default: default.clone(),
                    }));
                }
                (Some(_), None) => changes.push(Change::Domain(DomainChange::DropDefault {
                    schema: schema.clone(),
                    name: name.clone(),
                })),
                _ => {}
            }

            if o.not_null != n.not_null {
                changes.push(Change::Domain(if n.not_null {
                    DomainChange::SetNotNull {
                        schema: schema.clone(),
                        name: name.clone(),
                    }
                } else {
                    DomainChange::DropNotNull {
                        schema: schema.clone(),
                        name: name.clone(),
                    }
                }));
            }

            for old_constraint in &o.constraints {
                match n.constraints.iter().find(|c| c.name == old_constraint.name) {
                    None => changes.push(Change::Domain(DomainChange::DropConstraint {
                        schema: schema.clone(),
                        name: name.clone(),
                        constraint: old_constraint.name.clone(),
                    })),
                    Some(new_constraint) => {
                        if new_constraint.definition != old_constraint.definition {
                            changes.push(Change::Domain(DomainChange::DropConstraint {
                                schema: schema.clone(),
                                name: name.clone(),
                                constraint: old_constraint.name.clone(),
                            }));
                            changes.push(Change::Domain(DomainChange::AddConstraint {
                                schema: schema.clone(),
                                name: name.clone(),
                                constraint: new_constraint.clone(),
                            }));
                        } else if !old_constraint.validated && new_constraint.validated {
                            changes.push(Change::Domain(DomainChange::ValidateConstraint {
                                schema: schema.clone(),
                                name: name.clone(),
                                constraint: new_constraint.name.clone(),
                            }));
                        }
                    }
                }
            }
            for new_constraint in &n.constraints {
                if !o.constraints.iter().any(|c| c.name == new_constraint.name) {
                    changes.push(Change::Domain(DomainChange::AddConstraint {
                        schema: schema.clone(),
                        name: name.clone(),
                        constraint: new_constraint.clone(),
                    }));
                }
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
