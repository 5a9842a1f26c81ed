use crate::catalog::sequence::Sequence;
use crate::catalog::CatalogEntity;
use crate::change::sequence::{SequenceChange, SequenceFacet};
use crate::change::Change;
use crate::diff::common::{altered_object_changes, created_object_changes};
use crate::diff::DiffContext;

pub(crate) fn diff(
    ctx: &DiffContext<'_>,
    old: Option<&Sequence>,
    new: Option<&Sequence>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let id = n.id();
            let mut changes = vec![Change::Sequence(SequenceChange::Create {
                sequence: n.clone(),
            })];
            if n.owned_by.is_some() {
                changes.push(Change::Sequence(SequenceChange::SetOwnedBy {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    owned_by: n.owned_by.clone(),
                }));
            }
            changes.extend(created_object_changes(
                ctx,
                &id,
                &n.owner,
                n.comment.as_deref(),
                &n.privileges,
            ));
            changes
        }
        (Some(o), None) => vec![Change::Sequence(SequenceChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) => {
            let mut facets = Vec::new();
            if o.data_type != n.data_type {
                facets.push(SequenceFacet::AsType(n.data_type.clone()));
            }
            if o.increment != n.increment {
                facets.push(SequenceFacet::Increment(n.increment));
            }
            if o.min_value != n.min_value {
                facets.push(SequenceFacet::MinValue(n.min_value));
            }
            if o.max_value != n.max_value {
                facets.push(SequenceFacet::MaxValue(n.max_value));
            }
            if o.start_value != n.start_value {
                facets.push(SequenceFacet::Start(n.start_value));
            }
            if o.cache != n.cache {
                facets.push(SequenceFacet::Cache(n.cache));
            }
            if o.cycle != n.cycle {
                facets.push(SequenceFacet::Cycle(n.cycle));
            }

            let mut changes = Vec::new();
            if !facets.is_empty() {
                changes.push(Change::Sequence(SequenceChange::Alter {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    facets,
                }));
            }
            if o.owned_by != n.owned_by {
                changes.push(Change::Sequence(SequenceChange::SetOwnedBy {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    owned_by: n.owned_by.clone(),
                }));
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
