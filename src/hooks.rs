//! Integration hook surface.
//!
//! Hooks let integrations suppress or rewrite individual changes without
//! knowing model internals. Both callbacks receive the read-only diff context
//! and one change; they must be pure with respect to that change. A filter
//! returning false drops the change before sorting; a serializer returning
//! `Some` overrides the change's own SQL emission.

use crate::change::Change;
use crate::diff::DiffContext;

pub type FilterHook<'a> = dyn Fn(&DiffContext<'_>, &Change) -> bool + 'a;
pub type SerializeHook<'a> = dyn Fn(&DiffContext<'_>, &Change) -> Option<String> + 'a;

#[derive(Default, Clone, Copy)]
pub struct Hooks<'a> {
    pub filter: Option<&'a FilterHook<'a>>,
    pub serialize: Option<&'a SerializeHook<'a>>,
}

impl<'a> Hooks<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: &'a FilterHook<'a>) -> Self {
        Self {
            filter: Some(filter),
            serialize: None,
        }
    }

    pub(crate) fn keeps(&self, ctx: &DiffContext<'_>, change: &Change) -> bool {
        self.filter.map_or(true, |filter| filter(ctx, change))
    }

    pub(crate) fn serialize_override(
        &self,
        ctx: &DiffContext<'_>,
        change: &Change,
    ) -> Option<String> {
        self.serialize.and_then(|serialize| serialize(ctx, change))
    }
}
