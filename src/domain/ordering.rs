//! Canonical chain ordering for deterministic replay.

use crate::domain::EventContext;

/// Stable ordering key for events.
///
/// Ordering: block_number -> log_index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventOrderingKey {
    /// Block number (primary sort).
    pub block_number: u64,
    /// Log index within the block (secondary sort).
    pub log_index: u32,
}

impl EventOrderingKey {
    pub fn from_context(context: &EventContext) -> Self {
        EventOrderingKey {
            block_number: context.block_number,
            log_index: context.log_index,
        }
    }
}

/// Sort items into canonical chain order.
///
/// The sort is stable, so items sharing a key keep their delivery order.
pub fn sort_events_canonical<T, F>(events: &mut [T], context_of: F)
where
    F: Fn(&T) -> &EventContext,
{
    events.sort_by_key(|event| EventOrderingKey::from_context(context_of(event)));
}
