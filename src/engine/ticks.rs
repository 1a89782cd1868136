use crate::domain::{EventContext, Tick, TickKey};
use crate::store::{EntityStore, StoreError};
use alloy_primitives::Address;
use std::sync::Arc;

/// Lookup and lazy creation of tick records keyed by `(pool, tick_idx)`.
#[derive(Debug, Clone)]
pub struct TickRegistry {
    store: Arc<dyn EntityStore>,
}

impl TickRegistry {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, pool: &Address, tick_idx: i32) -> Result<Option<Tick>, StoreError> {
        self.store.load_tick(&TickKey::new(*pool, tick_idx)).await
    }

    /// A fresh record stamped with the creating event's block. Not persisted.
    pub fn create(pool: &Address, tick_idx: i32, ctx: &EventContext) -> Tick {
        Tick::new(*pool, tick_idx, ctx.block_timestamp, ctx.block_number)
    }

    pub async fn load_or_create(
        &self,
        pool: &Address,
        tick_idx: i32,
        ctx: &EventContext,
    ) -> Result<Tick, StoreError> {
        match self.get(pool, tick_idx).await? {
            Some(tick) => Ok(tick),
            None => Ok(Self::create(pool, tick_idx, ctx)),
        }
    }
}
