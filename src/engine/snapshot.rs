use crate::domain::{Decimal, EventContext, Pool, PoolSnapshot, SnapshotKey};
use crate::store::{EntityStore, StoreError};
use std::sync::Arc;

/// Maintains one snapshot row per `(pool, block)`.
///
/// Gauges reflect the pool after the latest event of the block; `tx_count`
/// and the volume totals accumulate over all events of the block.
#[derive(Debug, Clone)]
pub struct SnapshotAccumulator {
    store: Arc<dyn EntityStore>,
}

impl SnapshotAccumulator {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Record one event against the pool's block snapshot.
    ///
    /// `pool` must already carry the event's effects.
    pub async fn touch(&self, ctx: &EventContext, pool: &Pool) -> Result<PoolSnapshot, StoreError> {
        self.touch_with_volume(ctx, pool, Decimal::zero(), Decimal::zero())
            .await
    }

    /// Like [`touch`](Self::touch), also adding traded amounts to the
    /// period volume.
    pub async fn touch_with_volume(
        &self,
        ctx: &EventContext,
        pool: &Pool,
        volume0: Decimal,
        volume1: Decimal,
    ) -> Result<PoolSnapshot, StoreError> {
        let key = SnapshotKey::new(pool.address, ctx.block_number);
        let mut snapshot = match self.store.load_snapshot(&key).await? {
            Some(snapshot) => snapshot,
            None => PoolSnapshot::new(pool.address, ctx.block_number, ctx.block_timestamp),
        };

        snapshot.copy_gauges(pool);
        snapshot.tx_count += 1;
        snapshot.volume_token0 += volume0;
        snapshot.volume_token1 += volume1;

        self.store.save_snapshot(&snapshot).await?;
        Ok(snapshot)
    }
}
