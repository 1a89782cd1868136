use crate::contract::PoolContract;
use crate::domain::{EventContext, Tick, TickKey};
use crate::error::IndexerError;
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::debug;

/// Copies a tick's fee-growth-outside accumulators from the contract.
#[derive(Debug, Clone)]
pub struct FeeGrowthSync {
    store: Arc<dyn EntityStore>,
    contract: Arc<dyn PoolContract>,
}

impl FeeGrowthSync {
    pub fn new(store: Arc<dyn EntityStore>, contract: Arc<dyn PoolContract>) -> Self {
        Self { store, contract }
    }

    /// Overwrite both fee-growth-outside fields with the contract's values at
    /// the event's block and persist the tick.
    pub async fn resync(&self, tick: &mut Tick, ctx: &EventContext) -> Result<(), IndexerError> {
        let info = self
            .contract
            .ticks(&tick.pool, tick.tick_idx, ctx.block_number)
            .await?;
        tick.fee_growth_outside_0_x128 = info.fee_growth_outside_0_x128;
        tick.fee_growth_outside_1_x128 = info.fee_growth_outside_1_x128;
        self.store.save_tick(tick).await?;

        debug!(tick = %tick.key(), block = ctx.block_number, "Resynced tick fee growth");
        Ok(())
    }

    /// Resync the stored record at `key`, if there is one.
    ///
    /// Returns whether a record existed.
    pub async fn resync_existing(
        &self,
        key: &TickKey,
        ctx: &EventContext,
    ) -> Result<bool, IndexerError> {
        match self.store.load_tick(key).await? {
            Some(mut tick) => {
                self.resync(&mut tick, ctx).await?;
                Ok(true)
            }
            None => {
                debug!(tick = %key, "No tick record to resync");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MockPoolContract, TickInfo};
    use crate::store::MemoryStore;
    use alloy_primitives::{Address, U256};

    #[tokio::test]
    async fn test_resync_overwrites_and_persists() {
        let pool = Address::repeat_byte(0x01);
        let store = Arc::new(MemoryStore::new());
        let contract = Arc::new(MockPoolContract::new().with_tick(
            pool,
            60,
            TickInfo::new(U256::from(11u8), U256::from(22u8)),
        ));
        let sync = FeeGrowthSync::new(store.clone(), contract.clone());
        let ctx = EventContext::new(pool, 50, 5_000, 1);

        let mut tick = Tick::new(pool, 60, 0, 0);
        tick.fee_growth_outside_0_x128 = U256::from(999u16);
        sync.resync(&mut tick, &ctx).await.unwrap();

        let stored = store.load_tick(&tick.key()).await.unwrap().unwrap();
        assert_eq!(stored.fee_growth_outside_0_x128, U256::from(11u8));
        assert_eq!(stored.fee_growth_outside_1_x128, U256::from(22u8));
        assert_eq!(contract.queried_blocks(), vec![50]);
    }

    #[tokio::test]
    async fn test_uninitialized_contract_tick_reads_zero() {
        let pool = Address::repeat_byte(0x01);
        let store = Arc::new(MemoryStore::new());
        let sync = FeeGrowthSync::new(store.clone(), Arc::new(MockPoolContract::new()));
        let ctx = EventContext::new(pool, 50, 5_000, 1);

        let mut tick = Tick::new(pool, -200, 0, 0);
        tick.fee_growth_outside_1_x128 = U256::from(5u8);
        sync.resync(&mut tick, &ctx).await.unwrap();
        assert_eq!(tick.fee_growth_outside_1_x128, U256::ZERO);
    }

    #[tokio::test]
    async fn test_resync_existing_skips_missing_record() {
        let pool = Address::repeat_byte(0x01);
        let contract = Arc::new(MockPoolContract::new());
        let sync = FeeGrowthSync::new(Arc::new(MemoryStore::new()), contract.clone());
        let ctx = EventContext::new(pool, 50, 5_000, 1);

        let found = sync
            .resync_existing(&TickKey::new(pool, 120), &ctx)
            .await
            .unwrap();
        assert!(!found);
        assert!(contract.queried_ticks().is_empty());
    }
}
