//! Per-block pool snapshot rows.

use crate::domain::primitives::address_key;
use crate::domain::{Decimal, Pool};
use alloy_primitives::{Address, U160, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// At most one snapshot exists per (pool, block).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub pool: Address,
    pub block_number: u64,
}

impl SnapshotKey {
    pub fn new(pool: Address, block_number: u64) -> Self {
        Self { pool, block_number }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", address_key(&self.pool), self.block_number)
    }
}

/// Pool gauges as of the last event in a block, plus that block's period totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool: Address,
    pub block_number: u64,
    pub timestamp: u64,
    pub liquidity: u128,
    pub sqrt_price: U160,
    pub token0_price: Decimal,
    pub token1_price: Decimal,
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub tick: Option<i32>,
    /// Swap volume inside this block only.
    pub volume_token0: Decimal,
    pub volume_token1: Decimal,
    /// Events applied inside this block only.
    pub tx_count: u64,
}

impl PoolSnapshot {
    /// Empty period row for a block; gauges are filled by [`Self::copy_gauges`].
    pub fn new(pool: Address, block_number: u64, timestamp: u64) -> Self {
        Self {
            pool,
            block_number,
            timestamp,
            liquidity: 0,
            sqrt_price: U160::ZERO,
            token0_price: Decimal::zero(),
            token1_price: Decimal::zero(),
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
            tick: None,
            volume_token0: Decimal::zero(),
            volume_token1: Decimal::zero(),
            tx_count: 0,
        }
    }

    pub fn key(&self) -> SnapshotKey {
        SnapshotKey::new(self.pool, self.block_number)
    }

    /// Overwrite the absolute gauges with the pool's current values.
    pub fn copy_gauges(&mut self, pool: &Pool) {
        self.liquidity = pool.liquidity;
        self.sqrt_price = pool.sqrt_price;
        self.token0_price = pool.token0_price;
        self.token1_price = pool.token1_price;
        self.fee_growth_global_0_x128 = pool.fee_growth_global_0_x128;
        self.fee_growth_global_1_x128 = pool.fee_growth_global_1_x128;
        self.tick = pool.tick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_key_display() {
        let key = SnapshotKey::new(Address::repeat_byte(0xff), 12_345_678);
        assert_eq!(
            key.to_string(),
            "0xffffffffffffffffffffffffffffffffffffffff#12345678"
        );
    }

    #[test]
    fn test_copy_gauges_leaves_period_totals() {
        let mut pool = Pool::new(Address::ZERO, Address::ZERO, Address::ZERO, 500, 0, 0);
        pool.liquidity = 42;
        pool.tick = Some(-10);
        pool.fee_growth_global_0_x128 = U256::from(7u8);

        let mut snapshot = PoolSnapshot::new(Address::ZERO, 10, 1000);
        snapshot.tx_count = 3;
        snapshot.volume_token0 = Decimal::one();
        snapshot.copy_gauges(&pool);

        assert_eq!(snapshot.liquidity, 42);
        assert_eq!(snapshot.tick, Some(-10));
        assert_eq!(snapshot.fee_growth_global_0_x128, U256::from(7u8));
        assert_eq!(snapshot.tx_count, 3);
        assert_eq!(snapshot.volume_token0, Decimal::one());
    }
}
