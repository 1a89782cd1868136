//! Mock pool contract for testing without network calls.

use super::{ContractError, PoolContract, TickInfo};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock contract that answers from predefined state and records every query.
///
/// Unknown pools report zero fee growth and unknown ticks report
/// [`TickInfo::default`], matching an uninitialized on-chain record.
#[derive(Debug, Default)]
pub struct MockPoolContract {
    fee_growth: HashMap<Address, (U256, U256)>,
    ticks: HashMap<(Address, i32), TickInfo>,
    failing: bool,
    tick_queries: Mutex<Vec<(Address, i32, u64)>>,
    fee_growth_queries: Mutex<Vec<(Address, u64)>>,
}

impl MockPoolContract {
    /// Create a new mock contract with no state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global fee growth reported for a pool.
    pub fn with_fee_growth(mut self, pool: Address, global0: U256, global1: U256) -> Self {
        self.fee_growth.insert(pool, (global0, global1));
        self
    }

    /// Set the record reported for one tick.
    pub fn with_tick(mut self, pool: Address, tick_idx: i32, info: TickInfo) -> Self {
        self.ticks.insert((pool, tick_idx), info);
        self
    }

    /// Make every query fail with a network error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Tick indices queried so far, in call order.
    pub fn queried_ticks(&self) -> Vec<i32> {
        self.tick_queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, tick_idx, _)| *tick_idx)
            .collect()
    }

    /// Number of global fee-growth queries so far.
    pub fn fee_growth_query_count(&self) -> usize {
        self.fee_growth_queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Block numbers of every query so far, fee-growth queries first.
    pub fn queried_blocks(&self) -> Vec<u64> {
        let fee = self
            .fee_growth_queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, block)| *block)
            .collect::<Vec<_>>();
        let ticks = self
            .tick_queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, _, block)| *block)
            .collect::<Vec<_>>();
        fee.into_iter().chain(ticks).collect()
    }

    fn check_available(&self) -> Result<(), ContractError> {
        if self.failing {
            return Err(ContractError::NetworkError("mock contract offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PoolContract for MockPoolContract {
    async fn fee_growth_globals(
        &self,
        pool: &Address,
        block_number: u64,
    ) -> Result<(U256, U256), ContractError> {
        self.fee_growth_queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((*pool, block_number));
        self.check_available()?;
        Ok(self
            .fee_growth
            .get(pool)
            .copied()
            .unwrap_or((U256::ZERO, U256::ZERO)))
    }

    async fn ticks(
        &self,
        pool: &Address,
        tick_idx: i32,
        block_number: u64,
    ) -> Result<TickInfo, ContractError> {
        self.tick_queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((*pool, tick_idx, block_number));
        self.check_available()?;
        Ok(self
            .ticks
            .get(&(*pool, tick_idx))
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_answers_configured_state() {
        let pool = Address::repeat_byte(0x01);
        let info = TickInfo::new(U256::from(5u8), U256::from(6u8));
        let contract = MockPoolContract::new()
            .with_fee_growth(pool, U256::from(1u8), U256::from(2u8))
            .with_tick(pool, 60, info);

        assert_eq!(
            contract.fee_growth_globals(&pool, 10).await.unwrap(),
            (U256::from(1u8), U256::from(2u8))
        );
        assert_eq!(contract.ticks(&pool, 60, 10).await.unwrap(), info);
        assert_eq!(
            contract.ticks(&pool, 120, 10).await.unwrap(),
            TickInfo::default()
        );
    }

    #[tokio::test]
    async fn test_mock_records_queries() {
        let pool = Address::repeat_byte(0x01);
        let contract = MockPoolContract::new();

        contract.ticks(&pool, -60, 7).await.unwrap();
        contract.ticks(&pool, 60, 8).await.unwrap();
        contract.fee_growth_globals(&pool, 9).await.unwrap();

        assert_eq!(contract.queried_ticks(), vec![-60, 60]);
        assert_eq!(contract.fee_growth_query_count(), 1);
        assert_eq!(contract.queried_blocks(), vec![9, 7, 8]);
    }

    #[tokio::test]
    async fn test_failing_mock_still_records() {
        let pool = Address::repeat_byte(0x01);
        let contract = MockPoolContract::new().failing();

        assert!(contract.ticks(&pool, 0, 1).await.is_err());
        assert_eq!(contract.queried_ticks(), vec![0]);
    }
}
