//! Per-boundary liquidity and fee-growth records.

use crate::domain::primitives::address_key;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key of a tick record: one namespace per pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TickKey {
    pub pool: Address,
    pub tick_idx: i32,
}

impl TickKey {
    pub fn new(pool: Address, tick_idx: i32) -> Self {
        Self { pool, tick_idx }
    }
}

/// Renders as `<pool>#<tick_idx>`, the persisted entity id.
impl fmt::Display for TickKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", address_key(&self.pool), self.tick_idx)
    }
}

/// A price-range boundary referenced by at least one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub pool: Address,
    pub tick_idx: i32,
    /// Total liquidity of positions that use this boundary.
    pub liquidity_gross: u128,
    /// Liquidity added to the active range when price crosses upward.
    pub liquidity_net: i128,
    /// Point-in-time copy of the contract's `feeGrowthOutside0X128`.
    pub fee_growth_outside_0_x128: U256,
    /// Point-in-time copy of the contract's `feeGrowthOutside1X128`.
    pub fee_growth_outside_1_x128: U256,
    pub created_at_timestamp: u64,
    pub created_at_block_number: u64,
}

impl Tick {
    pub fn new(
        pool: Address,
        tick_idx: i32,
        created_at_timestamp: u64,
        created_at_block_number: u64,
    ) -> Self {
        Self {
            pool,
            tick_idx,
            liquidity_gross: 0,
            liquidity_net: 0,
            fee_growth_outside_0_x128: U256::ZERO,
            fee_growth_outside_1_x128: U256::ZERO,
            created_at_timestamp,
            created_at_block_number,
        }
    }

    pub fn key(&self) -> TickKey {
        TickKey::new(self.pool, self.tick_idx)
    }

    /// Record a position being opened against this boundary.
    pub fn add_liquidity(&mut self, amount: u128, boundary: Boundary) {
        let signed = i128::try_from(amount).unwrap_or(i128::MAX);
        self.liquidity_gross = self.liquidity_gross.saturating_add(amount);
        self.liquidity_net = match boundary {
            Boundary::Lower => self.liquidity_net.saturating_add(signed),
            Boundary::Upper => self.liquidity_net.saturating_sub(signed),
        };
    }

    /// Record a position being closed against this boundary.
    ///
    /// Returns false when the removal exceeded the recorded gross liquidity;
    /// gross liquidity is then clamped at zero.
    pub fn remove_liquidity(&mut self, amount: u128, boundary: Boundary) -> bool {
        let signed = i128::try_from(amount).unwrap_or(i128::MAX);
        self.liquidity_net = match boundary {
            Boundary::Lower => self.liquidity_net.saturating_sub(signed),
            Boundary::Upper => self.liquidity_net.saturating_add(signed),
        };
        match self.liquidity_gross.checked_sub(amount) {
            Some(gross) => {
                self.liquidity_gross = gross;
                true
            }
            None => {
                self.liquidity_gross = 0;
                false
            }
        }
    }
}

/// Which end of a position a tick bounds.
///
/// Liquidity turns on when price crosses a lower boundary upward and off when
/// it crosses an upper one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Lower,
    Upper,
}
