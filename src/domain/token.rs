//! ERC-20 token aggregates and the global counter row.

use crate::domain::Decimal;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Per-token running aggregates across every pool that holds the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    /// Decimal exponent; fixed when the token is first registered.
    pub decimals: u8,
    /// Cumulative absolute swap volume, in whole tokens.
    pub volume: Decimal,
    /// Net amount held by pools; only negative on bad upstream data.
    pub total_value_locked: Decimal,
    pub tx_count: u64,
}

impl Token {
    pub fn new(address: Address, symbol: String, name: String, decimals: u8) -> Self {
        Self {
            address,
            symbol,
            name,
            decimals,
            volume: Decimal::zero(),
            total_value_locked: Decimal::zero(),
            tx_count: 0,
        }
    }
}

/// The single global row, keyed by the factory address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    pub factory: Address,
    pub pool_count: u64,
    pub tx_count: u64,
}

impl GlobalState {
    pub fn new(factory: Address) -> Self {
        Self {
            factory,
            pool_count: 0,
            tx_count: 0,
        }
    }
}
