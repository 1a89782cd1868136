//! Decoded pool contract events.

use crate::domain::EventContext;
use alloy_primitives::{Address, I256, U160, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Initialize(uint160 sqrtPriceX96, int24 tick)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    pub sqrt_price_x96: U160,
    pub tick: i32,
}

/// Shared payload of `Mint` and `Burn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityParams {
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Position liquidity added or removed.
    pub amount: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// `Swap(..., int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    /// Signed pool-side delta: positive flows into the pool.
    pub amount0: I256,
    pub amount1: I256,
    pub sqrt_price_x96: U160,
    pub liquidity: u128,
    pub tick: i32,
}

/// `Flash(address sender, address recipient, uint256 amount0, uint256 amount1, uint256 paid0, uint256 paid1)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlashParams {
    #[serde(default)]
    pub recipient: Address,
    #[serde(default)]
    pub amount0: U256,
    #[serde(default)]
    pub amount1: U256,
    #[serde(default)]
    pub paid0: U256,
    #[serde(default)]
    pub paid1: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolEventKind {
    Initialize(InitializeParams),
    Mint(LiquidityParams),
    Burn(LiquidityParams),
    Swap(SwapParams),
    Flash(FlashParams),
}

impl PoolEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            PoolEventKind::Initialize(_) => "initialize",
            PoolEventKind::Mint(_) => "mint",
            PoolEventKind::Burn(_) => "burn",
            PoolEventKind::Swap(_) => "swap",
            PoolEventKind::Flash(_) => "flash",
        }
    }
}

/// One event emitted by a pool contract, with its block context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEvent {
    pub context: EventContext,
    pub kind: PoolEventKind,
}

impl PoolEvent {
    pub fn new(context: EventContext, kind: PoolEventKind) -> Self {
        Self { context, kind }
    }
}

impl fmt::Display for PoolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(pool={}, block={}, log={})",
            self.kind.name(),
            self.context.address,
            self.context.block_number,
            self.context.log_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_event_json_shape() {
        let json = serde_json::json!({
            "context": {
                "address": "0x8ad599c3a0ff1de082011efddc58f1908eb6e6d8",
                "block_number": 12376729,
                "block_timestamp": 1620250931,
                "log_index": 3
            },
            "kind": {
                "swap": {
                    "amount0": "-1000000",
                    "amount1": "500000000000000",
                    "sqrt_price_x96": "1350174849792634181862360983626536",
                    "liquidity": 1000,
                    "tick": 195285
                }
            }
        });

        let event: PoolEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.context.block_number, 12376729);
        assert_eq!(event.context.log_index, 3);
        match event.kind {
            PoolEventKind::Swap(swap) => {
                assert!(swap.amount0.is_negative());
                assert_eq!(swap.tick, 195285);
                assert_eq!(swap.liquidity, 1000);
            }
            other => panic!("expected swap, got {}", other.name()),
        }
    }

    #[test]
    fn test_flash_defaults() {
        let json = serde_json::json!({
            "context": {
                "address": "0x8ad599c3a0ff1de082011efddc58f1908eb6e6d8",
                "block_number": 1,
                "block_timestamp": 2
            },
            "kind": { "flash": {} }
        });
        let event: PoolEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.kind, PoolEventKind::Flash(FlashParams::default()));
        assert_eq!(event.context.log_index, 0);
    }
}
