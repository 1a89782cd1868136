//! Pool aggregates, fee-tier geometry and sqrt-price conversion.

use crate::domain::decimal::{pow10, ratio_to_decimal, safe_div};
use crate::domain::Decimal;
use alloy_primitives::aliases::U512;
use alloy_primitives::{Address, U160, U256};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Mutable source-of-truth state of one pool contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    /// Swap fee in hundredths of a basis point (3000 = 0.3%).
    pub fee_tier: u32,
    pub created_at_timestamp: u64,
    pub created_at_block_number: u64,
    /// Current `sqrt(price) * 2^96`.
    pub sqrt_price: U160,
    /// Price of token0 in units of token1.
    pub token0_price: Decimal,
    /// Price of token1 in units of token0.
    pub token1_price: Decimal,
    /// Active tick; `None` until the pool is initialized.
    pub tick: Option<i32>,
    /// Liquidity currently in range.
    pub liquidity: u128,
    pub total_value_locked_token0: Decimal,
    pub total_value_locked_token1: Decimal,
    pub volume_token0: Decimal,
    pub volume_token1: Decimal,
    pub tx_count: u64,
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
}

impl Pool {
    pub fn new(
        address: Address,
        token0: Address,
        token1: Address,
        fee_tier: u32,
        created_at_timestamp: u64,
        created_at_block_number: u64,
    ) -> Self {
        Self {
            address,
            token0,
            token1,
            fee_tier,
            created_at_timestamp,
            created_at_block_number,
            sqrt_price: U160::ZERO,
            token0_price: Decimal::zero(),
            token1_price: Decimal::zero(),
            tick: None,
            liquidity: 0,
            total_value_locked_token0: Decimal::zero(),
            total_value_locked_token1: Decimal::zero(),
            volume_token0: Decimal::zero(),
            volume_token1: Decimal::zero(),
            tx_count: 0,
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
        }
    }

    /// Boundary granularity implied by the fee tier.
    pub fn tick_spacing(&self) -> Option<i32> {
        tick_spacing_for_fee_tier(self.fee_tier)
    }

    /// Whether a position over `[tick_lower, tick_upper)` contains the active tick.
    ///
    /// Always false before initialization.
    pub fn is_in_range(&self, tick_lower: i32, tick_upper: i32) -> bool {
        match self.tick {
            Some(tick) => tick_lower <= tick && tick < tick_upper,
            None => false,
        }
    }
}

/// Map a fee tier to its tick spacing, `None` for tiers the factory never enabled.
pub fn tick_spacing_for_fee_tier(fee_tier: u32) -> Option<i32> {
    match fee_tier {
        100 => Some(1),
        500 => Some(10),
        3000 => Some(60),
        10000 => Some(200),
        _ => None,
    }
}

/// Derive `(token0_price, token1_price)` from a Q64.96 sqrt price.
///
/// `token1_price = sqrt_price^2 / 2^192 * 10^decimals0 / 10^decimals1`, and
/// `token0_price` is its inverse (zero when the pool has no price yet). A
/// ratio too large for a decimal is reported and priced as zero.
pub fn sqrt_price_x96_to_token_prices(
    sqrt_price: U160,
    decimals0: u8,
    decimals1: u8,
) -> (Decimal, Decimal) {
    let sqrt_price = U512::from(sqrt_price);
    let numerator = (sqrt_price * sqrt_price).checked_mul(pow10(u32::from(decimals0)));
    let denominator = (U512::from(1u8) << 192usize).checked_mul(pow10(u32::from(decimals1)));

    let price1 = match (numerator, denominator) {
        (Some(numerator), Some(denominator)) => ratio_to_decimal(numerator, denominator),
        _ => Err(crate::domain::DecimalError::Overflow),
    };

    match price1 {
        Ok(price1) => (safe_div(Decimal::one(), price1), price1),
        Err(e) => {
            warn!(
                decimals0,
                decimals1,
                error = %e,
                "sqrt price does not convert to a decimal price, using zero"
            );
            (Decimal::zero(), Decimal::zero())
        }
    }
}
