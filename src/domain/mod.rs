//! Domain types for the pool state indexer.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper and raw-amount scaling
//! - Entities: GlobalState, Token, Pool, Tick, PoolSnapshot
//! - Decoded pool events and their block context
//! - Canonical event ordering for deterministic replay

pub mod decimal;
pub mod event;
pub mod ordering;
pub mod pool;
pub mod primitives;
pub mod snapshot;
pub mod static_tokens;
pub mod tick;
pub mod token;

pub use decimal::{
    exponent_to_decimal, power_of, safe_div, to_decimal, unsigned_to_decimal, Decimal,
    DecimalError,
};
pub use event::{
    FlashParams, InitializeParams, LiquidityParams, PoolEvent, PoolEventKind, SwapParams,
};
pub use ordering::{sort_events_canonical, EventOrderingKey};
pub use pool::{sqrt_price_x96_to_token_prices, tick_spacing_for_fee_tier, Pool};
pub use primitives::{address_key, is_null_eth_value, parse_address, EventContext};
pub use snapshot::{PoolSnapshot, SnapshotKey};
pub use static_tokens::StaticTokenDefinition;
pub use tick::{Boundary, Tick, TickKey};
pub use token::{GlobalState, Token};
