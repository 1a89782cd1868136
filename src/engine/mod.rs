//! Pool event processing.
//!
//! [`PoolEventReducer`] applies decoded pool events to the entity store. It is
//! built from smaller parts that each own one concern: tick record lookup,
//! fee-growth resync from the contract, per-block snapshots, and the selection
//! of crossed tick boundaries after a swap.

pub mod fee_sync;
pub mod reducer;
pub mod snapshot;
pub mod sweep;
pub mod ticks;

pub use fee_sync::FeeGrowthSync;
pub use reducer::PoolEventReducer;
pub use snapshot::SnapshotAccumulator;
pub use sweep::{crossed_boundaries, ticks_to_resync, MAX_TICK_CROSSINGS};
pub use ticks::TickRegistry;
