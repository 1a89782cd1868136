//! Drivers around the reducer: pool registration and event log replay.

pub mod bootstrap;
pub mod replay;

pub use bootstrap::{resolve_token, PoolCreated, PoolRegistrar, Registration, TokenMetadata};
pub use replay::{load_events, parse_events, IndexedEvent, ReplayError, ReplaySummary, Replayer};
