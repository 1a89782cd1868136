//! Entity store abstraction.
//!
//! The reducer reads and writes every entity through [`EntityStore`]. Saves are
//! idempotent upserts and must be visible to the next load, including loads
//! made while the same event is still being processed.

use crate::domain::{GlobalState, Pool, PoolSnapshot, SnapshotKey, Tick, TickKey, Token};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

#[async_trait]
pub trait EntityStore: Send + Sync + fmt::Debug {
    async fn load_global(&self, factory: &Address) -> Result<Option<GlobalState>, StoreError>;
    async fn save_global(&self, global: &GlobalState) -> Result<(), StoreError>;

    async fn load_token(&self, address: &Address) -> Result<Option<Token>, StoreError>;
    async fn save_token(&self, token: &Token) -> Result<(), StoreError>;

    async fn load_pool(&self, address: &Address) -> Result<Option<Pool>, StoreError>;
    async fn save_pool(&self, pool: &Pool) -> Result<(), StoreError>;

    async fn load_tick(&self, key: &TickKey) -> Result<Option<Tick>, StoreError>;
    async fn save_tick(&self, tick: &Tick) -> Result<(), StoreError>;

    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<Option<PoolSnapshot>, StoreError>;
    async fn save_snapshot(&self, snapshot: &PoolSnapshot) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("corrupt {entity} row {key}: {reason}")]
    Corrupt {
        entity: &'static str,
        key: String,
        reason: String,
    },
}
