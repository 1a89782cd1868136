//! In-memory entity store for tests and embedding.

use super::{EntityStore, StoreError};
use crate::domain::{GlobalState, Pool, PoolSnapshot, SnapshotKey, Tick, TickKey, Token};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    globals: HashMap<Address, GlobalState>,
    tokens: HashMap<Address, Token>,
    pools: HashMap<Address, Pool>,
    ticks: BTreeMap<TickKey, Tick>,
    snapshots: BTreeMap<SnapshotKey, PoolSnapshot>,
}

/// Map-backed store. Every call locks once and clones rows in and out, so
/// callers never alias stored state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Writes are single inserts, so a poisoned lock still holds whole rows.
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All tick records of one pool, ordered by tick index.
    pub fn ticks_for_pool(&self, pool: &Address) -> Vec<Tick> {
        self.tables()
            .ticks
            .values()
            .filter(|tick| &tick.pool == pool)
            .cloned()
            .collect()
    }

    /// All snapshot rows of one pool, ordered by block.
    pub fn snapshots_for_pool(&self, pool: &Address) -> Vec<PoolSnapshot> {
        self.tables()
            .snapshots
            .values()
            .filter(|snapshot| &snapshot.pool == pool)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_global(&self, factory: &Address) -> Result<Option<GlobalState>, StoreError> {
        Ok(self.tables().globals.get(factory).cloned())
    }

    async fn save_global(&self, global: &GlobalState) -> Result<(), StoreError> {
        self.tables().globals.insert(global.factory, global.clone());
        Ok(())
    }

    async fn load_token(&self, address: &Address) -> Result<Option<Token>, StoreError> {
        Ok(self.tables().tokens.get(address).cloned())
    }

    async fn save_token(&self, token: &Token) -> Result<(), StoreError> {
        self.tables().tokens.insert(token.address, token.clone());
        Ok(())
    }

    async fn load_pool(&self, address: &Address) -> Result<Option<Pool>, StoreError> {
        Ok(self.tables().pools.get(address).cloned())
    }

    async fn save_pool(&self, pool: &Pool) -> Result<(), StoreError> {
        self.tables().pools.insert(pool.address, pool.clone());
        Ok(())
    }

    async fn load_tick(&self, key: &TickKey) -> Result<Option<Tick>, StoreError> {
        Ok(self.tables().ticks.get(key).cloned())
    }

    async fn save_tick(&self, tick: &Tick) -> Result<(), StoreError> {
        self.tables().ticks.insert(tick.key(), tick.clone());
        Ok(())
    }

    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<Option<PoolSnapshot>, StoreError> {
        Ok(self.tables().snapshots.get(key).cloned())
    }

    async fn save_snapshot(&self, snapshot: &PoolSnapshot) -> Result<(), StoreError> {
        self.tables().snapshots.insert(snapshot.key(), snapshot.clone());
        Ok(())
    }
}
