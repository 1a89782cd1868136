pub mod config;
pub mod contract;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use contract::{ContractError, MockPoolContract, PoolContract, RpcPoolContract, TickInfo};
pub use db::{init_db, Repository, SqliteStore};
pub use domain::{Decimal, EventContext, Pool, PoolEvent, PoolEventKind, PoolSnapshot, Tick, Token};
pub use engine::PoolEventReducer;
pub use error::IndexerError;
pub use store::{EntityStore, MemoryStore, StoreError};
