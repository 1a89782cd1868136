//! SQLite persistence for indexed entities.
//!
//! This module provides:
//! - Database initialization and schema migration
//! - SQLite pragma configuration
//! - [`Repository`], the SQLite implementation of the entity store

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;

/// The SQLite entity store under its role name.
pub type SqliteStore = Repository;
