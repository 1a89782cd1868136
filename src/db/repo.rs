//! SQLite-backed entity store.
//!
//! Every entity is keyed by its textual id and written with an idempotent
//! upsert. Chain integers and decimals are stored as canonical strings so no
//! precision is lost to SQLite's 64-bit integer affinity.

use crate::domain::{
    address_key, parse_address, GlobalState, Pool, PoolSnapshot, SnapshotKey, Tick, TickKey,
    Token,
};
use crate::store::{EntityStore, StoreError};
use alloy_primitives::Address;
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::fmt::Display;
use std::str::FromStr;

/// Repository for entity rows.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Number of tick rows stored for a pool.
    pub async fn count_ticks(&self, pool: &Address) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM ticks WHERE pool = ?")
            .bind(address_key(pool))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Number of snapshot rows stored for a pool.
    pub async fn count_snapshots(&self, pool: &Address) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM pool_snapshots WHERE pool = ?")
            .bind(address_key(pool))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

/// Decodes one column of one row, naming the row on failure.
struct RowReader<'a> {
    row: &'a SqliteRow,
    entity: &'static str,
    key: &'a str,
}

impl<'a> RowReader<'a> {
    fn new(row: &'a SqliteRow, entity: &'static str, key: &'a str) -> Self {
        RowReader { row, entity, key }
    }

    fn corrupt(&self, column: &str, reason: impl Display) -> StoreError {
        StoreError::Corrupt {
            entity: self.entity,
            key: self.key.to_string(),
            reason: format!("{}: {}", column, reason),
        }
    }

    fn parsed<T>(&self, column: &str) -> Result<T, StoreError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw: String = self.row.try_get(column)?;
        raw.parse().map_err(|e| self.corrupt(column, e))
    }

    fn address(&self, column: &str) -> Result<Address, StoreError> {
        let raw: String = self.row.try_get(column)?;
        parse_address(&raw).ok_or_else(|| self.corrupt(column, format!("bad address {}", raw)))
    }

    fn unsigned(&self, column: &str) -> Result<u64, StoreError> {
        let raw: i64 = self.row.try_get(column)?;
        u64::try_from(raw).map_err(|e| self.corrupt(column, e))
    }

    fn tick(&self, column: &str) -> Result<Option<i32>, StoreError> {
        let raw: Option<i64> = self.row.try_get(column)?;
        raw.map(|v| i32::try_from(v).map_err(|e| self.corrupt(column, e)))
            .transpose()
    }
}

#[async_trait]
impl EntityStore for Repository {
    async fn load_global(&self, factory: &Address) -> Result<Option<GlobalState>, StoreError> {
        let key = address_key(factory);
        let row = sqlx::query("SELECT pool_count, tx_count FROM global_state WHERE id = ?")
            .bind(&key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<GlobalState, StoreError> {
            let r = RowReader::new(&row, "global_state", &key);
            Ok(GlobalState {
                factory: *factory,
                pool_count: r.unsigned("pool_count")?,
                tx_count: r.unsigned("tx_count")?,
            })
        })
        .transpose()
    }

    async fn save_global(&self, global: &GlobalState) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO global_state (id, pool_count, tx_count)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                pool_count = excluded.pool_count,
                tx_count = excluded.tx_count
            "#,
        )
        .bind(address_key(&global.factory))
        .bind(global.pool_count as i64)
        .bind(global.tx_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_token(&self, address: &Address) -> Result<Option<Token>, StoreError> {
        let key = address_key(address);
        let row = sqlx::query(
            "SELECT symbol, name, decimals, volume, total_value_locked, tx_count FROM tokens WHERE id = ?",
        )
        .bind(&key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<Token, StoreError> {
            let r = RowReader::new(&row, "token", &key);
            let decimals: i64 = row.try_get("decimals")?;
            Ok(Token {
                address: *address,
                symbol: row.try_get("symbol")?,
                name: row.try_get("name")?,
                decimals: u8::try_from(decimals).map_err(|e| r.corrupt("decimals", e))?,
                volume: r.parsed("volume")?,
                total_value_locked: r.parsed("total_value_locked")?,
                tx_count: r.unsigned("tx_count")?,
            })
        })
        .transpose()
    }

    async fn save_token(&self, token: &Token) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (id, symbol, name, decimals, volume, total_value_locked, tx_count)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                symbol = excluded.symbol,
                name = excluded.name,
                decimals = excluded.decimals,
                volume = excluded.volume,
                total_value_locked = excluded.total_value_locked,
                tx_count = excluded.tx_count
            "#,
        )
        .bind(address_key(&token.address))
        .bind(&token.symbol)
        .bind(&token.name)
        .bind(i64::from(token.decimals))
        .bind(token.volume.to_canonical_string())
        .bind(token.total_value_locked.to_canonical_string())
        .bind(token.tx_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_pool(&self, address: &Address) -> Result<Option<Pool>, StoreError> {
        let key = address_key(address);
        let row = sqlx::query("SELECT * FROM pools WHERE id = ?")
            .bind(&key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<Pool, StoreError> {
            let r = RowReader::new(&row, "pool", &key);
            let fee_tier: i64 = row.try_get("fee_tier")?;
            Ok(Pool {
                address: *address,
                token0: r.address("token0")?,
                token1: r.address("token1")?,
                fee_tier: u32::try_from(fee_tier).map_err(|e| r.corrupt("fee_tier", e))?,
                created_at_timestamp: r.unsigned("created_at_timestamp")?,
                created_at_block_number: r.unsigned("created_at_block_number")?,
                sqrt_price: r.parsed("sqrt_price")?,
                token0_price: r.parsed("token0_price")?,
                token1_price: r.parsed("token1_price")?,
                tick: r.tick("tick")?,
                liquidity: r.parsed("liquidity")?,
                total_value_locked_token0: r.parsed("total_value_locked_token0")?,
                total_value_locked_token1: r.parsed("total_value_locked_token1")?,
                volume_token0: r.parsed("volume_token0")?,
                volume_token1: r.parsed("volume_token1")?,
                tx_count: r.unsigned("tx_count")?,
                fee_growth_global_0_x128: r.parsed("fee_growth_global_0_x128")?,
                fee_growth_global_1_x128: r.parsed("fee_growth_global_1_x128")?,
            })
        })
        .transpose()
    }

    async fn save_pool(&self, pool: &Pool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pools (
                id, token0, token1, fee_tier, created_at_timestamp, created_at_block_number,
                sqrt_price, token0_price, token1_price, tick, liquidity,
                total_value_locked_token0, total_value_locked_token1,
                volume_token0, volume_token1, tx_count,
                fee_growth_global_0_x128, fee_growth_global_1_x128
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                sqrt_price = excluded.sqrt_price,
                token0_price = excluded.token0_price,
                token1_price = excluded.token1_price,
                tick = excluded.tick,
                liquidity = excluded.liquidity,
                total_value_locked_token0 = excluded.total_value_locked_token0,
                total_value_locked_token1 = excluded.total_value_locked_token1,
                volume_token0 = excluded.volume_token0,
                volume_token1 = excluded.volume_token1,
                tx_count = excluded.tx_count,
                fee_growth_global_0_x128 = excluded.fee_growth_global_0_x128,
                fee_growth_global_1_x128 = excluded.fee_growth_global_1_x128
            "#,
        )
        .bind(address_key(&pool.address))
        .bind(address_key(&pool.token0))
        .bind(address_key(&pool.token1))
        .bind(i64::from(pool.fee_tier))
        .bind(pool.created_at_timestamp as i64)
        .bind(pool.created_at_block_number as i64)
        .bind(pool.sqrt_price.to_string())
        .bind(pool.token0_price.to_canonical_string())
        .bind(pool.token1_price.to_canonical_string())
        .bind(pool.tick.map(i64::from))
        .bind(pool.liquidity.to_string())
        .bind(pool.total_value_locked_token0.to_canonical_string())
        .bind(pool.total_value_locked_token1.to_canonical_string())
        .bind(pool.volume_token0.to_canonical_string())
        .bind(pool.volume_token1.to_canonical_string())
        .bind(pool.tx_count as i64)
        .bind(pool.fee_growth_global_0_x128.to_string())
        .bind(pool.fee_growth_global_1_x128.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_tick(&self, key: &TickKey) -> Result<Option<Tick>, StoreError> {
        let id = key.to_string();
        let row = sqlx::query(
            r#"
            SELECT liquidity_gross, liquidity_net,
                   fee_growth_outside_0_x128, fee_growth_outside_1_x128,
                   created_at_timestamp, created_at_block_number
            FROM ticks WHERE id = ?
            "#,
        )
        .bind(&id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<Tick, StoreError> {
            let r = RowReader::new(&row, "tick", &id);
            Ok(Tick {
                pool: key.pool,
                tick_idx: key.tick_idx,
                liquidity_gross: r.parsed("liquidity_gross")?,
                liquidity_net: r.parsed("liquidity_net")?,
                fee_growth_outside_0_x128: r.parsed("fee_growth_outside_0_x128")?,
                fee_growth_outside_1_x128: r.parsed("fee_growth_outside_1_x128")?,
                created_at_timestamp: r.unsigned("created_at_timestamp")?,
                created_at_block_number: r.unsigned("created_at_block_number")?,
            })
        })
        .transpose()
    }

    async fn save_tick(&self, tick: &Tick) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ticks (
                id, pool, tick_idx, liquidity_gross, liquidity_net,
                fee_growth_outside_0_x128, fee_growth_outside_1_x128,
                created_at_timestamp, created_at_block_number
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                liquidity_gross = excluded.liquidity_gross,
                liquidity_net = excluded.liquidity_net,
                fee_growth_outside_0_x128 = excluded.fee_growth_outside_0_x128,
                fee_growth_outside_1_x128 = excluded.fee_growth_outside_1_x128
            "#,
        )
        .bind(tick.key().to_string())
        .bind(address_key(&tick.pool))
        .bind(i64::from(tick.tick_idx))
        .bind(tick.liquidity_gross.to_string())
        .bind(tick.liquidity_net.to_string())
        .bind(tick.fee_growth_outside_0_x128.to_string())
        .bind(tick.fee_growth_outside_1_x128.to_string())
        .bind(tick.created_at_timestamp as i64)
        .bind(tick.created_at_block_number as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<Option<PoolSnapshot>, StoreError> {
        let id = key.to_string();
        let row = sqlx::query("SELECT * FROM pool_snapshots WHERE id = ?")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<PoolSnapshot, StoreError> {
            let r = RowReader::new(&row, "pool_snapshot", &id);
            Ok(PoolSnapshot {
                pool: key.pool,
                block_number: key.block_number,
                timestamp: r.unsigned("timestamp")?,
                liquidity: r.parsed("liquidity")?,
                sqrt_price: r.parsed("sqrt_price")?,
                token0_price: r.parsed("token0_price")?,
                token1_price: r.parsed("token1_price")?,
                fee_growth_global_0_x128: r.parsed("fee_growth_global_0_x128")?,
                fee_growth_global_1_x128: r.parsed("fee_growth_global_1_x128")?,
                tick: r.tick("tick")?,
                volume_token0: r.parsed("volume_token0")?,
                volume_token1: r.parsed("volume_token1")?,
                tx_count: r.unsigned("tx_count")?,
            })
        })
        .transpose()
    }

    async fn save_snapshot(&self, snapshot: &PoolSnapshot) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pool_snapshots (
                id, pool, block_number, timestamp, liquidity, sqrt_price,
                token0_price, token1_price,
                fee_growth_global_0_x128, fee_growth_global_1_x128,
                tick, volume_token0, volume_token1, tx_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                liquidity = excluded.liquidity,
                sqrt_price = excluded.sqrt_price,
                token0_price = excluded.token0_price,
                token1_price = excluded.token1_price,
                fee_growth_global_0_x128 = excluded.fee_growth_global_0_x128,
                fee_growth_global_1_x128 = excluded.fee_growth_global_1_x128,
                tick = excluded.tick,
                volume_token0 = excluded.volume_token0,
                volume_token1 = excluded.volume_token1,
                tx_count = excluded.tx_count
            "#,
        )
        .bind(snapshot.key().to_string())
        .bind(address_key(&snapshot.pool))
        .bind(snapshot.block_number as i64)
        .bind(snapshot.timestamp as i64)
        .bind(snapshot.liquidity.to_string())
        .bind(snapshot.sqrt_price.to_string())
        .bind(snapshot.token0_price.to_canonical_string())
        .bind(snapshot.token1_price.to_canonical_string())
        .bind(snapshot.fee_growth_global_0_x128.to_string())
        .bind(snapshot.fee_growth_global_1_x128.to_string())
        .bind(snapshot.tick.map(i64::from))
        .bind(snapshot.volume_token0.to_canonical_string())
        .bind(snapshot.volume_token1.to_canonical_string())
        .bind(snapshot.tx_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
