//! SQLite setup for the entity store.
//!
//! Every entity lives in its own table keyed by the text id its record
//! renders (`address`, `pool#tick`, `pool#block`). The schema is applied in a
//! single transaction and checked before the pool is handed out.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Sqlite, Transaction};
use std::path::Path;
use tracing::{debug, info};

/// Tables the entity store reads and writes, in creation order.
pub const ENTITY_TABLES: [&str; 5] = ["global_state", "tokens", "pools", "ticks", "pool_snapshots"];

/// Applied to each pooled connection after the journal mode.
const CONNECTION_PRAGMAS: [&str; 2] = ["PRAGMA busy_timeout = 5000", "PRAGMA synchronous = NORMAL"];

/// Open (creating if needed) the entity store at `db_path`.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { prepare_connection(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    apply_schema(&pool).await?;
    verify_entity_tables(&pool).await?;

    info!(path = %db_path, tables = ENTITY_TABLES.len(), "Entity store initialized");
    Ok(pool)
}

async fn prepare_connection(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let journal_mode: String = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?
        .get(0);
    if journal_mode != "wal" {
        debug!(journal_mode = %journal_mode, "WAL unavailable, keeping SQLite default");
    }

    for pragma in CONNECTION_PRAGMAS {
        sqlx::query(pragma).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Create missing tables and indexes. Existing rows are never touched.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx: Transaction<'_, Sqlite> = pool.begin().await?;
    let mut statements = 0usize;
    for statement in include_str!("schema.sql")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        sqlx::query(statement).execute(&mut *tx).await?;
        statements += 1;
    }
    tx.commit().await?;

    debug!(statements, "Entity schema applied");
    Ok(())
}

/// Fail unless every entity table exists with a text `id` primary key.
async fn verify_entity_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for table in ENTITY_TABLES {
        let columns = sqlx::query(&format!("PRAGMA table_info({})", table))
            .fetch_all(pool)
            .await?;
        let keyed_by_id = columns.iter().any(|column| {
            let name: String = column.get("name");
            let column_type: String = column.get("type");
            let pk: i64 = column.get("pk");
            name == "id" && column_type.eq_ignore_ascii_case("TEXT") && pk == 1
        });
        if !keyed_by_id {
            return Err(sqlx::Error::Protocol(format!(
                "entity table `{}` is missing or not keyed by a text id",
                table
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open(temp_dir: &TempDir) -> SqlitePool {
        let db_path = temp_dir.path().join("entities.db");
        init_db(&db_path.to_string_lossy())
            .await
            .expect("init_db failed")
    }

    #[tokio::test]
    async fn test_init_db_creates_entity_tables() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open(&temp_dir).await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let mut expected: Vec<String> = ENTITY_TABLES.iter().map(|t| t.to_string()).collect();
        expected.sort();
        assert_eq!(tables, expected);
        verify_entity_tables(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_reopening_keeps_existing_rows() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open(&temp_dir).await;
        sqlx::query("INSERT INTO global_state (id, pool_count, tx_count) VALUES ('0xfa', 3, 7)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let pool = open(&temp_dir).await;
        let (pool_count, tx_count): (i64, i64) =
            sqlx::query_as("SELECT pool_count, tx_count FROM global_state WHERE id = '0xfa'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!((pool_count, tx_count), (3, 7));
    }

    #[tokio::test]
    async fn test_one_snapshot_row_per_pool_and_block() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open(&temp_dir).await;
        let insert = "INSERT INTO pool_snapshots (id, pool, block_number, timestamp, liquidity, \
             sqrt_price, token0_price, token1_price, fee_growth_global_0_x128, \
             fee_growth_global_1_x128, tick, volume_token0, volume_token1, tx_count) \
             VALUES (?, '0x01', 10, 0, '0', '0', '0', '0', '0', '0', NULL, '0', '0', 1)";

        sqlx::query(insert).bind("0x01#10").execute(&pool).await.unwrap();
        let duplicate = sqlx::query(insert).bind("other-id").execute(&pool).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_verify_rejects_table_without_text_id() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open(&temp_dir).await;
        sqlx::query("DROP TABLE ticks").execute(&pool).await.unwrap();
        sqlx::query("CREATE TABLE ticks (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();

        let err = verify_entity_tables(&pool).await.unwrap_err();
        assert!(err.to_string().contains("ticks"));
    }

    #[tokio::test]
    async fn test_connections_wait_on_busy_database() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open(&temp_dir).await;
        let busy_timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(busy_timeout, 5000);
    }
}
