//! End-to-end replay of a JSON-lines event log into SQLite.

use alloy_primitives::{Address, U256};
use poolstate::contract::{MockPoolContract, TickInfo};
use poolstate::domain::{SnapshotKey, TickKey};
use poolstate::orchestration::{load_events, PoolRegistrar, ReplayError, Replayer};
use poolstate::{db::init_db, Decimal, EntityStore, IndexerError, PoolEventReducer, Repository};
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

const FACTORY: &str = "0xfafafafafafafafafafafafafafafafafafafafa";
const POOL: &str = "0x0101010101010101010101010101010101010101";

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn pool_address() -> Address {
    Address::repeat_byte(0x01)
}

fn ctx(address: &str, block: u64, log_index: u32) -> String {
    format!(
        r#"{{"address": "{}", "block_number": {}, "block_timestamp": {}, "log_index": {}}}"#,
        address,
        block,
        1_600_000_000 + block * 12,
        log_index
    )
}

/// Lines deliberately out of chain order.
fn event_log() -> Vec<String> {
    vec![
        format!(
            r#"{{"pool": {{"context": {}, "kind": {{"swap": {{"amount0": "1000000", "amount1": "-500000000000000000", "sqrt_price_x96": "79228162514264337593543950336", "liquidity": 1000, "tick": 130}}}}}}}}"#,
            ctx(POOL, 12, 0)
        ),
        format!(
            r#"{{"pool_created": {{"context": {}, "pool": "{}", "fee_tier": 3000, "token0": {{"address": "0x0202020202020202020202020202020202020202", "symbol": "USDC", "name": "USD Coin", "decimals": 6}}, "token1": {{"address": "0x0303030303030303030303030303030303030303", "symbol": "WETH", "name": "Wrapped Ether", "decimals": 18}}}}}}"#,
            ctx(FACTORY, 10, 0),
            POOL
        ),
        format!(
            r#"{{"pool": {{"context": {}, "kind": {{"mint": {{"tick_lower": 60, "tick_upper": 180, "amount": 1000, "amount0": "1000000", "amount1": "1000000000000000000"}}}}}}}}"#,
            ctx(POOL, 11, 0)
        ),
        String::new(),
        format!(
            r#"{{"pool": {{"context": {}, "kind": {{"initialize": {{"sqrt_price_x96": "79228162514264337593543950336", "tick": 100}}}}}}}}"#,
            ctx(POOL, 10, 1)
        ),
        format!(
            r#"{{"pool": {{"context": {}, "kind": {{"flash": {{}}}}}}}}"#,
            ctx(POOL, 12, 1)
        ),
    ]
}

async fn setup(contract: MockPoolContract) -> (Arc<Repository>, Replayer, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let repo = Arc::new(Repository::new(init_db(&db_path).await.expect("init_db failed")));

    let factory = Address::repeat_byte(0xfa);
    let registrar = PoolRegistrar::new(repo.clone(), factory);
    let reducer = PoolEventReducer::new(repo.clone(), Arc::new(contract), factory);
    (repo, Replayer::new(registrar, reducer), temp_dir)
}

fn write_log(dir: &TempDir, lines: &[String]) -> std::path::PathBuf {
    let path = dir.path().join("events.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

#[tokio::test]
async fn test_replay_applies_events_in_chain_order() {
    let contract = MockPoolContract::new()
        .with_fee_growth(pool_address(), U256::from(10u8), U256::from(20u8))
        .with_tick(
            pool_address(),
            120,
            TickInfo::new(U256::from(1u8), U256::from(2u8)),
        );
    let (repo, replayer, temp_dir) = setup(contract).await;
    let path = write_log(&temp_dir, &event_log());

    let events = load_events(&path).await.unwrap();
    let summary = replayer.replay(events).await.unwrap();

    assert_eq!(summary.pools_created, 1);
    assert_eq!(summary.initialize, 1);
    assert_eq!(summary.mint, 1);
    assert_eq!(summary.swap, 1);
    assert_eq!(summary.flash, 1);
    assert_eq!(summary.total(), 5);

    let pool = repo.load_pool(&pool_address()).await.unwrap().unwrap();
    assert_eq!(pool.tick, Some(130));
    assert_eq!(pool.liquidity, 1000);
    assert_eq!(pool.tx_count, 2);
    assert_eq!(pool.total_value_locked_token0, d("2"));
    assert_eq!(pool.total_value_locked_token1, d("0.5"));
    assert_eq!(pool.fee_growth_global_1_x128, U256::from(20u8));

    // The 100 -> 130 move crossed 120, which no position uses.
    let tick = repo
        .load_tick(&TickKey::new(pool_address(), 120))
        .await
        .unwrap();
    assert!(tick.is_none());
    let lower = repo
        .load_tick(&TickKey::new(pool_address(), 60))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lower.liquidity_net, 1000);

    let snapshot = repo
        .load_snapshot(&SnapshotKey::new(pool_address(), 12))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.tx_count, 1);
    assert_eq!(snapshot.volume_token0, d("1"));
    assert_eq!(repo.count_snapshots(&pool_address()).await.unwrap(), 3);

    let global = repo
        .load_global(&Address::repeat_byte(0xfa))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(global.pool_count, 1);
    assert_eq!(global.tx_count, 2);
}

#[tokio::test]
async fn test_replay_without_pool_created_fails() {
    let (_repo, replayer, temp_dir) = setup(MockPoolContract::new()).await;
    let lines: Vec<String> = event_log()
        .into_iter()
        .filter(|line| !line.contains("pool_created"))
        .collect();
    let path = write_log(&temp_dir, &lines);

    let events = load_events(&path).await.unwrap();
    let err = replayer.replay(events).await.unwrap_err();

    match err {
        ReplayError::Apply { event, source } => {
            assert!(event.starts_with("initialize("));
            assert!(matches!(
                source,
                IndexerError::MissingRecord { entity: "pool", .. }
            ));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_load_events_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_events(temp_dir.path().join("absent.jsonl"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReplayError::Io(_)));
}
