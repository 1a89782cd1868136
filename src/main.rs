use anyhow::Context;
use poolstate::orchestration::{load_events, PoolRegistrar, Replayer};
use poolstate::{
    config::Config, db::init_db, EntityStore, PoolContract, PoolEventReducer, Repository,
    RpcPoolContract,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;

    let store: Arc<dyn EntityStore> = Arc::new(Repository::new(pool));
    let contract: Arc<dyn PoolContract> = Arc::new(
        RpcPoolContract::new(config.rpc_url.clone()).with_max_elapsed(config.rpc_max_elapsed),
    );

    let registrar = PoolRegistrar::new(store.clone(), config.factory_address);
    let reducer = PoolEventReducer::new(store, contract, config.factory_address);
    let replayer = Replayer::new(registrar, reducer);

    let events = load_events(&config.events_path)
        .await
        .with_context(|| format!("Failed to load events from {}", config.events_path))?;
    let summary = replayer.replay(events).await?;

    tracing::info!(total = summary.total(), "Done");
    Ok(())
}
