use crate::domain::parse_address;
use alloy_primitives::{address, Address};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Canonical Uniswap v3 factory on Ethereum mainnet.
pub const DEFAULT_FACTORY_ADDRESS: Address = address!("1f98431c8ad98523631ae4a59f267346ea31f984");

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub rpc_url: String,
    pub events_path: String,
    pub factory_address: Address,
    pub rpc_max_elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = required(&env_map, "DATABASE_PATH")?;
        let rpc_url = required(&env_map, "RPC_URL")?;
        let events_path = required(&env_map, "EVENTS_PATH")?;

        let factory_address = match env_map.get("FACTORY_ADDRESS") {
            Some(raw) => parse_address(raw.trim()).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "FACTORY_ADDRESS".to_string(),
                    format!("must be a 20-byte hex address, got {}", raw),
                )
            })?,
            None => DEFAULT_FACTORY_ADDRESS,
        };

        let rpc_max_elapsed_secs = env_map
            .get("RPC_MAX_ELAPSED_SECS")
            .map(|s| s.as_str())
            .unwrap_or("30")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "RPC_MAX_ELAPSED_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        Ok(Config {
            database_path,
            rpc_url,
            events_path,
            factory_address,
            rpc_max_elapsed: Duration::from_secs(rpc_max_elapsed_secs),
        })
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}
