use crate::domain::{
    address_key, is_null_eth_value, EventContext, GlobalState, Pool, StaticTokenDefinition, Token,
};
use crate::error::IndexerError;
use crate::store::EntityStore;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Token metadata as read from the token contract when its pool was created.
///
/// Any field may be missing for non-standard tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub address: Address,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
}

impl TokenMetadata {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            symbol: None,
            name: None,
            decimals: None,
        }
    }

    pub fn with_details(mut self, symbol: &str, name: &str, decimals: u8) -> Self {
        self.symbol = Some(symbol.to_string());
        self.name = Some(name.to_string());
        self.decimals = Some(decimals);
        self
    }
}

/// A factory `PoolCreated` log. `context.address` is the factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCreated {
    pub context: EventContext,
    pub pool: Address,
    pub fee_tier: u32,
    pub token0: TokenMetadata,
    pub token1: TokenMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyRegistered,
    /// A token's decimals could not be resolved; the pool is not indexed.
    Skipped,
}

/// Creates the records a pool's events require before its first event.
#[derive(Debug, Clone)]
pub struct PoolRegistrar {
    store: Arc<dyn EntityStore>,
    factory: Address,
}

impl PoolRegistrar {
    pub fn new(store: Arc<dyn EntityStore>, factory: Address) -> Self {
        Self { store, factory }
    }

    /// Register a newly created pool with its tokens and bump the factory's
    /// pool count.
    ///
    /// Registering a pool twice leaves the existing records untouched.
    pub async fn register(&self, created: &PoolCreated) -> Result<Registration, IndexerError> {
        if self.store.load_pool(&created.pool).await?.is_some() {
            return Ok(Registration::AlreadyRegistered);
        }

        let token0 = match self.load_or_resolve_token(&created.token0).await? {
            Some(token) => token,
            None => return Ok(Registration::Skipped),
        };
        let token1 = match self.load_or_resolve_token(&created.token1).await? {
            Some(token) => token,
            None => return Ok(Registration::Skipped),
        };

        let mut global = self
            .store
            .load_global(&self.factory)
            .await?
            .unwrap_or_else(|| GlobalState::new(self.factory));
        global.pool_count += 1;

        let pool = Pool::new(
            created.pool,
            token0.address,
            token1.address,
            created.fee_tier,
            created.context.block_timestamp,
            created.context.block_number,
        );
        if pool.tick_spacing().is_none() {
            warn!(pool = %pool.address, fee_tier = pool.fee_tier, "Pool created with unknown fee tier");
        }

        self.store.save_global(&global).await?;
        self.store.save_token(&token0).await?;
        self.store.save_token(&token1).await?;
        self.store.save_pool(&pool).await?;

        info!(
            pool = %address_key(&pool.address),
            token0 = %token0.symbol,
            token1 = %token1.symbol,
            fee_tier = pool.fee_tier,
            "Registered pool"
        );
        Ok(Registration::Created)
    }

    async fn load_or_resolve_token(
        &self,
        metadata: &TokenMetadata,
    ) -> Result<Option<Token>, IndexerError> {
        if let Some(token) = self.store.load_token(&metadata.address).await? {
            return Ok(Some(token));
        }
        let token = resolve_token(metadata);
        if token.is_none() {
            warn!(token = %metadata.address, "Token decimals unresolved, skipping pool");
        }
        Ok(token)
    }
}

/// Build a token record from contract metadata, falling back to the static
/// definitions for tokens whose contracts do not report it.
pub fn resolve_token(metadata: &TokenMetadata) -> Option<Token> {
    let fallback = StaticTokenDefinition::from_address(&metadata.address);

    let decimals = metadata
        .decimals
        .or_else(|| fallback.map(|def| def.decimals))?;
    let symbol = usable(metadata.symbol.as_deref())
        .or_else(|| fallback.map(|def| def.symbol))
        .unwrap_or("unknown");
    let name = usable(metadata.name.as_deref())
        .or_else(|| fallback.map(|def| def.name))
        .unwrap_or("unknown");

    Some(Token::new(
        metadata.address,
        symbol.to_string(),
        name.to_string(),
        decimals,
    ))
}

fn usable(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !is_null_eth_value(v))
}
