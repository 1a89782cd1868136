use super::fee_sync::FeeGrowthSync;
use super::snapshot::SnapshotAccumulator;
use super::sweep::{crossing_steps, ticks_to_resync, MAX_TICK_CROSSINGS};
use super::ticks::TickRegistry;
use crate::contract::PoolContract;
use crate::domain::{
    address_key, sqrt_price_x96_to_token_prices, to_decimal, unsigned_to_decimal, Boundary,
    EventContext, FlashParams, GlobalState, InitializeParams, LiquidityParams, Pool,
    PoolEvent, PoolEventKind, SwapParams, TickKey, Token,
};
use crate::error::IndexerError;
use crate::store::EntityStore;
use alloy_primitives::Address;
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies pool events to the entity store, one event at a time.
///
/// Events of one pool must be applied in chain order. Each handler loads the
/// records it needs, mutates them and writes them back before returning.
#[derive(Debug, Clone)]
pub struct PoolEventReducer {
    store: Arc<dyn EntityStore>,
    contract: Arc<dyn PoolContract>,
    factory: Address,
    ticks: TickRegistry,
    fee_sync: FeeGrowthSync,
    snapshots: SnapshotAccumulator,
}

/// The records mint, burn and swap operate on.
struct Accounts {
    global: GlobalState,
    pool: Pool,
    token0: Token,
    token1: Token,
}

impl PoolEventReducer {
    pub fn new(
        store: Arc<dyn EntityStore>,
        contract: Arc<dyn PoolContract>,
        factory: Address,
    ) -> Self {
        Self {
            ticks: TickRegistry::new(store.clone()),
            fee_sync: FeeGrowthSync::new(store.clone(), contract.clone()),
            snapshots: SnapshotAccumulator::new(store.clone()),
            store,
            contract,
            factory,
        }
    }

    /// Dispatch one event to its handler.
    pub async fn handle(&self, event: &PoolEvent) -> Result<(), IndexerError> {
        debug!(event = %event, "Handling pool event");
        let ctx = &event.context;
        match &event.kind {
            PoolEventKind::Initialize(params) => self.handle_initialize(ctx, params).await,
            PoolEventKind::Mint(params) => self.handle_mint(ctx, params).await,
            PoolEventKind::Burn(params) => self.handle_burn(ctx, params).await,
            PoolEventKind::Swap(params) => self.handle_swap(ctx, params).await,
            PoolEventKind::Flash(params) => self.handle_flash(ctx, params).await,
        }
    }

    pub async fn handle_initialize(
        &self,
        ctx: &EventContext,
        params: &InitializeParams,
    ) -> Result<(), IndexerError> {
        let mut pool = self.load_pool(&ctx.address).await?;
        pool.sqrt_price = params.sqrt_price_x96;
        pool.tick = Some(params.tick);
        self.store.save_pool(&pool).await?;

        self.snapshots.touch(ctx, &pool).await?;
        Ok(())
    }

    pub async fn handle_mint(
        &self,
        ctx: &EventContext,
        params: &LiquidityParams,
    ) -> Result<(), IndexerError> {
        let Accounts {
            mut global,
            mut pool,
            mut token0,
            mut token1,
        } = self.load_accounts(&ctx.address).await?;

        let amount0 = unsigned_to_decimal(params.amount0, token0.decimals)?;
        let amount1 = unsigned_to_decimal(params.amount1, token1.decimals)?;

        global.tx_count += 1;
        pool.tx_count += 1;
        token0.tx_count += 1;
        token1.tx_count += 1;

        token0.total_value_locked += amount0;
        token1.total_value_locked += amount1;
        pool.total_value_locked_token0 += amount0;
        pool.total_value_locked_token1 += amount1;
        warn_if_negative_tvl(&pool, &token0, &token1);

        if pool.is_in_range(params.tick_lower, params.tick_upper) {
            pool.liquidity = pool.liquidity.saturating_add(params.amount);
        }

        let mut lower = self
            .ticks
            .load_or_create(&pool.address, params.tick_lower, ctx)
            .await?;
        let mut upper = self
            .ticks
            .load_or_create(&pool.address, params.tick_upper, ctx)
            .await?;
        lower.add_liquidity(params.amount, Boundary::Lower);
        upper.add_liquidity(params.amount, Boundary::Upper);

        self.snapshots.touch(ctx, &pool).await?;

        self.store.save_token(&token0).await?;
        self.store.save_token(&token1).await?;
        self.store.save_pool(&pool).await?;
        self.store.save_global(&global).await?;

        // Resync persists the ticks.
        self.fee_sync.resync(&mut lower, ctx).await?;
        self.fee_sync.resync(&mut upper, ctx).await?;
        Ok(())
    }

    pub async fn handle_burn(
        &self,
        ctx: &EventContext,
        params: &LiquidityParams,
    ) -> Result<(), IndexerError> {
        let Accounts {
            mut global,
            mut pool,
            mut token0,
            mut token1,
        } = self.load_accounts(&ctx.address).await?;

        let amount0 = unsigned_to_decimal(params.amount0, token0.decimals)?;
        let amount1 = unsigned_to_decimal(params.amount1, token1.decimals)?;

        global.tx_count += 1;
        pool.tx_count += 1;
        token0.tx_count += 1;
        token1.tx_count += 1;

        token0.total_value_locked -= amount0;
        token1.total_value_locked -= amount1;
        pool.total_value_locked_token0 -= amount0;
        pool.total_value_locked_token1 -= amount1;
        warn_if_negative_tvl(&pool, &token0, &token1);

        if pool.is_in_range(params.tick_lower, params.tick_upper) {
            pool.liquidity = match pool.liquidity.checked_sub(params.amount) {
                Some(liquidity) => liquidity,
                None => {
                    warn!(
                        pool = %pool.address,
                        liquidity = %pool.liquidity,
                        amount = %params.amount,
                        "Burn exceeds active liquidity, clamping to zero"
                    );
                    0
                }
            };
        }

        let lower = self.ticks.get(&pool.address, params.tick_lower).await?;
        let upper = self.ticks.get(&pool.address, params.tick_upper).await?;

        self.snapshots.touch(ctx, &pool).await?;

        self.store.save_token(&token0).await?;
        self.store.save_token(&token1).await?;
        self.store.save_pool(&pool).await?;
        self.store.save_global(&global).await?;

        match (lower, upper) {
            (Some(mut lower), Some(mut upper)) => {
                for (tick, boundary) in [
                    (&mut lower, Boundary::Lower),
                    (&mut upper, Boundary::Upper),
                ] {
                    if !tick.remove_liquidity(params.amount, boundary) {
                        warn!(
                            tick = %tick.key(),
                            amount = %params.amount,
                            "Burn exceeds tick gross liquidity, clamping to zero"
                        );
                    }
                }

                self.fee_sync.resync(&mut lower, ctx).await?;
                self.fee_sync.resync(&mut upper, ctx).await?;
            }
            _ => {
                warn!(
                    pool = %pool.address,
                    tick_lower = params.tick_lower,
                    tick_upper = params.tick_upper,
                    block = ctx.block_number,
                    "Burn against missing tick record, ticks left unchanged"
                );
            }
        }
        Ok(())
    }

    pub async fn handle_swap(
        &self,
        ctx: &EventContext,
        params: &SwapParams,
    ) -> Result<(), IndexerError> {
        let Accounts {
            mut global,
            mut pool,
            mut token0,
            mut token1,
        } = self.load_accounts(&ctx.address).await?;
        let tick_spacing = pool
            .tick_spacing()
            .ok_or(IndexerError::UnsupportedFeeTier {
                pool: pool.address,
                fee_tier: pool.fee_tier,
            })?;
        let old_tick = pool.tick;

        let amount0 = to_decimal(params.amount0, token0.decimals)?;
        let amount1 = to_decimal(params.amount1, token1.decimals)?;
        let amount0_abs = amount0.abs();
        let amount1_abs = amount1.abs();

        global.tx_count += 1;
        pool.tx_count += 1;
        token0.tx_count += 1;
        token1.tx_count += 1;

        pool.volume_token0 += amount0_abs;
        pool.volume_token1 += amount1_abs;
        token0.volume += amount0_abs;
        token1.volume += amount1_abs;

        pool.liquidity = params.liquidity;
        pool.sqrt_price = params.sqrt_price_x96;
        pool.tick = Some(params.tick);

        pool.total_value_locked_token0 += amount0;
        pool.total_value_locked_token1 += amount1;
        token0.total_value_locked += amount0;
        token1.total_value_locked += amount1;
        warn_if_negative_tvl(&pool, &token0, &token1);

        let (price0, price1) =
            sqrt_price_x96_to_token_prices(pool.sqrt_price, token0.decimals, token1.decimals);
        pool.token0_price = price0;
        pool.token1_price = price1;

        self.sync_fee_growth_globals(&mut pool, ctx).await?;

        self.snapshots
            .touch_with_volume(ctx, &pool, amount0_abs, amount1_abs)
            .await?;
        // Token volume is credited a second time with the snapshot volume.
        token0.volume += amount0_abs;
        token1.volume += amount1_abs;

        self.store.save_token(&token0).await?;
        self.store.save_token(&token1).await?;
        self.store.save_pool(&pool).await?;
        self.store.save_global(&global).await?;

        self.sweep(&pool, old_tick, params.tick, tick_spacing, ctx)
            .await
    }

    /// A flash loan only moves the pool's global fee growth.
    pub async fn handle_flash(
        &self,
        ctx: &EventContext,
        _params: &FlashParams,
    ) -> Result<(), IndexerError> {
        let mut pool = self.load_pool(&ctx.address).await?;
        self.sync_fee_growth_globals(&mut pool, ctx).await?;
        self.store.save_pool(&pool).await?;
        Ok(())
    }

    async fn sweep(
        &self,
        pool: &Pool,
        old_tick: Option<i32>,
        new_tick: i32,
        tick_spacing: i32,
        ctx: &EventContext,
    ) -> Result<(), IndexerError> {
        if let Some(old_tick) = old_tick {
            if crossing_steps(old_tick, new_tick, tick_spacing) > MAX_TICK_CROSSINGS {
                debug!(
                    pool = %pool.address,
                    old_tick,
                    new_tick,
                    tick_spacing,
                    "Tick move exceeds crossing limit, sweep skipped"
                );
            }
        }

        let candidates = ticks_to_resync(old_tick, new_tick, tick_spacing);
        let mut resynced = 0usize;
        for tick_idx in candidates {
            let key = TickKey::new(pool.address, tick_idx);
            if self.fee_sync.resync_existing(&key, ctx).await? {
                resynced += 1;
            }
        }
        debug!(pool = %pool.address, old_tick = ?old_tick, new_tick, resynced, "Tick crossing sweep done");
        Ok(())
    }

    async fn sync_fee_growth_globals(
        &self,
        pool: &mut Pool,
        ctx: &EventContext,
    ) -> Result<(), IndexerError> {
        let (global0, global1) = self
            .contract
            .fee_growth_globals(&pool.address, ctx.block_number)
            .await?;
        pool.fee_growth_global_0_x128 = global0;
        pool.fee_growth_global_1_x128 = global1;
        Ok(())
    }

    async fn load_pool(&self, address: &Address) -> Result<Pool, IndexerError> {
        self.store
            .load_pool(address)
            .await?
            .ok_or_else(|| IndexerError::missing("pool", address_key(address)))
    }

    async fn load_token(&self, address: &Address) -> Result<Token, IndexerError> {
        self.store
            .load_token(address)
            .await?
            .ok_or_else(|| IndexerError::missing("token", address_key(address)))
    }

    async fn load_accounts(&self, pool: &Address) -> Result<Accounts, IndexerError> {
        let pool = self.load_pool(pool).await?;
        let global = self
            .store
            .load_global(&self.factory)
            .await?
            .ok_or_else(|| IndexerError::missing("global_state", address_key(&self.factory)))?;
        let token0 = self.load_token(&pool.token0).await?;
        let token1 = self.load_token(&pool.token1).await?;
        Ok(Accounts {
            global,
            pool,
            token0,
            token1,
        })
    }
}

/// Report negative pool or token TVL. Returns whether any was found.
fn warn_if_negative_tvl(pool: &Pool, token0: &Token, token1: &Token) -> bool {
    let mut negative = false;
    if pool.total_value_locked_token0.is_negative() || pool.total_value_locked_token1.is_negative()
    {
        warn!(
            pool = %pool.address,
            tvl0 = %pool.total_value_locked_token0,
            tvl1 = %pool.total_value_locked_token1,
            "Pool TVL went negative"
        );
        negative = true;
    }
    for token in [token0, token1] {
        if token.total_value_locked.is_negative() {
            warn!(
                token = %token.address,
                symbol = %token.symbol,
                tvl = %token.total_value_locked,
                "Token TVL went negative"
            );
            negative = true;
        }
    }
    negative
}
