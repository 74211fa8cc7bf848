//! The gateway handlers: one method per logical operation.

use crate::api::*;
use basin_aggregator::{QuoteAggregator, QuoteHints};
use basin_codec::{to_raw, CodecError};
use basin_config::BasinConfig;
use basin_pools::{
    AddLiquidityRequest, LedgerReader, LedgerWriter, Pool, PoolError, PoolRegistry,
    RemoveLiquidityRequest, SwapRequest,
};
use basin_types::{Address, Token, U256};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("ledger unavailable: {0}")]
    Ledger(String),
}

/// One constructed-once gateway over the core, injected with its registry
/// and ledger collaborators by the process entry point.
pub struct Gateway {
    config: BasinConfig,
    registry: Arc<PoolRegistry>,
    reader: Arc<dyn LedgerReader>,
    writer: Arc<dyn LedgerWriter>,
    aggregator: QuoteAggregator,
}

impl Gateway {
    pub fn new(
        config: BasinConfig,
        registry: Arc<PoolRegistry>,
        reader: Arc<dyn LedgerReader>,
        writer: Arc<dyn LedgerWriter>,
        aggregator: QuoteAggregator,
    ) -> Self {
        Self {
            config,
            registry,
            reader,
            writer,
            aggregator,
        }
    }

    /// GET pools: every registered pool with freshly read reserves.
    ///
    /// Refreshes run concurrently; a pool whose refresh fails is summarized
    /// from its last snapshot rather than dropped.
    pub async fn pools(&self) -> Vec<PoolSummary> {
        let deadline = self.config.io_timeout();
        let refreshes = self.registry.list_pools().into_iter().map(|pool| async move {
            if let Err(e) = pool.refresh(self.reader.as_ref(), deadline).await {
                warn!(pair = %pool.pair_key(), error = %e, "listing with stale snapshot");
            }
            summarize(&pool)
        });
        join_all(refreshes).await
    }

    /// GET pool(tokenA, tokenB).
    pub async fn pool(&self, token_a: &str, token_b: &str) -> Result<PoolSummary, GatewayError> {
        let pool = self
            .registry
            .resolve(&Address::from(token_a), &Address::from(token_b))?;
        if let Err(e) = pool.refresh(self.reader.as_ref(), self.config.io_timeout()).await {
            warn!(pair = %pool.pair_key(), error = %e, "serving stale snapshot");
        }
        Ok(summarize(&pool))
    }

    /// POST pools/create: resolve both tokens' metadata, then register.
    pub async fn create_pool(&self, request: CreatePoolRequest) -> Result<PoolSummary, GatewayError> {
        let token_a = self.resolve_token(&request.token_a).await?;
        let token_b = self.resolve_token(&request.token_b).await?;
        let pool = self
            .registry
            .create_pool(token_a, token_b, &Address::from(request.creator.as_str()))
            .await?;
        Ok(summarize(&pool))
    }

    /// POST swap/quote: fee policy, concurrent venue fan-out, best quote.
    pub async fn swap_quote(&self, request: SwapQuoteRequest) -> Result<SwapQuoteResponse, GatewayError> {
        let token_in = self.resolve_token(&request.token_in).await?;
        let token_out = self.resolve_token(&request.token_out).await?;
        if token_in.same_asset(&token_out) {
            return Err(PoolError::IdenticalTokens.into());
        }

        let amount_in = to_raw(&request.amount_in, token_in.decimals)?;
        if amount_in.is_zero() {
            return Err(GatewayError::InvalidInput(
                "swap amount must be positive".into(),
            ));
        }

        let hints = QuoteHints {
            gas_price: match &request.gas_price {
                Some(s) => Some(
                    U256::from_dec_str(s)
                        .map_err(|_| GatewayError::InvalidInput(format!("bad gas price '{s}'")))?,
                ),
                None => None,
            },
        };

        let aggregated = self
            .aggregator
            .best_quote(&token_in, &token_out, amount_in, &hints)
            .await;
        let net_in = amount_in - aggregated.best.fee_taken;

        debug!(venue = %aggregated.best.venue_id, amount_out = %aggregated.best.amount_out,
            "swap quoted");
        Ok(SwapQuoteResponse {
            venue_id: aggregated.best.venue_id.clone(),
            amount_in: Qty::new(amount_in, token_in.decimals),
            net_in: Qty::new(net_in, token_in.decimals),
            fee_taken: Qty::new(aggregated.best.fee_taken, token_in.decimals),
            amount_out: Qty::new(aggregated.best.amount_out, token_out.decimals),
            venues: aggregated.venue_raw,
        })
    }

    /// POST swap/execute against the local AMM pool for the pair.
    pub async fn swap_execute(
        &self,
        request: SwapExecuteRequest,
    ) -> Result<SwapExecuteResponse, GatewayError> {
        let pool = self.registry.resolve(
            &Address::from(request.token_in.as_str()),
            &Address::from(request.token_out.as_str()),
        )?;
        let token_in = pool_side(&pool, &request.token_in)?;
        let token_out = pool_side(&pool, &request.token_out)?;
        let amount_in = to_raw(&request.amount_in, token_in.decimals)?;
        let deadline = self.config.io_timeout();

        let min_amount_out = match &request.min_amount_out {
            Some(s) => to_raw(s, token_out.decimals)?,
            // Default tolerance around a fresh pre-trade quote: if reserves
            // move adversely between here and the execute's own refresh, the
            // guard trips instead of settling at a worse price.
            None => {
                pool.refresh(self.reader.as_ref(), deadline).await?;
                let quote = pool.quote_swap(&token_in.address, amount_in)?;
                within_tolerance(quote.amount_out, self.config.default_slippage_bps)
            }
        };

        let execution = pool
            .execute_swap(
                self.reader.as_ref(),
                self.writer.as_ref(),
                &SwapRequest {
                    trader: Address::from(request.trader.as_str()),
                    token_in: token_in.address.clone(),
                    amount_in,
                    min_amount_out,
                },
                deadline,
            )
            .await?;

        // Canonical reserves re-oriented to the trade direction.
        let (reserve_a, reserve_b) = execution.new_reserves;
        let (new_in, new_out) = if token_in.address == pool.token_a().address {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        Ok(SwapExecuteResponse {
            tx_id: execution.receipt.tx_id,
            amount_in: Qty::new(amount_in, token_in.decimals),
            amount_out: Qty::new(execution.quote.amount_out, token_out.decimals),
            fee_paid: Qty::new(execution.quote.fee_paid, token_in.decimals),
            price_impact: execution.quote.price_impact,
            new_reserve_in: Qty::new(new_in, token_in.decimals),
            new_reserve_out: Qty::new(new_out, token_out.decimals),
        })
    }

    /// POST liquidity/add.
    pub async fn liquidity_add(
        &self,
        request: LiquidityAddRequest,
    ) -> Result<LiquidityAddResponse, GatewayError> {
        let pool = self.registry.resolve(
            &Address::from(request.token_a.as_str()),
            &Address::from(request.token_b.as_str()),
        )?;
        // The caller's (a, b) may be flipped relative to canonical order.
        let side_a = pool_side(&pool, &request.token_a)?;
        let side_b = pool_side(&pool, &request.token_b)?;
        let desired = Sided {
            a: to_raw(&request.amount_a, side_a.decimals)?,
            b: to_raw(&request.amount_b, side_b.decimals)?,
        }
        .into_canonical(&pool, side_a);
        let minimums = Sided {
            a: opt_raw(&request.min_a, side_a.decimals)?,
            b: opt_raw(&request.min_b, side_b.decimals)?,
        }
        .into_canonical(&pool, side_a);

        let execution = pool
            .execute_add_liquidity(
                self.reader.as_ref(),
                self.writer.as_ref(),
                &AddLiquidityRequest {
                    provider: Address::from(request.provider.as_str()),
                    desired_a: desired.a,
                    desired_b: desired.b,
                    min_a: minimums.a,
                    min_b: minimums.b,
                },
                self.config.io_timeout(),
            )
            .await?;

        // Map canonical results back to the caller's (a, b) orientation.
        let used = Sided {
            a: execution.used_a,
            b: execution.used_b,
        }
        .into_caller(&pool, side_a);
        let reserves = Sided {
            a: execution.new_reserves.0,
            b: execution.new_reserves.1,
        }
        .into_caller(&pool, side_a);
        Ok(LiquidityAddResponse {
            tx_id: execution.receipt.tx_id,
            used_a: Qty::new(used.a, side_a.decimals),
            used_b: Qty::new(used.b, side_b.decimals),
            lp_minted: Qty::new(execution.mint.minted, LP_DECIMALS),
            share: execution.mint.share,
            new_reserve_a: Qty::new(reserves.a, side_a.decimals),
            new_reserve_b: Qty::new(reserves.b, side_b.decimals),
        })
    }

    /// POST liquidity/remove.
    pub async fn liquidity_remove(
        &self,
        request: LiquidityRemoveRequest,
    ) -> Result<LiquidityRemoveResponse, GatewayError> {
        let pool = self.registry.resolve(
            &Address::from(request.token_a.as_str()),
            &Address::from(request.token_b.as_str()),
        )?;
        let side_a = pool_side(&pool, &request.token_a)?;
        let side_b = pool_side(&pool, &request.token_b)?;
        let lp_amount = to_raw(&request.lp_amount, LP_DECIMALS)?;
        let minimums = Sided {
            a: opt_raw(&request.min_a, side_a.decimals)?,
            b: opt_raw(&request.min_b, side_b.decimals)?,
        }
        .into_canonical(&pool, side_a);

        let execution = pool
            .execute_remove_liquidity(
                self.reader.as_ref(),
                self.writer.as_ref(),
                &RemoveLiquidityRequest {
                    provider: Address::from(request.provider.as_str()),
                    lp_amount,
                    min_a: minimums.a,
                    min_b: minimums.b,
                },
                self.config.io_timeout(),
            )
            .await?;

        // Map canonical payouts back to the caller's (a, b) orientation.
        let payout = Sided {
            a: execution.burn.amount_a,
            b: execution.burn.amount_b,
        }
        .into_caller(&pool, side_a);
        let reserves = Sided {
            a: execution.new_reserves.0,
            b: execution.new_reserves.1,
        }
        .into_caller(&pool, side_a);
        Ok(LiquidityRemoveResponse {
            tx_id: execution.receipt.tx_id,
            amount_a: Qty::new(payout.a, side_a.decimals),
            amount_b: Qty::new(payout.b, side_b.decimals),
            share: execution.burn.share,
            new_reserve_a: Qty::new(reserves.a, side_a.decimals),
            new_reserve_b: Qty::new(reserves.b, side_b.decimals),
        })
    }

    /// GET liquidity/positions(holder).
    pub async fn positions(&self, holder: &str) -> Vec<PositionSummary> {
        self.registry
            .positions_for(
                &Address::from(holder),
                self.reader.as_ref(),
                self.config.io_timeout(),
            )
            .await
            .into_iter()
            .map(|p| PositionSummary {
                pair_key: p.pair_key.to_string(),
                lp_balance: Qty::new(p.lp_balance, LP_DECIMALS),
                share: p.share,
                entitlement_a: Qty::new(p.entitlement_a, p.token_a.decimals),
                entitlement_b: Qty::new(p.entitlement_b, p.token_b.decimals),
                token_a: p.token_a,
                token_b: p.token_b,
            })
            .collect()
    }

    async fn resolve_token(&self, address: &str) -> Result<Token, GatewayError> {
        let address = Address::from(address);
        let metadata = self
            .reader
            .get_token_metadata(&address)
            .await
            .map_err(|e| GatewayError::Ledger(e.to_string()))?;
        Ok(Token {
            address,
            decimals: metadata.decimals,
            symbol: metadata.symbol,
        })
    }
}

/// Amounts keyed to the caller's (a, b) orientation.
struct Sided {
    a: U256,
    b: U256,
}

impl Sided {
    /// Reorder into the pool's canonical orientation. `caller_a` is the
    /// token the caller supplied as side A.
    fn into_canonical(self, pool: &Pool, caller_a: &Token) -> Sided {
        if caller_a.address == pool.token_a().address {
            self
        } else {
            Sided {
                a: self.b,
                b: self.a,
            }
        }
    }

    /// Reorder canonical values back into the caller's orientation. The
    /// flip is its own inverse, so this is the same swap.
    fn into_caller(self, pool: &Pool, caller_a: &Token) -> Sided {
        self.into_canonical(pool, caller_a)
    }
}

fn pool_side<'p>(pool: &'p Pool, token: &str) -> Result<&'p Token, GatewayError> {
    let address = Address::from(token);
    if pool.token_a().address == address {
        Ok(pool.token_a())
    } else if pool.token_b().address == address {
        Ok(pool.token_b())
    } else {
        Err(GatewayError::InvalidInput(format!(
            "token {token} is not part of pair {}",
            pool.pair_key()
        )))
    }
}

fn opt_raw(value: &Option<String>, decimals: u8) -> Result<U256, CodecError> {
    match value {
        Some(s) => to_raw(s, decimals),
        None => Ok(U256::zero()),
    }
}

/// `amount * (10_000 - slippage_bps) / 10_000`, the default minimum-output
/// guard derived from a fresh quote.
fn within_tolerance(amount: U256, slippage_bps: u16) -> U256 {
    basin_amm::protocol_fee(amount, slippage_bps).0
}

fn summarize(pool: &Pool) -> PoolSummary {
    let snapshot = pool.snapshot();
    PoolSummary {
        pair_key: pool.pair_key().to_string(),
        token_a: pool.token_a().clone(),
        token_b: pool.token_b().clone(),
        fee_bps: pool.fee_bps(),
        reserve_a: Qty::new(snapshot.reserve_a, pool.token_a().decimals),
        reserve_b: Qty::new(snapshot.reserve_b, pool.token_b().decimals),
        lp_supply: Qty::new(snapshot.lp_supply, LP_DECIMALS),
        lp_token: pool.lp_token().to_string(),
        tradable: pool.is_tradable(),
    }
}
