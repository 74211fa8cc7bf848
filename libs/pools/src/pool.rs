//! Per-pool state: reserve snapshots, quotes, and mutating operations.
//!
//! A pool starts `Uninitialized` and becomes `Active` after its first
//! successful reserve refresh; there is no terminal state. Every mutating
//! operation re-reads reserves first and fails with `ReserveUnavailable`
//! rather than pricing against a stale snapshot, and its slippage guard runs
//! before any ledger operation is built or submitted.
//!
//! Concurrency is optimistic: two concurrent executes against one pool may
//! both price against the same pre-trade reserves. The ledger serializes the
//! submissions; the loser's slippage guard (or the ledger itself) rejects
//! the now-mispriced trade. See the crate docs.

use crate::error::PoolError;
use crate::ledger::{LedgerReader, LedgerWriter};
use crate::persistence::PoolRecord;
use basin_amm::{
    liquidity_burn, liquidity_mint, optimal_deposit, swap_output, LiquidityBurn, LiquidityMint,
    SwapOutput,
};
use basin_types::{Address, LedgerOp, PairKey, Token, WriteReceipt, U256};
use parking_lot::RwLock;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Point-in-time view of a pool's ledger-owned quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub lp_supply: U256,
    /// False until the first successful refresh.
    pub initialized: bool,
}

impl PoolSnapshot {
    fn empty() -> Self {
        Self {
            reserve_a: U256::zero(),
            reserve_b: U256::zero(),
            lp_supply: U256::zero(),
            initialized: false,
        }
    }
}

/// A registered liquidity pool for one token pair.
///
/// Reserves and LP supply are owned by the ledger; this struct caches the
/// last-observed values and re-reads them around every mutating operation.
pub struct Pool {
    key: PairKey,
    token_a: Token,
    token_b: Token,
    fee_bps: u16,
    pool_account: Address,
    lp_token: Address,
    state: RwLock<PoolSnapshot>,
}

/// Parameters for an exact-input swap.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub trader: Address,
    pub token_in: Address,
    pub amount_in: U256,
    /// Slippage guard: the operation fails before any write if the computed
    /// output is below this.
    pub min_amount_out: U256,
}

/// Parameters for a two-sided liquidity deposit.
#[derive(Debug, Clone)]
pub struct AddLiquidityRequest {
    pub provider: Address,
    pub desired_a: U256,
    pub desired_b: U256,
    pub min_a: U256,
    pub min_b: U256,
}

/// Parameters for an LP-token redemption.
#[derive(Debug, Clone)]
pub struct RemoveLiquidityRequest {
    pub provider: Address,
    pub lp_amount: U256,
    pub min_a: U256,
    pub min_b: U256,
}

/// Outcome of a settled swap.
#[derive(Debug, Clone)]
pub struct SwapExecution {
    pub receipt: WriteReceipt,
    pub quote: SwapOutput,
    pub token_out: Token,
    /// Reserves observed after settlement, canonical order.
    pub new_reserves: (U256, U256),
}

/// Outcome of a settled deposit.
#[derive(Debug, Clone)]
pub struct AddLiquidityExecution {
    pub receipt: WriteReceipt,
    pub used_a: U256,
    pub used_b: U256,
    pub mint: LiquidityMint,
    pub new_reserves: (U256, U256),
}

/// Outcome of a settled redemption.
#[derive(Debug, Clone)]
pub struct RemoveLiquidityExecution {
    pub receipt: WriteReceipt,
    pub burn: LiquidityBurn,
    pub new_reserves: (U256, U256),
}

impl Pool {
    /// Rebuild a pool from its persisted record. The snapshot starts
    /// uninitialized; the first refresh activates it.
    pub fn from_record(record: &PoolRecord) -> Self {
        Self {
            key: record.pair_key.clone(),
            token_a: record.token_a.clone(),
            token_b: record.token_b.clone(),
            fee_bps: record.fee_bps,
            pool_account: record.pool_account.clone(),
            lp_token: record.lp_token.clone(),
            state: RwLock::new(PoolSnapshot::empty()),
        }
    }

    pub fn pair_key(&self) -> &PairKey {
        &self.key
    }

    pub fn token_a(&self) -> &Token {
        &self.token_a
    }

    pub fn token_b(&self) -> &Token {
        &self.token_b
    }

    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    pub fn pool_account(&self) -> &Address {
        &self.pool_account
    }

    pub fn lp_token(&self) -> &Address {
        &self.lp_token
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        *self.state.read()
    }

    /// A pool is tradable once it holds reserves on both sides.
    pub fn is_tradable(&self) -> bool {
        let s = self.snapshot();
        s.initialized && !s.reserve_a.is_zero() && !s.reserve_b.is_zero()
    }

    /// Re-read reserves and LP supply from the ledger, bounded by `deadline`.
    ///
    /// On success the snapshot is replaced wholesale and the pool is Active.
    /// On failure the previous snapshot is kept untouched and the error is
    /// surfaced; mutating callers translate it to `ReserveUnavailable`.
    pub async fn refresh(
        &self,
        ledger: &dyn LedgerReader,
        deadline: Duration,
    ) -> Result<PoolSnapshot, PoolError> {
        let reads = async {
            let reserves = ledger.get_reserves(&self.pool_account).await?;
            let supply = ledger.get_total_supply(&self.lp_token).await?;
            Ok::<_, crate::ledger::LedgerError>((reserves, supply))
        };

        let ((reserve_a, reserve_b), lp_supply) = timeout(deadline, reads)
            .await
            .map_err(|_| {
                PoolError::ReserveUnavailable(format!("refresh timed out for pair {}", self.key))
            })?
            .map_err(|e| PoolError::ReserveUnavailable(e.to_string()))?;

        // Ledger-side consistency check: one-sided reserves or supply without
        // reserves indicate a half-settled pool. Observed, not fatal.
        if (reserve_a.is_zero() != reserve_b.is_zero())
            || (lp_supply.is_zero() != (reserve_a.is_zero() && reserve_b.is_zero()))
        {
            warn!(pair = %self.key, %reserve_a, %reserve_b, %lp_supply,
                "ledger reports inconsistent pool state");
        }

        let snapshot = PoolSnapshot {
            reserve_a,
            reserve_b,
            lp_supply,
            initialized: true,
        };
        *self.state.write() = snapshot;
        debug!(pair = %self.key, %reserve_a, %reserve_b, %lp_supply, "pool refreshed");
        Ok(snapshot)
    }

    /// Orient the snapshot's reserves for a trade entering with `token_in`.
    /// Returns (reserve_in, reserve_out, token_out).
    fn orient(&self, token_in: &Address) -> Result<(U256, U256, &Token), PoolError> {
        let s = self.snapshot();
        if token_in == &self.token_a.address {
            Ok((s.reserve_a, s.reserve_b, &self.token_b))
        } else if token_in == &self.token_b.address {
            Ok((s.reserve_b, s.reserve_a, &self.token_a))
        } else {
            Err(PoolError::InvalidInput(format!(
                "token {token_in} is not part of pair {}",
                self.key
            )))
        }
    }

    /// Price a swap against the current snapshot. Pure; no ledger access.
    pub fn quote_swap(&self, token_in: &Address, amount_in: U256) -> Result<SwapOutput, PoolError> {
        let (reserve_in, reserve_out, _) = self.orient(token_in)?;
        Ok(swap_output(amount_in, reserve_in, reserve_out, self.fee_bps))
    }

    /// Price a deposit against the current snapshot: ratio-matched usable
    /// amounts plus the resulting mint.
    pub fn quote_add_liquidity(&self, desired_a: U256, desired_b: U256) -> (U256, U256, LiquidityMint) {
        let s = self.snapshot();
        let (used_a, used_b) = optimal_deposit(desired_a, desired_b, s.reserve_a, s.reserve_b);
        let mint = liquidity_mint(used_a, used_b, s.reserve_a, s.reserve_b, s.lp_supply);
        (used_a, used_b, mint)
    }

    /// Price a redemption against the current snapshot.
    pub fn quote_remove_liquidity(&self, lp_amount: U256) -> LiquidityBurn {
        let s = self.snapshot();
        liquidity_burn(lp_amount, s.reserve_a, s.reserve_b, s.lp_supply)
    }

    /// Execute a swap: refresh, price, guard, submit, refresh.
    pub async fn execute_swap(
        &self,
        reader: &dyn LedgerReader,
        writer: &dyn LedgerWriter,
        request: &SwapRequest,
        deadline: Duration,
    ) -> Result<SwapExecution, PoolError> {
        if request.amount_in.is_zero() {
            return Err(PoolError::InvalidInput("swap amount must be positive".into()));
        }

        self.refresh(reader, deadline).await?;
        let (reserve_in, reserve_out, token_out) = self.orient(&request.token_in)?;
        let token_out = token_out.clone();

        let quote = swap_output(request.amount_in, reserve_in, reserve_out, self.fee_bps);
        if quote.amount_out.is_zero() {
            return Err(PoolError::InsufficientOutput);
        }
        if quote.amount_out < request.min_amount_out {
            return Err(PoolError::SlippageExceeded {
                computed: quote.amount_out,
                minimum: request.min_amount_out,
            });
        }

        let ops = vec![
            LedgerOp::Transfer {
                token: request.token_in.clone(),
                from: request.trader.clone(),
                to: self.pool_account.clone(),
                amount: request.amount_in,
            },
            LedgerOp::Transfer {
                token: token_out.address.clone(),
                from: self.pool_account.clone(),
                to: request.trader.clone(),
                amount: quote.amount_out,
            },
        ];

        let receipt = writer
            .submit(ops)
            .await
            .map_err(|e| PoolError::LedgerWriteFailed(e.to_string()))?;

        let new_reserves = self.refresh_after_write(reader, deadline).await;
        Ok(SwapExecution {
            receipt,
            quote,
            token_out,
            new_reserves,
        })
    }

    /// Execute a deposit: refresh, match ratio, guard both sides, submit.
    pub async fn execute_add_liquidity(
        &self,
        reader: &dyn LedgerReader,
        writer: &dyn LedgerWriter,
        request: &AddLiquidityRequest,
        deadline: Duration,
    ) -> Result<AddLiquidityExecution, PoolError> {
        if request.desired_a.is_zero() || request.desired_b.is_zero() {
            return Err(PoolError::InvalidInput(
                "both deposit amounts must be positive".into(),
            ));
        }

        let snapshot = self.refresh(reader, deadline).await?;
        let (used_a, used_b) =
            optimal_deposit(request.desired_a, request.desired_b, snapshot.reserve_a, snapshot.reserve_b);
        let mint = liquidity_mint(
            used_a,
            used_b,
            snapshot.reserve_a,
            snapshot.reserve_b,
            snapshot.lp_supply,
        );

        if mint.minted.is_zero() {
            return Err(PoolError::InsufficientLiquidityMinted);
        }
        if used_a < request.min_a {
            return Err(PoolError::SlippageExceeded {
                computed: used_a,
                minimum: request.min_a,
            });
        }
        if used_b < request.min_b {
            return Err(PoolError::SlippageExceeded {
                computed: used_b,
                minimum: request.min_b,
            });
        }

        let ops = vec![
            LedgerOp::Transfer {
                token: self.token_a.address.clone(),
                from: request.provider.clone(),
                to: self.pool_account.clone(),
                amount: used_a,
            },
            LedgerOp::Transfer {
                token: self.token_b.address.clone(),
                from: request.provider.clone(),
                to: self.pool_account.clone(),
                amount: used_b,
            },
            LedgerOp::Mint {
                token: self.lp_token.clone(),
                to: request.provider.clone(),
                amount: mint.minted,
            },
        ];

        let receipt = writer
            .submit(ops)
            .await
            .map_err(|e| PoolError::LedgerWriteFailed(e.to_string()))?;

        let new_reserves = self.refresh_after_write(reader, deadline).await;
        Ok(AddLiquidityExecution {
            receipt,
            used_a,
            used_b,
            mint,
            new_reserves,
        })
    }

    /// Execute a redemption: refresh, price the payout, guard, submit.
    pub async fn execute_remove_liquidity(
        &self,
        reader: &dyn LedgerReader,
        writer: &dyn LedgerWriter,
        request: &RemoveLiquidityRequest,
        deadline: Duration,
    ) -> Result<RemoveLiquidityExecution, PoolError> {
        if request.lp_amount.is_zero() {
            return Err(PoolError::InvalidInput("redeem amount must be positive".into()));
        }

        let snapshot = self.refresh(reader, deadline).await?;
        if request.lp_amount > snapshot.lp_supply {
            return Err(PoolError::InvalidInput(format!(
                "redeem amount {} exceeds LP supply {}",
                request.lp_amount, snapshot.lp_supply
            )));
        }

        let burn = liquidity_burn(
            request.lp_amount,
            snapshot.reserve_a,
            snapshot.reserve_b,
            snapshot.lp_supply,
        );
        if burn.amount_a.is_zero() && burn.amount_b.is_zero() {
            return Err(PoolError::InsufficientOutput);
        }
        if burn.amount_a < request.min_a {
            return Err(PoolError::SlippageExceeded {
                computed: burn.amount_a,
                minimum: request.min_a,
            });
        }
        if burn.amount_b < request.min_b {
            return Err(PoolError::SlippageExceeded {
                computed: burn.amount_b,
                minimum: request.min_b,
            });
        }

        let ops = vec![
            LedgerOp::Burn {
                token: self.lp_token.clone(),
                from: request.provider.clone(),
                amount: request.lp_amount,
            },
            LedgerOp::Transfer {
                token: self.token_a.address.clone(),
                from: self.pool_account.clone(),
                to: request.provider.clone(),
                amount: burn.amount_a,
            },
            LedgerOp::Transfer {
                token: self.token_b.address.clone(),
                from: self.pool_account.clone(),
                to: request.provider.clone(),
                amount: burn.amount_b,
            },
        ];

        let receipt = writer
            .submit(ops)
            .await
            .map_err(|e| PoolError::LedgerWriteFailed(e.to_string()))?;

        let new_reserves = self.refresh_after_write(reader, deadline).await;
        Ok(RemoveLiquidityExecution {
            receipt,
            burn,
            new_reserves,
        })
    }

    /// Post-submit refresh. The write already settled, so a failure here
    /// only means the snapshot is momentarily stale; it is logged and the
    /// pre-write snapshot is returned rather than failing the operation.
    async fn refresh_after_write(&self, reader: &dyn LedgerReader, deadline: Duration) -> (U256, U256) {
        match self.refresh(reader, deadline).await {
            Ok(s) => (s.reserve_a, s.reserve_b),
            Err(e) => {
                warn!(pair = %self.key, error = %e, "post-settlement refresh failed; snapshot stale");
                let s = self.snapshot();
                (s.reserve_a, s.reserve_b)
            }
        }
    }
}
