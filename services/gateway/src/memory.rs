//! In-process ledger emulator.
//!
//! Backs dev-mode runs and integration tests with a ledger that applies
//! operation lists atomically against in-memory balances. Submissions are
//! serialized by a single lock, mirroring how a real ledger's consensus
//! orders competing transactions against one pool.

use async_trait::async_trait;
use basin_pools::{LedgerError, LedgerReader, LedgerWriter, TokenMetadata};
use basin_types::{Address, LedgerOp, WriteReceipt, U256};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct MemoryLedger {
    /// (token, holder) -> balance.
    balances: DashMap<(Address, Address), U256>,
    /// token -> circulating supply (tracked for mint/burn tokens).
    supplies: DashMap<Address, U256>,
    metadata: DashMap<Address, TokenMetadata>,
    /// pool account -> token pair, in the pool's canonical order.
    pools: DashMap<Address, (Address, Address)>,
    submit_lock: Mutex<()>,
    tx_counter: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_token(&self, token: impl Into<String>, decimals: u8, symbol: &str) -> Address {
        let address = Address::new(token);
        self.metadata.insert(
            address.clone(),
            TokenMetadata {
                decimals,
                symbol: symbol.to_string(),
            },
        );
        address
    }

    /// Teach the emulator which token pair a pool account holds, so
    /// `get_reserves` can answer for it.
    pub fn register_pool(&self, pool_account: &Address, token_a: &Address, token_b: &Address) {
        self.pools.insert(
            pool_account.clone(),
            (token_a.clone(), token_b.clone()),
        );
    }

    pub fn set_balance(&self, token: &Address, holder: &Address, amount: U256) {
        self.balances
            .insert((token.clone(), holder.clone()), amount);
    }

    pub fn balance(&self, token: &Address, holder: &Address) -> U256 {
        self.balances
            .get(&(token.clone(), holder.clone()))
            .map(|b| *b)
            .unwrap_or_default()
    }

}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn get_reserves(&self, pool: &Address) -> Result<(U256, U256), LedgerError> {
        let pair = self
            .pools
            .get(pool)
            .map(|p| p.clone())
            .ok_or_else(|| LedgerError::Unavailable(format!("unknown pool account {pool}")))?;
        Ok((self.balance(&pair.0, pool), self.balance(&pair.1, pool)))
    }

    async fn get_token_balance(
        &self,
        holder: &Address,
        token: &Address,
    ) -> Result<U256, LedgerError> {
        Ok(self.balance(token, holder))
    }

    async fn get_total_supply(&self, token: &Address) -> Result<U256, LedgerError> {
        Ok(self
            .supplies
            .get(token)
            .map(|s| *s)
            .unwrap_or_default())
    }

    async fn get_token_metadata(&self, token: &Address) -> Result<TokenMetadata, LedgerError> {
        self.metadata
            .get(token)
            .map(|m| m.clone())
            .ok_or_else(|| LedgerError::Rejected(format!("unknown token {token}")))
    }
}

#[async_trait]
impl LedgerWriter for MemoryLedger {
    /// Applies the whole list or none of it: a first pass proves every
    /// debit is funded before anything mutates.
    async fn submit(&self, ops: Vec<LedgerOp>) -> Result<WriteReceipt, LedgerError> {
        let _serialized = self.submit_lock.lock();

        // Feasibility pass over a scratch view of the touched balances.
        let mut scratch: std::collections::HashMap<(Address, Address), U256> =
            std::collections::HashMap::new();
        for op in &ops {
            match op {
                LedgerOp::Transfer {
                    token, from, to, amount,
                } => {
                    let from_key = (token.clone(), from.clone());
                    let available = *scratch
                        .entry(from_key.clone())
                        .or_insert_with(|| self.balance(token, from));
                    if available < *amount {
                        return Err(LedgerError::Rejected(format!(
                            "insufficient balance: {from} holds {available} of {token}, needs {amount}"
                        )));
                    }
                    *scratch.get_mut(&from_key).unwrap() -= *amount;
                    *scratch
                        .entry((token.clone(), to.clone()))
                        .or_insert_with(|| self.balance(token, to)) += *amount;
                }
                LedgerOp::Mint { token, to, amount } => {
                    *scratch
                        .entry((token.clone(), to.clone()))
                        .or_insert_with(|| self.balance(token, to)) += *amount;
                }
                LedgerOp::Burn { token, from, amount } => {
                    let from_key = (token.clone(), from.clone());
                    let available = *scratch
                        .entry(from_key.clone())
                        .or_insert_with(|| self.balance(token, from));
                    if available < *amount {
                        return Err(LedgerError::Rejected(format!(
                            "insufficient balance to burn: {from} holds {available} of {token}"
                        )));
                    }
                    *scratch.get_mut(&from_key).unwrap() -= *amount;
                }
            }
        }

        // Apply pass: the scratch view already holds every touched balance's
        // final value, so writing it back cannot fail.
        for (key, balance) in scratch {
            self.balances.insert(key, balance);
        }
        for op in &ops {
            match op {
                LedgerOp::Transfer { .. } => {}
                LedgerOp::Mint { token, amount, .. } => {
                    *self
                        .supplies
                        .entry(token.clone())
                        .or_insert_with(U256::zero) += *amount;
                }
                LedgerOp::Burn { token, amount, .. } => {
                    // Balances seeded through `set_balance` have no tracked
                    // supply, so the decrement clamps at zero.
                    let mut supply = self.supplies.entry(token.clone()).or_insert_with(U256::zero);
                    *supply = supply.saturating_sub(*amount);
                }
            }
        }

        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(WriteReceipt {
            tx_id: format!("memtx-{n}"),
        })
    }
}
