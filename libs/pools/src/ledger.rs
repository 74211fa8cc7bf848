//! Capability interfaces for the external ledger.
//!
//! One explicit trait per concern, implemented once per target ledger (an
//! EVM RPC client, a Keeta account client, a test mock). Callers depend on
//! these interfaces and never reach into a concrete client for whichever
//! method happens to exist.

use async_trait::async_trait;
use basin_types::{Address, LedgerOp, WriteReceipt, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger could not be reached or did not answer in time.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger answered with a failure; the reason is ledger-specific and
    /// passed through without interpretation.
    #[error("ledger rejected request: {0}")]
    Rejected(String),
}

/// Token metadata as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub decimals: u8,
    pub symbol: String,
}

/// Read-only ledger access.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Current reserves of a pool, in the pool's canonical token order.
    async fn get_reserves(&self, pool: &Address) -> Result<(U256, U256), LedgerError>;

    /// `holder`'s balance of `token`.
    async fn get_token_balance(&self, holder: &Address, token: &Address)
        -> Result<U256, LedgerError>;

    /// Circulating supply of `token` (used for LP tokens).
    async fn get_total_supply(&self, token: &Address) -> Result<U256, LedgerError>;

    /// Decimals and symbol for `token`.
    async fn get_token_metadata(&self, token: &Address) -> Result<TokenMetadata, LedgerError>;
}

/// Write access: submits an ordered list of elementary operations.
///
/// The submission either lands atomically with a receipt or fails with a
/// reason. Retry policy belongs to the caller; this crate never resubmits.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn submit(&self, ops: Vec<LedgerOp>) -> Result<WriteReceipt, LedgerError>;
}
