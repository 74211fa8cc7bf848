//! Pool and registry error taxonomy.
//!
//! Pricing shortfalls (`InsufficientOutput`, `InsufficientLiquidityMinted`,
//! `SlippageExceeded`) are expected outcomes of normal requests and are never
//! retried with the same inputs. I/O failures (`ReserveUnavailable`,
//! `LedgerWriteFailed`) are retryable at the caller's discretion; the core
//! itself never retries a write.

use basin_types::U256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    /// Malformed or non-positive request parameters; detected before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A pool was requested for a token against itself.
    #[error("identical tokens: a pool requires two distinct tokens")]
    IdenticalTokens,

    /// No pool registered for the pair.
    #[error("pool not found for pair {0}")]
    PoolNotFound(String),

    /// Creation raced or repeated for an already-registered pair.
    #[error("pool already exists for pair {0}")]
    PoolAlreadyExists(String),

    /// The ledger could not be read in time for a mutating operation.
    /// Nothing was submitted; the caller may retry.
    #[error("reserves unavailable: {0}")]
    ReserveUnavailable(String),

    /// The computed output is zero; the request is too small for the pool.
    #[error("computed output is zero: amount too small for current reserves")]
    InsufficientOutput,

    /// The computed LP mint is zero; the deposit is too small.
    #[error("computed liquidity mint is zero: deposit too small")]
    InsufficientLiquidityMinted,

    /// The computed result violates the caller's declared minimum. Raised
    /// before any ledger operation is attempted.
    #[error("slippage exceeded: computed {computed} below minimum {minimum}")]
    SlippageExceeded { computed: U256, minimum: U256 },

    /// The write collaborator rejected or failed the submission; the reason
    /// is passed through verbatim and never interpreted here.
    #[error("ledger write failed: {0}")]
    LedgerWriteFailed(String),

    /// Registry persistence failure.
    #[error("registry store error: {0}")]
    Store(#[from] crate::persistence::StoreError),
}
