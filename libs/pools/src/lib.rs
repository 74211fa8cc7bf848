//! # Basin Pool State and Registry
//!
//! ## Purpose
//!
//! Mutable liquidity-pool state for Basin's constant-product venues: per-pool
//! reserve snapshots refreshed from the external ledger, quote and execute
//! operations for swaps and liquidity actions, and a registry that resolves
//! token pairs to pools, creates pools on demand, and aggregates a holder's
//! LP positions across every pool.
//!
//! ## Integration Points
//!
//! - **Input Sources**: reserve and balance reads via [`LedgerReader`],
//!   registry records via [`RegistryStore`]
//! - **Output Destinations**: ordered [`basin_types::LedgerOp`] lists handed
//!   to a [`LedgerWriter`]; quotes priced by `basin-amm`
//! - **Consistency Model**: optimistic. A mutating operation runs
//!   refresh -> compute -> guard -> submit -> refresh as a unit for its
//!   caller, but the crate takes no cross-operation lock; concurrent writers
//!   against one pool are serialized by the ledger itself, and the loser's
//!   slippage guard is the backstop against stale pricing. Integrators who
//!   need stronger guarantees must serialize upstream of this crate.

pub mod error;
pub mod ledger;
pub mod persistence;
pub mod pool;
pub mod registry;

pub use error::PoolError;
pub use ledger::{LedgerError, LedgerReader, LedgerWriter, TokenMetadata};
pub use persistence::{InMemoryStore, PoolRecord, RegistryStore, StoreError, POOL_RECORD_VERSION};
pub use pool::{
    AddLiquidityExecution, AddLiquidityRequest, Pool, PoolSnapshot, RemoveLiquidityExecution,
    RemoveLiquidityRequest, SwapExecution, SwapRequest,
};
pub use registry::{LpPosition, PoolRegistry};
