//! # Basin Domain Types
//!
//! Shared vocabulary for the Basin pricing/accounting core: token identities,
//! canonical pair keys, venue quotes, and the elementary ledger operations
//! that mutating pool actions compile down to.
//!
//! ## Precision Rules
//!
//! All on-ledger amounts are unsigned 256-bit integers in the token's native
//! smallest unit (wei-style). Floating point never enters amount math; the
//! only `Decimal` values in this crate are display-oriented ratios (pool
//! share, price impact) that are never fed back into integer computations.

pub mod ledger;
pub mod pair;
pub mod quote;
pub mod token;

pub use ledger::{LedgerOp, WriteReceipt};
pub use pair::PairKey;
pub use quote::{AggregatedQuote, VenueQuote};
pub use token::{Address, Token};

/// 256-bit unsigned amount in a token's smallest unit.
pub use ethereum_types::U256;
/// Double-width intermediate for overflow-free products.
pub use ethereum_types::U512;

/// Basis-point denominator shared by fee and slippage parameters.
pub const BPS_DENOMINATOR: u64 = 10_000;
