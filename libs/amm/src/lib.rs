//! # Basin AMM Library - Exact Constant-Product Mathematics
//!
//! ## Purpose
//!
//! Pure pricing engine for Basin's constant-product pools. Computes swap
//! outputs, liquidity mint/burn amounts, optimal two-sided deposits, and
//! price impact from reserves and fee parameters with exact 256-bit integer
//! arithmetic. Every division floors, so the pool never pays out a unit more
//! than the invariant allows.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve snapshots from pool state, trade parameters from the gateway
//! - **Output Destinations**: Pool execution paths, venue quote aggregator
//! - **Precision**: Native token precision preserved end to end; intermediate
//!   products widen to 512 bits so no valid input can overflow
//! - **Purity**: No I/O, no shared state; safe from any number of concurrent callers
//!
//! ## Failure Semantics
//!
//! Pricing functions do not return errors for in-range inputs. Degenerate
//! requests (zero amounts, empty reserves) produce all-zero results; callers
//! translate a zero result into their own insufficient-output policy. The
//! only `Decimal` values produced (price impact, pool share) are display
//! ratios, never inputs to integer math.

pub mod fee;
pub mod liquidity;
mod math;
pub mod swap;

pub use fee::protocol_fee;
pub use liquidity::{liquidity_burn, liquidity_mint, optimal_deposit, LiquidityBurn, LiquidityMint};
pub use swap::{swap_input, swap_output, SwapOutput};

pub use ethereum_types::{U256, U512};
pub use rust_decimal::Decimal;

/// Fee and slippage parameters are expressed in basis points of this.
pub const BPS_DENOMINATOR: u64 = 10_000;
