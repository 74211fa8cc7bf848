//! # Basin Gateway - Front-End Query Surface
//!
//! ## Purpose
//!
//! The logical operation surface consumed by front ends: pool listing and
//! creation, swap quoting and execution, liquidity management, and position
//! aggregation. Requests carry human-decimal amounts; every response
//! quantity is returned in both raw-integer and human-decimal form so
//! clients never re-derive a conversion.
//!
//! ## Integration Points
//!
//! - **Input Sources**: typed requests from whatever transport embeds this
//!   crate (the wire format is the embedder's concern)
//! - **Output Destinations**: the pool registry and aggregator, and through
//!   them the ledger collaborators
//! - **Lifecycle**: the process entry point constructs one [`Gateway`] with
//!   its registry and collaborators and reuses it for every request; nothing
//!   here holds module-level singletons

pub mod api;
pub mod gateway;
pub mod memory;

pub use api::*;
pub use gateway::{Gateway, GatewayError};
pub use memory::MemoryLedger;
