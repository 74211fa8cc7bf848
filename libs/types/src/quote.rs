//! Per-venue and aggregated quote shapes.
//!
//! `VenueQuote` is the normalized result of asking one liquidity venue for a
//! price; `AggregatedQuote` is the winner chosen across venues, carrying the
//! full venue list for audit. Both are ephemeral request-scoped values and
//! are never persisted.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};

/// A single venue's normalized answer to a quote request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueQuote {
    /// Stable venue identifier (e.g. "basin-amm", "openocean").
    pub venue_id: String,
    /// Gross output amount the venue promises for the net input.
    pub amount_out: U256,
    /// Protocol fee deducted upstream of this venue, in input-token units.
    pub fee_taken: U256,
    /// Venue-specific response payload, kept verbatim for diagnostics.
    pub raw: serde_json::Value,
}

impl VenueQuote {
    /// Sentinel returned when no venue produced a usable quote.
    pub fn none() -> Self {
        Self {
            venue_id: "none".to_string(),
            amount_out: U256::zero(),
            fee_taken: U256::zero(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.amount_out > U256::zero()
    }
}

/// The best quote selected for one request, with every venue's answer
/// retained for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedQuote {
    /// Winning quote (or the no-venue sentinel).
    pub best: VenueQuote,
    /// All venue answers gathered for this request, winners and losers alike.
    pub venue_raw: Vec<VenueQuote>,
}

impl AggregatedQuote {
    pub fn no_venue(fee_taken: U256) -> Self {
        let mut best = VenueQuote::none();
        best.fee_taken = fee_taken;
        Self {
            best,
            venue_raw: Vec::new(),
        }
    }
}
