//! # Basin Venue Quote Aggregator
//!
//! ## Purpose
//!
//! Queries the local AMM and any number of external quote sources
//! concurrently for one trade, normalizes their answers to a common shape,
//! and deterministically selects the best output after deducting the
//! protocol fee from the input once, upstream of every venue.
//!
//! ## Selection Semantics
//!
//! - All venues are asked in parallel; each request is independently
//!   timeout-bounded. A venue that fails, times out, or quotes zero is
//!   filtered out, never fatal.
//! - The strictly largest `amount_out` wins. Ties keep the earliest venue in
//!   the configured priority order (local AMM first), so repeated runs over
//!   the same answers pick the same winner.
//! - If no venue produced a usable quote the caller receives the "no venue"
//!   sentinel with `amount_out = 0` rather than an error.

pub mod local;
pub mod venue;

pub use local::AmmVenue;
pub use venue::{QuoteHints, QuoteVenue, VenueError};

use basin_amm::protocol_fee;
use basin_types::{AggregatedQuote, Token, VenueQuote, U256};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Deterministic multi-venue quote selector.
///
/// Venue order is priority order: the local AMM venue is expected first.
pub struct QuoteAggregator {
    venues: Vec<Arc<dyn QuoteVenue>>,
    fee_bps: u16,
    venue_timeout: Duration,
}

impl QuoteAggregator {
    pub fn new(venues: Vec<Arc<dyn QuoteVenue>>, fee_bps: u16, venue_timeout: Duration) -> Self {
        Self {
            venues,
            fee_bps,
            venue_timeout,
        }
    }

    /// Best quote across all venues for an exact-input trade.
    ///
    /// The protocol fee comes off `amount_in` exactly once, before any venue
    /// sees the trade; the winning quote carries that fee regardless of
    /// which venue won.
    pub async fn best_quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: U256,
        hints: &QuoteHints,
    ) -> AggregatedQuote {
        let (net_in, fee_taken) = protocol_fee(amount_in, self.fee_bps);
        if net_in.is_zero() {
            return AggregatedQuote::no_venue(fee_taken);
        }

        let requests = self.venues.iter().map(|venue| {
            let venue = Arc::clone(venue);
            async move {
                let id = venue.id().to_string();
                let outcome =
                    tokio::time::timeout(self.venue_timeout, venue.quote(token_in, token_out, net_in, hints))
                        .await
                        .map_err(|_| VenueError::Timeout)
                        .and_then(|r| r);
                (id, outcome)
            }
        });

        // join_all preserves venue order, which is the tie-break order.
        let mut gathered = Vec::new();
        for (id, outcome) in join_all(requests).await {
            match outcome {
                Ok(quote) if quote.is_usable() => gathered.push(quote),
                Ok(_) => debug!(venue = %id, "venue returned an empty quote"),
                // Partial venue failure: diagnostic only, never fatal.
                Err(e) => warn!(venue = %id, error = %e, "venue quote failed"),
            }
        }

        let best = gathered
            .iter()
            .max_by(|a, b| match a.amount_out.cmp(&b.amount_out) {
                // max_by keeps the later of equal elements; treat the later
                // one as smaller so the earliest (highest-priority) wins.
                std::cmp::Ordering::Equal => std::cmp::Ordering::Greater,
                other => other,
            })
            .cloned();

        match best {
            Some(mut winner) => {
                winner.fee_taken = fee_taken;
                debug!(venue = %winner.venue_id, amount_out = %winner.amount_out,
                    candidates = gathered.len(), "best quote selected");
                AggregatedQuote {
                    best: winner,
                    venue_raw: gathered,
                }
            }
            None => {
                debug!("no venue produced a usable quote");
                let mut aggregated = AggregatedQuote::no_venue(fee_taken);
                aggregated.venue_raw = gathered;
                aggregated
            }
        }
    }
}
