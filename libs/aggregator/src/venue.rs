//! The venue capability interface.

use async_trait::async_trait;
use basin_types::{Token, VenueQuote, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VenueError {
    /// The venue answered with an error or returned an unusable payload.
    #[error("venue request failed: {0}")]
    Failed(String),

    /// The venue did not answer within the aggregator's per-venue timeout.
    #[error("venue request timed out")]
    Timeout,
}

/// Request hints forwarded to venues that can use them.
#[derive(Debug, Clone, Default)]
pub struct QuoteHints {
    /// Gas price hint for venues that model execution cost, smallest units.
    pub gas_price: Option<U256>,
}

/// One source of pricing for a trade: the local AMM or an external provider.
///
/// Implementations normalize their native response into a [`VenueQuote`] and
/// keep the raw payload on it for diagnostics. The amount they receive is
/// already net of the protocol fee.
#[async_trait]
pub trait QuoteVenue: Send + Sync {
    /// Stable identifier used in logs, tie-breaking, and quote attribution.
    fn id(&self) -> &str;

    async fn quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: U256,
        hints: &QuoteHints,
    ) -> Result<VenueQuote, VenueError>;
}
