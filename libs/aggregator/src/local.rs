//! The local AMM as a quote venue.

use crate::venue::{QuoteHints, QuoteVenue, VenueError};
use async_trait::async_trait;
use basin_pools::{LedgerReader, PoolRegistry};
use basin_types::{Token, VenueQuote, U256};
use std::sync::Arc;
use std::time::Duration;

pub const LOCAL_VENUE_ID: &str = "basin-amm";

/// Adapter exposing the pool registry's direct-pair pools as a venue.
///
/// Direct-pair lookup only; there is no multi-hop routing. A missing pool is
/// a failed quote for this venue, not an aggregation error.
pub struct AmmVenue {
    registry: Arc<PoolRegistry>,
    ledger: Arc<dyn LedgerReader>,
    refresh_deadline: Duration,
}

impl AmmVenue {
    pub fn new(
        registry: Arc<PoolRegistry>,
        ledger: Arc<dyn LedgerReader>,
        refresh_deadline: Duration,
    ) -> Self {
        Self {
            registry,
            ledger,
            refresh_deadline,
        }
    }
}

#[async_trait]
impl QuoteVenue for AmmVenue {
    fn id(&self) -> &str {
        LOCAL_VENUE_ID
    }

    async fn quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_in: U256,
        _hints: &QuoteHints,
    ) -> Result<VenueQuote, VenueError> {
        let pool = self
            .registry
            .resolve(&token_in.address, &token_out.address)
            .map_err(|e| VenueError::Failed(e.to_string()))?;

        pool.refresh(self.ledger.as_ref(), self.refresh_deadline)
            .await
            .map_err(|e| VenueError::Failed(e.to_string()))?;

        let quote = pool
            .quote_swap(&token_in.address, amount_in)
            .map_err(|e| VenueError::Failed(e.to_string()))?;

        Ok(VenueQuote {
            venue_id: LOCAL_VENUE_ID.to_string(),
            amount_out: quote.amount_out,
            fee_taken: U256::zero(),
            raw: serde_json::json!({
                "pair": pool.pair_key().to_string(),
                "pool_fee_bps": pool.fee_bps(),
                "pool_fee_paid": quote.fee_paid.to_string(),
                "price_impact": quote.price_impact.to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basin_pools::{InMemoryStore, LedgerError, TokenMetadata};
    use basin_types::Address;
    use parking_lot::Mutex;

    struct FixedReserves {
        reserves: Mutex<(U256, U256)>,
    }

    #[async_trait]
    impl LedgerReader for FixedReserves {
        async fn get_reserves(&self, _pool: &Address) -> Result<(U256, U256), LedgerError> {
            Ok(*self.reserves.lock())
        }
        async fn get_token_balance(
            &self,
            _holder: &Address,
            _token: &Address,
        ) -> Result<U256, LedgerError> {
            Ok(U256::zero())
        }
        async fn get_total_supply(&self, _token: &Address) -> Result<U256, LedgerError> {
            Ok(U256::from(1000))
        }
        async fn get_token_metadata(&self, _token: &Address) -> Result<TokenMetadata, LedgerError> {
            Err(LedgerError::Unavailable("not needed".into()))
        }
    }

    #[tokio::test]
    async fn quotes_through_the_registry() {
        let registry = Arc::new(
            PoolRegistry::load(Arc::new(InMemoryStore::new()), 30)
                .await
                .unwrap(),
        );
        let token_a = Token::new("0xaaa", 18, "AAA");
        let token_b = Token::new("0xbbb", 18, "BBB");
        registry
            .create_pool(token_a.clone(), token_b.clone(), &Address::from("0xcafe"))
            .await
            .unwrap();

        let ledger = Arc::new(FixedReserves {
            reserves: Mutex::new((U256::from(1000), U256::from(1000))),
        });
        let venue = AmmVenue::new(registry, ledger, Duration::from_millis(100));

        let quote = venue
            .quote(&token_a, &token_b, U256::from(100), &QuoteHints::default())
            .await
            .unwrap();
        assert_eq!(quote.amount_out, U256::from(90));
        assert_eq!(quote.venue_id, LOCAL_VENUE_ID);
    }

    #[tokio::test]
    async fn missing_pool_is_a_failed_quote() {
        let registry = Arc::new(
            PoolRegistry::load(Arc::new(InMemoryStore::new()), 30)
                .await
                .unwrap(),
        );
        let ledger = Arc::new(FixedReserves {
            reserves: Mutex::new((U256::zero(), U256::zero())),
        });
        let venue = AmmVenue::new(registry, ledger, Duration::from_millis(100));

        let result = venue
            .quote(
                &Token::new("0xaaa", 18, "AAA"),
                &Token::new("0xbbb", 18, "BBB"),
                U256::from(100),
                &QuoteHints::default(),
            )
            .await;
        assert!(matches!(result, Err(VenueError::Failed(_))));
    }
}
