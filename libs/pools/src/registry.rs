//! Pool registry: pair-keyed pool collection with persistence and
//! cross-pool position aggregation.

use crate::error::PoolError;
use crate::ledger::LedgerReader;
use crate::persistence::{PoolRecord, RegistryStore, POOL_RECORD_VERSION};
use crate::pool::Pool;
use basin_types::{Address, PairKey, Token, U256};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A holder's stake in one pool, computed read-through from the ledger.
///
/// LP balances are owned by the ledger; nothing here is cached between
/// calls. Entitlements are the floored proportional claim on each reserve.
#[derive(Debug, Clone)]
pub struct LpPosition {
    pub pair_key: PairKey,
    pub token_a: Token,
    pub token_b: Token,
    pub lp_token: Address,
    pub lp_balance: U256,
    /// Display-only share of the pool, in `[0, 1]`.
    pub share: Decimal,
    pub entitlement_a: U256,
    pub entitlement_b: U256,
}

/// Keyed collection of pools, backed by a [`RegistryStore`].
///
/// The in-memory map is a cache over the store, rebuilt at construction.
/// Creation is idempotent with respect to the pair key: of two concurrent
/// creators, exactly one wins and the other observes `PoolAlreadyExists`.
pub struct PoolRegistry {
    pools: DashMap<PairKey, Arc<Pool>>,
    store: Arc<dyn RegistryStore>,
    default_fee_bps: u16,
}

impl PoolRegistry {
    /// Rebuild the registry from the persistence collaborator.
    ///
    /// Records with an unsupported schema version are skipped with a
    /// warning rather than failing the whole rebuild.
    pub async fn load(
        store: Arc<dyn RegistryStore>,
        default_fee_bps: u16,
    ) -> Result<Self, PoolError> {
        let records = store.load_all().await?;
        let pools = DashMap::new();
        for record in &records {
            if let Err(e) = record.validate() {
                warn!(pair = %record.pair_key, error = %e, "skipping unreadable pool record");
                continue;
            }
            pools.insert(record.pair_key.clone(), Arc::new(Pool::from_record(record)));
        }
        info!(pool_count = pools.len(), "pool registry rebuilt from store");
        Ok(Self {
            pools,
            store,
            default_fee_bps,
        })
    }

    /// Look up the pool for a token pair, order-independent.
    pub fn resolve(&self, a: &Address, b: &Address) -> Result<Arc<Pool>, PoolError> {
        let key = PairKey::new(a.clone(), b.clone()).ok_or(PoolError::IdenticalTokens)?;
        self.pools
            .get(&key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| PoolError::PoolNotFound(key.to_string()))
    }

    /// All registered pools, including not-yet-funded ones.
    pub fn list_pools(&self) -> Vec<Arc<Pool>> {
        self.pools
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Register a new pool for the pair and persist its record.
    ///
    /// The pool account and LP token identifiers are derived from the pair
    /// key, so every creator computes the same ones. The pool is not
    /// tradable until its first liquidity deposit lands.
    pub async fn create_pool(
        &self,
        token_a: Token,
        token_b: Token,
        creator: &Address,
    ) -> Result<Arc<Pool>, PoolError> {
        let key = PairKey::new(token_a.address.clone(), token_b.address.clone())
            .ok_or(PoolError::IdenticalTokens)?;

        // Canonical order may flip the supplied tokens.
        let (first, second) = key.get();
        let (token_a, token_b) = if &token_a.address == first {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        debug_assert_eq!((&token_a.address, &token_b.address), (first, second));

        let record = PoolRecord {
            version: POOL_RECORD_VERSION,
            pair_key: key.clone(),
            pool_account: Address::new(format!("pool:{key}")),
            lp_token: Address::new(format!("lp:{key}")),
            token_a,
            token_b,
            fee_bps: self.default_fee_bps,
            creator: creator.clone(),
        };

        // Reserve the key first so concurrent creators race on the map, not
        // on the store; the loser fails cleanly with PoolAlreadyExists.
        let pool = Arc::new(Pool::from_record(&record));
        match self.pools.entry(key.clone()) {
            Entry::Occupied(_) => return Err(PoolError::PoolAlreadyExists(key.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&pool));
            }
        }

        if let Err(e) = self.store.save(&record).await {
            // Roll the cache back so a later attempt can retry cleanly.
            self.pools.remove(&key);
            return Err(PoolError::Store(e));
        }

        info!(pair = %key, creator = %creator, "pool created");
        Ok(pool)
    }

    /// A holder's positions across every registered pool.
    ///
    /// O(pools) scatter-gather: balance lookups and reserve refreshes run
    /// concurrently, and a failure for one pool skips that pool with a log
    /// line instead of aborting the listing.
    pub async fn positions_for(
        &self,
        holder: &Address,
        ledger: &dyn LedgerReader,
        deadline: Duration,
    ) -> Vec<LpPosition> {
        let lookups = self.list_pools().into_iter().map(|pool| async move {
            let balance = tokio::time::timeout(
                deadline,
                ledger.get_token_balance(holder, pool.lp_token()),
            )
            .await
            .map_err(|_| PoolError::ReserveUnavailable("balance lookup timed out".into()))
            .and_then(|r| r.map_err(|e| PoolError::ReserveUnavailable(e.to_string())));

            let balance = match balance {
                Ok(b) => b,
                Err(e) => {
                    warn!(pair = %pool.pair_key(), error = %e,
                        "skipping pool in position listing");
                    return None;
                }
            };
            if balance.is_zero() {
                return None;
            }

            // Entitlements need fresh reserves and supply.
            if let Err(e) = pool.refresh(ledger, deadline).await {
                warn!(pair = %pool.pair_key(), error = %e,
                    "skipping pool in position listing");
                return None;
            }

            let snapshot = pool.snapshot();
            let burn = basin_amm::liquidity_burn(
                balance,
                snapshot.reserve_a,
                snapshot.reserve_b,
                snapshot.lp_supply,
            );
            Some(LpPosition {
                pair_key: pool.pair_key().clone(),
                token_a: pool.token_a().clone(),
                token_b: pool.token_b().clone(),
                lp_token: pool.lp_token().clone(),
                lp_balance: balance,
                share: burn.share,
                entitlement_a: burn.amount_a,
                entitlement_b: burn.amount_b,
            })
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerError, TokenMetadata};
    use crate::persistence::InMemoryStore;
    use async_trait::async_trait;

    fn usdx() -> Token {
        Token::new("keeta:tok_usdx", 6, "USDX")
    }

    fn wave() -> Token {
        Token::new("keeta:tok_wave", 9, "WAVE")
    }

    async fn fresh_registry() -> PoolRegistry {
        PoolRegistry::load(Arc::new(InMemoryStore::new()), 30)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_resolve_in_either_order() {
        let registry = fresh_registry().await;
        let creator = Address::from("acct:alice");
        registry.create_pool(usdx(), wave(), &creator).await.unwrap();

        let forward = registry.resolve(&usdx().address, &wave().address).unwrap();
        let backward = registry.resolve(&wave().address, &usdx().address).unwrap();
        assert_eq!(forward.pair_key(), backward.pair_key());
        assert_eq!(forward.fee_bps(), 30);
    }

    #[tokio::test]
    async fn duplicate_creation_fails_cleanly() {
        let registry = fresh_registry().await;
        let creator = Address::from("acct:alice");
        registry.create_pool(usdx(), wave(), &creator).await.unwrap();

        // Same pair in flipped order is still a duplicate.
        let second = registry.create_pool(wave(), usdx(), &creator).await;
        assert!(matches!(second, Err(PoolError::PoolAlreadyExists(_))));
        assert_eq!(registry.list_pools().len(), 1);
    }

    #[tokio::test]
    async fn identical_tokens_rejected_before_io() {
        let registry = fresh_registry().await;
        let result = registry
            .create_pool(usdx(), usdx(), &Address::from("acct:alice"))
            .await;
        assert!(matches!(result, Err(PoolError::IdenticalTokens)));
        assert!(matches!(
            registry.resolve(&usdx().address, &usdx().address),
            Err(PoolError::IdenticalTokens)
        ));
    }

    #[tokio::test]
    async fn registry_rebuilds_from_store() {
        let store = Arc::new(InMemoryStore::new());
        {
            let registry = PoolRegistry::load(Arc::clone(&store) as Arc<dyn RegistryStore>, 30)
                .await
                .unwrap();
            registry
                .create_pool(usdx(), wave(), &Address::from("acct:alice"))
                .await
                .unwrap();
        }

        let reloaded = PoolRegistry::load(store, 30).await.unwrap();
        assert_eq!(reloaded.list_pools().len(), 1);
        assert!(reloaded.resolve(&usdx().address, &wave().address).is_ok());
    }

    /// Reader whose balance lookups fail for one specific LP token.
    struct FlakyLedger {
        broken_lp: Address,
    }

    #[async_trait]
    impl LedgerReader for FlakyLedger {
        async fn get_reserves(&self, _pool: &Address) -> Result<(U256, U256), LedgerError> {
            Ok((U256::from(1000), U256::from(2000)))
        }

        async fn get_token_balance(
            &self,
            _holder: &Address,
            token: &Address,
        ) -> Result<U256, LedgerError> {
            if token == &self.broken_lp {
                return Err(LedgerError::Unavailable("flaky".into()));
            }
            Ok(U256::from(100))
        }

        async fn get_total_supply(&self, _token: &Address) -> Result<U256, LedgerError> {
            Ok(U256::from(1000))
        }

        async fn get_token_metadata(&self, _token: &Address) -> Result<TokenMetadata, LedgerError> {
            Ok(TokenMetadata {
                decimals: 6,
                symbol: "FLAKY".into(),
            })
        }
    }

    #[tokio::test]
    async fn position_listing_skips_failing_pools() {
        let registry = fresh_registry().await;
        let creator = Address::from("acct:alice");
        let third = Token::new("keeta:tok_gale", 6, "GALE");
        registry.create_pool(usdx(), wave(), &creator).await.unwrap();
        let broken = registry.create_pool(usdx(), third, &creator).await.unwrap();

        let ledger = FlakyLedger {
            broken_lp: broken.lp_token().clone(),
        };
        let positions = registry
            .positions_for(&creator, &ledger, Duration::from_millis(100))
            .await;

        // One pool fails its balance lookup and is skipped, not fatal.
        assert_eq!(positions.len(), 1);
        let position = &positions[0];
        assert_eq!(position.lp_balance, U256::from(100));
        // 100 of 1000 LP against (1000, 2000) reserves.
        assert_eq!(position.entitlement_a, U256::from(100));
        assert_eq!(position.entitlement_b, U256::from(200));
    }
}
