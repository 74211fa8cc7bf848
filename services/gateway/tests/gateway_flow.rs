//! End-to-end gateway flow over the in-process ledger emulator:
//! create a pool, seed liquidity, quote, swap, inspect positions, redeem.

use basin_config::BasinConfig;
use basin_gateway::{
    CreatePoolRequest, Gateway, GatewayError, LiquidityAddRequest, LiquidityRemoveRequest,
    MemoryLedger, SwapExecuteRequest, SwapQuoteRequest,
};
use basin_aggregator::{AmmVenue, QuoteAggregator, QuoteVenue};
use basin_pools::{InMemoryStore, LedgerReader, LedgerWriter, PoolError, PoolRegistry, RegistryStore};
use basin_types::{Address, U256};
use std::sync::Arc;

const ALICE: &str = "acct:alice";
const USDX: &str = "keeta:tok_usdx";
const WAVE: &str = "keeta:tok_wave";

struct Harness {
    gateway: Gateway,
    ledger: Arc<MemoryLedger>,
    registry: Arc<PoolRegistry>,
}

impl Harness {
    async fn new() -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.register_token(USDX, 6, "USDX");
        ledger.register_token(WAVE, 6, "WAVE");
        ledger.set_balance(&Address::from(USDX), &Address::from(ALICE), U256::from(1_000_000_000u64));
        ledger.set_balance(&Address::from(WAVE), &Address::from(ALICE), U256::from(1_000_000_000u64));

        let config = BasinConfig::default(); // 30 bps fee, 50 bps slippage
        let store: Arc<dyn RegistryStore> = Arc::new(InMemoryStore::new());
        let registry = Arc::new(
            PoolRegistry::load(store, config.default_fee_bps).await.unwrap(),
        );

        let reader: Arc<dyn LedgerReader> = ledger.clone();
        let writer: Arc<dyn LedgerWriter> = ledger.clone();
        let venues: Vec<Arc<dyn QuoteVenue>> = vec![Arc::new(AmmVenue::new(
            Arc::clone(&registry),
            Arc::clone(&reader),
            config.io_timeout(),
        ))];
        let aggregator = QuoteAggregator::new(venues, config.default_fee_bps, config.io_timeout());

        Self {
            gateway: Gateway::new(config, Arc::clone(&registry), reader, writer, aggregator),
            ledger,
            registry,
        }
    }

    /// Create the USDX/WAVE pool and teach the emulator its account.
    async fn with_pool(self) -> Self {
        self.gateway
            .create_pool(CreatePoolRequest {
                token_a: USDX.to_string(),
                token_b: WAVE.to_string(),
                creator: ALICE.to_string(),
            })
            .await
            .unwrap();
        let pool = self
            .registry
            .resolve(&Address::from(USDX), &Address::from(WAVE))
            .unwrap();
        self.ledger
            .register_pool(pool.pool_account(), &pool.token_a().address, &pool.token_b().address);
        self
    }

    /// Seed the pool with 400 USDX / 900 WAVE from Alice.
    async fn with_liquidity(self) -> Self {
        let minted = self
            .gateway
            .liquidity_add(LiquidityAddRequest {
                provider: ALICE.to_string(),
                token_a: USDX.to_string(),
                token_b: WAVE.to_string(),
                amount_a: "400".to_string(),
                amount_b: "900".to_string(),
                min_a: None,
                min_b: None,
            })
            .await
            .unwrap();
        // Bootstrap mint: floor(sqrt(400e6 * 900e6)).
        assert_eq!(minted.lp_minted.raw, "600000000");
        self
    }

    fn balance(&self, token: &str, holder: &str) -> U256 {
        self.ledger.balance(&Address::from(token), &Address::from(holder))
    }
}

#[tokio::test]
async fn created_pool_lists_as_untradable_until_funded() {
    let h = Harness::new().await.with_pool().await;

    let pools = h.gateway.pools().await;
    assert_eq!(pools.len(), 1);
    let summary = &pools[0];
    assert_eq!(summary.pair_key, format!("{USDX}:{WAVE}"));
    assert_eq!(summary.fee_bps, 30);
    assert!(!summary.tradable);
    assert_eq!(summary.reserve_a.raw, "0");

    // Funding flips it.
    let h = h.with_liquidity().await;
    let summary = h.gateway.pool(WAVE, USDX).await.unwrap();
    assert!(summary.tradable);
    assert_eq!(summary.reserve_a.human, "400");
    assert_eq!(summary.reserve_b.human, "900");
    assert_eq!(summary.lp_supply.raw, "600000000");
}

#[tokio::test]
async fn duplicate_pool_creation_is_rejected() {
    let h = Harness::new().await.with_pool().await;
    let result = h
        .gateway
        .create_pool(CreatePoolRequest {
            token_a: WAVE.to_string(),
            token_b: USDX.to_string(),
            creator: ALICE.to_string(),
        })
        .await;
    assert!(matches!(
        result,
        Err(GatewayError::Pool(PoolError::PoolAlreadyExists(_)))
    ));
}

#[tokio::test]
async fn quote_deducts_protocol_fee_before_pricing() {
    let h = Harness::new().await.with_pool().await.with_liquidity().await;

    let quote = h
        .gateway
        .swap_quote(SwapQuoteRequest {
            token_in: USDX.to_string(),
            token_out: WAVE.to_string(),
            amount_in: "100".to_string(),
            gas_price: None,
        })
        .await
        .unwrap();

    assert_eq!(quote.venue_id, "basin-amm");
    // 30 bps of 100.000000 comes off before the venue prices the trade.
    assert_eq!(quote.fee_taken.raw, "300000");
    assert_eq!(quote.fee_taken.human, "0.3");
    assert_eq!(quote.net_in.raw, "99700000");
    // floor(99.7e6 * 9970 * 900e6 / (400e6 * 10000 + 99.7e6 * 9970)).
    assert_eq!(quote.amount_out.raw, "179136261");
    assert_eq!(quote.venues.len(), 1);

    // Quoting is read-only.
    assert_eq!(h.balance(USDX, ALICE), U256::from(600_000_000u64));
}

#[tokio::test]
async fn swap_settles_and_moves_balances() {
    let h = Harness::new().await.with_pool().await.with_liquidity().await;

    let executed = h
        .gateway
        .swap_execute(SwapExecuteRequest {
            trader: ALICE.to_string(),
            token_in: USDX.to_string(),
            token_out: WAVE.to_string(),
            amount_in: "100".to_string(),
            min_amount_out: None, // default tolerance around a fresh quote
        })
        .await
        .unwrap();

    // floor(100e6 * 9970 * 900e6 / (400e6 * 10000 + 100e6 * 9970)).
    assert_eq!(executed.amount_out.raw, "179567740");
    assert_eq!(executed.amount_out.human, "179.56774");
    assert_eq!(executed.fee_paid.raw, "300000");
    assert_eq!(executed.new_reserve_in.human, "500");
    assert_eq!(executed.new_reserve_out.raw, "720432260");
    assert!(executed.tx_id.starts_with("memtx-"));

    // Alice paid 400 + 100 USDX and got the output on top of her 100 WAVE.
    assert_eq!(h.balance(USDX, ALICE), U256::from(500_000_000u64));
    assert_eq!(
        h.balance(WAVE, ALICE),
        U256::from(100_000_000u64 + 179_567_740u64)
    );
}

#[tokio::test]
async fn explicit_minimum_above_computed_output_trips_the_guard() {
    let h = Harness::new().await.with_pool().await.with_liquidity().await;
    let usdx_before = h.balance(USDX, ALICE);

    let result = h
        .gateway
        .swap_execute(SwapExecuteRequest {
            trader: ALICE.to_string(),
            token_in: USDX.to_string(),
            token_out: WAVE.to_string(),
            amount_in: "100".to_string(),
            // One base unit above the computable 179.567740.
            min_amount_out: Some("179.567741".to_string()),
        })
        .await;

    assert!(matches!(
        result,
        Err(GatewayError::Pool(PoolError::SlippageExceeded { .. }))
    ));
    // Nothing settled.
    assert_eq!(h.balance(USDX, ALICE), usdx_before);
    let summary = h.gateway.pool(USDX, WAVE).await.unwrap();
    assert_eq!(summary.reserve_a.human, "400");
}

#[tokio::test]
async fn positions_report_floored_entitlements() {
    let h = Harness::new().await.with_pool().await.with_liquidity().await;

    let positions = h.gateway.positions(ALICE).await;
    assert_eq!(positions.len(), 1);
    let position = &positions[0];
    assert_eq!(position.lp_balance.raw, "600000000");
    assert_eq!(position.share, rust_decimal::Decimal::ONE);
    assert_eq!(position.entitlement_a.human, "400");
    assert_eq!(position.entitlement_b.human, "900");

    // A holder with no LP tokens has no positions.
    assert!(h.gateway.positions("acct:bob").await.is_empty());
}

#[tokio::test]
async fn flipped_pair_responses_keep_caller_orientation() {
    // The registry stores USDX/WAVE in canonical order; this caller supplies
    // the pair the other way around. Every "a" in the responses must keep
    // meaning WAVE, the caller's side A.
    let h = Harness::new().await.with_pool().await;

    let added = h
        .gateway
        .liquidity_add(LiquidityAddRequest {
            provider: ALICE.to_string(),
            token_a: WAVE.to_string(),
            token_b: USDX.to_string(),
            amount_a: "900".to_string(),
            amount_b: "400".to_string(),
            min_a: None,
            min_b: None,
        })
        .await
        .unwrap();
    assert_eq!(added.used_a.human, "900");
    assert_eq!(added.used_b.human, "400");
    assert_eq!(added.new_reserve_a.human, "900");
    assert_eq!(added.new_reserve_b.human, "400");

    // Swapping WAVE in: reserve labels follow the trade direction.
    let executed = h
        .gateway
        .swap_execute(SwapExecuteRequest {
            trader: ALICE.to_string(),
            token_in: WAVE.to_string(),
            token_out: USDX.to_string(),
            amount_in: "100".to_string(),
            min_amount_out: None,
        })
        .await
        .unwrap();
    // floor(100e6 * 9970 * 400e6 / (900e6 * 10000 + 100e6 * 9970)).
    assert_eq!(executed.amount_out.raw, "39891967");
    assert_eq!(executed.new_reserve_in.human, "1000");
    assert_eq!(executed.new_reserve_out.raw, "360108033");

    // Redeeming with the flipped pair: payouts mirror the request too.
    let removed = h
        .gateway
        .liquidity_remove(LiquidityRemoveRequest {
            provider: ALICE.to_string(),
            token_a: WAVE.to_string(),
            token_b: USDX.to_string(),
            lp_amount: "600000000".to_string(),
            min_a: Some("1000".to_string()),
            min_b: Some("360".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(removed.amount_a.human, "1000");
    assert_eq!(removed.amount_b.raw, "360108033");
    assert_eq!(removed.new_reserve_a.raw, "0");
}

#[tokio::test]
async fn full_redemption_drains_the_pool() {
    let h = Harness::new().await.with_pool().await.with_liquidity().await;

    let removed = h
        .gateway
        .liquidity_remove(LiquidityRemoveRequest {
            provider: ALICE.to_string(),
            token_a: USDX.to_string(),
            token_b: WAVE.to_string(),
            lp_amount: "600000000".to_string(),
            min_a: Some("400".to_string()),
            min_b: Some("900".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(removed.amount_a.human, "400");
    assert_eq!(removed.amount_b.human, "900");
    assert_eq!(removed.new_reserve_a.raw, "0");

    // Alice is whole again and the pool is back to untradable.
    assert_eq!(h.balance(USDX, ALICE), U256::from(1_000_000_000u64));
    assert_eq!(h.balance(WAVE, ALICE), U256::from(1_000_000_000u64));
    let summary = h.gateway.pool(USDX, WAVE).await.unwrap();
    assert!(!summary.tradable);
    assert_eq!(summary.lp_supply.raw, "0");
}
