use anyhow::{Context, Result};
use basin_aggregator::{AmmVenue, QuoteAggregator, QuoteVenue};
use basin_config::BasinConfig;
use basin_gateway::{Gateway, MemoryLedger};
use basin_pools::{LedgerReader, LedgerWriter, PoolRegistry, RegistryStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("🚀 Starting Basin gateway...");

    let config = match std::env::args().nth(1) {
        Some(path) => BasinConfig::load(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => BasinConfig::from_env().context("invalid environment configuration")?,
    };

    // Dev-mode wiring: the in-process ledger emulator and an in-memory
    // registry store. Production deployments inject real ledger clients and
    // a durable store here instead.
    let ledger = Arc::new(MemoryLedger::new());
    let reader: Arc<dyn LedgerReader> = ledger.clone();
    let writer: Arc<dyn LedgerWriter> = ledger;
    let store: Arc<dyn RegistryStore> = Arc::new(basin_pools::InMemoryStore::new());

    let registry = Arc::new(
        PoolRegistry::load(store, config.default_fee_bps)
            .await
            .context("failed to load pool registry")?,
    );
    info!("✅ Pool registry ready ({} pools)", registry.list_pools().len());

    // Local AMM first: venue order is priority order for quote tie-breaks.
    let venues: Vec<Arc<dyn QuoteVenue>> = vec![Arc::new(AmmVenue::new(
        Arc::clone(&registry),
        Arc::clone(&reader),
        config.io_timeout(),
    ))];
    let venue_count = venues.len();
    let aggregator = QuoteAggregator::new(venues, config.default_fee_bps, config.io_timeout());
    info!("✅ Quote aggregator initialized with {venue_count} venue(s)");

    let _gateway = Gateway::new(config, registry, reader, writer, aggregator);
    info!("✅ Basin gateway ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutting down");
    Ok(())
}
