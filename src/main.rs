use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use loyalty_ledger::metrics::{start_metrics_server, Metrics};
use loyalty_ledger::{LoyaltyConfig, LoyaltyService, MemoryLedgerStore, NewCustomer, Redistributor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,loyalty_ledger=debug")),
        )
        .init();

    tracing::info!("🚀 Starting Loyalty Points Ledger");

    let config = LoyaltyConfig::from_env();
    tracing::info!(
        tick_secs = config.tick_interval.as_secs(),
        deduct = config.deduct_amount,
        add = config.add_amount,
        threshold = config.eligibility_threshold,
        "Loaded configuration"
    );

    // === 1. Ledger store and mutation service ===
    let store = Arc::new(MemoryLedgerStore::new());
    let metrics = Arc::new(Metrics::new()?);
    let service = Arc::new(LoyaltyService::new(store, metrics.clone(), config.clone()));

    // === 2. Metrics HTTP server in a background thread ===
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("metrics runtime");
        rt.block_on(async {
            if let Err(e) = start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 3. Seed a small demo population ===
    let inserted = service
        .bulk_add_customers(vec![
            NewCustomer {
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.com".to_string()),
                points: 120,
            },
            NewCustomer {
                name: "Grace Hopper".to_string(),
                email: Some("grace@example.com".to_string()),
                points: 45,
            },
            NewCustomer {
                name: "Alan Turing".to_string(),
                email: None,
                points: 0,
            },
        ])
        .await?;
    tracing::info!(customers = inserted.len(), "Seeded demo population");

    let stats = service.dashboard_stats().await?;
    metrics.set_ledger_totals(stats.total_customers, stats.total_points);
    tracing::info!(
        customers = stats.total_customers,
        total_points = stats.total_points,
        "📊 Ledger ready"
    );

    // === 4. Start the redistribution scheduler ===
    let scheduler = Arc::new(Redistributor::new(service.clone(), metrics.clone()));
    let handle = scheduler.spawn(config.tick_interval);

    // === 5. Run until interrupted ===
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    handle.abort();

    Ok(())
}
