// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Point mutations (add/deduct/redeem/set, success and failure)
// - Redistribution passes (outcome, points actually moved)
// - Ledger totals (customer count, sum of all balances)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Mutation Metrics
    pub mutations_total: IntCounterVec,
    pub mutation_failures_total: IntCounterVec,

    // Redistribution Metrics
    pub redistribution_passes_total: IntCounterVec,
    pub redistribution_points_deducted: IntCounter,
    pub redistribution_points_added: IntCounter,

    // Ledger Metrics
    pub customers_total: IntGauge,
    pub ledger_points_total: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Mutation Metrics
        let mutations_total = IntCounterVec::new(
            Opts::new("loyalty_mutations_total", "Total point mutations applied"),
            &["operation"],
        )?;
        registry.register(Box::new(mutations_total.clone()))?;

        let mutation_failures_total = IntCounterVec::new(
            Opts::new("loyalty_mutation_failures_total", "Total point mutations that failed"),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(mutation_failures_total.clone()))?;

        // Redistribution Metrics
        let redistribution_passes_total = IntCounterVec::new(
            Opts::new("loyalty_redistribution_passes_total", "Redistribution passes by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(redistribution_passes_total.clone()))?;

        let redistribution_points_deducted = IntCounter::new(
            "loyalty_redistribution_points_deducted_total",
            "Points actually removed from source customers (after clamping)",
        )?;
        registry.register(Box::new(redistribution_points_deducted.clone()))?;

        let redistribution_points_added = IntCounter::new(
            "loyalty_redistribution_points_added_total",
            "Points granted to target customers",
        )?;
        registry.register(Box::new(redistribution_points_added.clone()))?;

        // Ledger Metrics
        let customers_total = IntGauge::new(
            "loyalty_customers_total",
            "Number of customer records in the ledger",
        )?;
        registry.register(Box::new(customers_total.clone()))?;

        let ledger_points_total = IntGauge::new(
            "loyalty_ledger_points_total",
            "Sum of all customer balances",
        )?;
        registry.register(Box::new(ledger_points_total.clone()))?;

        Ok(Self {
            registry,
            mutations_total,
            mutation_failures_total,
            redistribution_passes_total,
            redistribution_points_deducted,
            redistribution_points_added,
            customers_total,
            ledger_points_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a successful point mutation
    pub fn record_mutation(&self, operation: &str) {
        self.mutations_total.with_label_values(&[operation]).inc();
    }

    /// Helper to record a failed point mutation
    pub fn record_mutation_failure(&self, operation: &str, reason: &str) {
        self.mutation_failures_total.with_label_values(&[operation, reason]).inc();
    }

    /// Helper to record a redistribution pass outcome
    pub fn record_pass(&self, outcome: &str) {
        self.redistribution_passes_total.with_label_values(&[outcome]).inc();
    }

    /// Helper to record the points moved by one pass
    pub fn record_transfer(&self, deducted: i64, added: i64) {
        self.redistribution_points_deducted.inc_by(deducted.max(0) as u64);
        self.redistribution_points_added.inc_by(added.max(0) as u64);
    }

    /// Helper to update ledger-wide gauges
    pub fn set_ledger_totals(&self, customers: usize, points: i64) {
        self.customers_total.set(customers as i64);
        self.ledger_points_total.set(points);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
