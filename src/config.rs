use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Loyalty Service Configuration
// ============================================================================
//
// The tick interval, transfer amounts, and eligibility threshold are named
// values with documented defaults instead of literals scattered through the
// code. Every value can be overridden from the environment:
//
//   LOYALTY_TICK_SECS               redistribution interval in seconds
//   LOYALTY_DEDUCT_AMOUNT           points removed from the source customer
//   LOYALTY_ADD_AMOUNT              points granted to the target customer
//   LOYALTY_ELIGIBILITY_THRESHOLD   reward-eligibility cutoff
//   LOYALTY_METRICS_PORT            metrics HTTP server port
//
// ============================================================================

/// Redistribution runs every 10 minutes by default.
pub const DEFAULT_TICK_SECS: u64 = 600;
/// Points removed from the randomly chosen source customer (clamped at 0).
pub const DEFAULT_DEDUCT_AMOUNT: i64 = 10;
/// Points granted to the randomly chosen target customer (unclamped).
pub const DEFAULT_ADD_AMOUNT: i64 = 20;
/// Balance at which a customer qualifies for reward redemption.
pub const DEFAULT_ELIGIBILITY_THRESHOLD: i64 = 100;
/// Port for the /metrics and /health endpoints.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

#[derive(Clone, Debug)]
pub struct LoyaltyConfig {
    pub tick_interval: Duration,
    pub deduct_amount: i64,
    pub add_amount: i64,
    pub eligibility_threshold: i64,
    pub metrics_port: u16,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(DEFAULT_TICK_SECS),
            deduct_amount: DEFAULT_DEDUCT_AMOUNT,
            add_amount: DEFAULT_ADD_AMOUNT,
            eligibility_threshold: DEFAULT_ELIGIBILITY_THRESHOLD,
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

impl LoyaltyConfig {
    /// Build a config from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_interval: env_parse("LOYALTY_TICK_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.tick_interval),
            deduct_amount: env_parse("LOYALTY_DEDUCT_AMOUNT").unwrap_or(defaults.deduct_amount),
            add_amount: env_parse("LOYALTY_ADD_AMOUNT").unwrap_or(defaults.add_amount),
            eligibility_threshold: env_parse("LOYALTY_ELIGIBILITY_THRESHOLD")
                .unwrap_or(defaults.eligibility_threshold),
            metrics_port: env_parse("LOYALTY_METRICS_PORT").unwrap_or(defaults.metrics_port),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, raw = %raw, "Ignoring unparseable config override");
            None
        }
    }
}
