// ============================================================================
// loyalty-ledger - Customer Loyalty Points Ledger
// ============================================================================
//
// Customers accumulate, spend, and redeem points; a background scheduler
// periodically moves a fixed number of points between two randomly chosen
// customers. Layered as:
//
//   scheduler -> service -> store
//
// The store exclusively owns the authoritative balances; the service
// enforces the mutation rules (clamped deduct, unconditional redeem); the
// scheduler is the sole driver of redistribution ticks.
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod metrics;
pub mod scheduler;
pub mod service;
pub mod store;

pub use config::LoyaltyConfig;
pub use domain::{Customer, CustomerPatch, LedgerError};
pub use scheduler::{PassOutcome, Redistributor, Transfer};
pub use service::{LoyaltyService, NewCustomer};
pub use store::{LedgerStore, MemoryLedgerStore};
