// ============================================================================
// Domain Layer - Ledger Records and Errors
// ============================================================================
//
// This module contains the Customer record, the partial-update shape the
// store accepts, and the ledger error taxonomy. It is completely separate
// from the storage and scheduling infrastructure.
//
// ============================================================================

pub mod customer;
pub mod errors;

// Re-export for convenience
pub use customer::{Customer, CustomerPatch};
pub use errors::LedgerError;
