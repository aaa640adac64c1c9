use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Customer, CustomerPatch};

// ============================================================================
// Ledger Store - Keyed Customer Storage
// ============================================================================
//
// Contract consumed by the mutation service and the scheduler:
// - point-in-time get
// - full listing (no order promised; consumers impose their own sort)
// - insert of a new record
// - atomic single-record partial update
//
// Patches to different records never interfere. Patches to the same record
// serialize under the store's own lock (last-applied-wins). There is no
// cross-record transaction: callers that touch two records get two
// independently atomic writes.
//
// ============================================================================

mod memory;

pub use memory::MemoryLedgerStore;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch one customer, `None` when the id is unknown.
    async fn get(&self, id: Uuid) -> Result<Option<Customer>>;

    /// Fetch every customer.
    async fn list(&self) -> Result<Vec<Customer>>;

    /// Add a new customer record.
    async fn insert(&self, customer: Customer) -> Result<()>;

    /// Atomically overwrite the present fields of one record.
    /// Returns `false` when the id is unknown.
    async fn patch(&self, id: Uuid, patch: CustomerPatch) -> Result<bool>;
}
