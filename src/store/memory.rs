use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::LedgerStore;
use crate::domain::{Customer, CustomerPatch};

// ============================================================================
// In-Memory Ledger Store
// ============================================================================
//
// HashMap keyed by customer id behind a tokio RwLock. The write lock makes
// each single-record patch atomic; readers never observe a half-applied
// patch. Suitable for tests and for running the service without an external
// database.
//
// ============================================================================

#[derive(Default)]
pub struct MemoryLedgerStore {
    records: RwLock<HashMap<Uuid, Customer>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get(&self, id: Uuid) -> Result<Option<Customer>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Customer>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn insert(&self, customer: Customer) -> Result<()> {
        let mut records = self.records.write().await;
        tracing::debug!(customer_id = %customer.id, name = %customer.name, "Inserted customer record");
        records.insert(customer.id, customer);
        Ok(())
    }

    async fn patch(&self, id: Uuid, patch: CustomerPatch) -> Result<bool> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(customer) => {
                patch.apply(customer);
                tracing::debug!(customer_id = %id, points = customer.points, "Patched customer record");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
