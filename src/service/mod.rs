use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::config::LoyaltyConfig;
use crate::domain::{Customer, CustomerPatch, LedgerError};
use crate::metrics::Metrics;
use crate::store::LedgerStore;

// ============================================================================
// Points Mutation Service
// ============================================================================
//
// Enforces the ledger invariants on top of the store:
// - add_points:              points' = points + amount
// - deduct_points (clamped): points' = max(0, points - amount)
// - redeem_reward:           points' = 0
// - update_customer_points:  points' = the given value
//
// Each operation reads current state, computes the new balance, then patches
// exactly one record. Operations are internally atomic for that record only;
// they are never composed into a multi-record transaction.
//
// Known permissive gap, preserved deliberately: add_points accepts negative
// amounts and update_customer_points writes any value without a floor check.
//
// ============================================================================

pub mod dashboard;

/// One entry of a bulk import, deduplicated on `name`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub points: i64,
}

pub struct LoyaltyService {
    store: Arc<dyn LedgerStore>,
    metrics: Arc<Metrics>,
    config: LoyaltyConfig,
}

impl LoyaltyService {
    pub fn new(store: Arc<dyn LedgerStore>, metrics: Arc<Metrics>, config: LoyaltyConfig) -> Self {
        Self { store, metrics, config }
    }

    pub fn config(&self) -> &LoyaltyConfig {
        &self.config
    }

    /// Load one customer or fail with `CustomerNotFound`.
    async fn require(&self, id: Uuid) -> Result<Customer, LedgerError> {
        self.store
            .get(id)
            .await?
            .ok_or(LedgerError::CustomerNotFound(id))
    }

    /// Register a new customer with a zero balance.
    pub async fn add_customer(
        &self,
        name: impl Into<String>,
        email: Option<String>,
    ) -> Result<Uuid, LedgerError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }

        let customer = Customer::new(name, email);
        let id = customer.id;
        self.store.insert(customer).await?;

        self.metrics.record_mutation("add_customer");
        tracing::info!(customer_id = %id, "✅ Registered customer");
        Ok(id)
    }

    /// Batch-insert customers, skipping entries whose name already exists.
    /// Returns the ids that were actually inserted.
    pub async fn bulk_add_customers(
        &self,
        entries: Vec<NewCustomer>,
    ) -> Result<Vec<Uuid>, LedgerError> {
        let mut inserted = Vec::new();

        for entry in entries {
            if entry.name.is_empty() {
                tracing::warn!("Skipping bulk entry with empty name");
                continue;
            }

            let existing = self.store.list().await?;
            if existing.iter().any(|c| c.name == entry.name) {
                tracing::debug!(name = %entry.name, "Skipping duplicate customer in bulk import");
                continue;
            }

            let customer = Customer::with_points(entry.name, entry.email, entry.points);
            let id = customer.id;
            self.store.insert(customer).await?;
            inserted.push(id);
        }

        tracing::info!(inserted = inserted.len(), "📥 Bulk import finished");
        Ok(inserted)
    }

    /// Every customer, newest first.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, LedgerError> {
        let mut customers = self.store.list().await?;
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<Customer, LedgerError> {
        self.require(id).await
    }

    /// `points' = points + amount`. No bound is enforced on `amount` itself;
    /// a negative amount passes straight through.
    pub async fn add_points(&self, id: Uuid, amount: i64) -> Result<(), LedgerError> {
        let result = self.apply_add(id, amount).await;
        self.record("add_points", &result);
        result
    }

    async fn apply_add(&self, id: Uuid, amount: i64) -> Result<(), LedgerError> {
        let customer = self.require(id).await?;
        let points = customer.points.saturating_add(amount);
        self.store.patch(id, CustomerPatch::points(points)).await?;
        tracing::info!(customer_id = %id, amount, points, "Added points");
        Ok(())
    }

    /// Clamped subtraction: `points' = max(0, points - amount)`. The amount
    /// actually removed may be less than requested.
    pub async fn deduct_points(&self, id: Uuid, amount: i64) -> Result<(), LedgerError> {
        let result = self.apply_deduct(id, amount).await;
        self.record("deduct_points", &result);
        result
    }

    async fn apply_deduct(&self, id: Uuid, amount: i64) -> Result<(), LedgerError> {
        let customer = self.require(id).await?;
        let points = customer.points.saturating_sub(amount).max(0);
        self.store.patch(id, CustomerPatch::points(points)).await?;
        tracing::info!(customer_id = %id, amount, points, "Deducted points");
        Ok(())
    }

    /// Unconditional reset to zero. Eligibility is the caller's problem; any
    /// accumulated balance is discarded.
    pub async fn redeem_reward(&self, id: Uuid) -> Result<(), LedgerError> {
        let result = self.apply_redeem(id).await;
        self.record("redeem_reward", &result);
        result
    }

    async fn apply_redeem(&self, id: Uuid) -> Result<(), LedgerError> {
        let customer = self.require(id).await?;
        self.store.patch(id, CustomerPatch::points(0)).await?;
        tracing::info!(customer_id = %id, discarded = customer.points, "🎁 Redeemed reward, balance reset");
        Ok(())
    }

    /// Absolute overwrite of the balance, no floor or ceiling check.
    pub async fn update_customer_points(&self, id: Uuid, points: i64) -> Result<(), LedgerError> {
        let result = self.apply_update(id, points).await;
        self.record("update_customer_points", &result);
        result
    }

    async fn apply_update(&self, id: Uuid, points: i64) -> Result<(), LedgerError> {
        // The original store swallowed unknown ids here; surface them instead.
        self.require(id).await?;
        self.store.patch(id, CustomerPatch::points(points)).await?;
        tracing::info!(customer_id = %id, points, "Set points");
        Ok(())
    }

    fn record(&self, operation: &str, result: &Result<(), LedgerError>) {
        match result {
            Ok(()) => self.metrics.record_mutation(operation),
            Err(e) => self.metrics.record_mutation_failure(operation, e.reason()),
        }
    }
}
