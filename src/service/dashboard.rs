use serde::Serialize;

use super::LoyaltyService;
use crate::domain::{Customer, LedgerError};

// ============================================================================
// Dashboard Queries - Read-Only Aggregation
// ============================================================================
//
// Sorting and filtering over already-valid ledger data. These queries never
// write; they impose their own order on top of the store's listing.
//
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_customers: usize,
    pub total_points: i64,
    /// Top five customers by balance.
    pub top_customers: Vec<Customer>,
    /// Every customer, points descending (bar-chart order).
    pub all_customers: Vec<Customer>,
}

#[derive(Debug, Serialize)]
pub struct RewardEligibility {
    pub eligible: Vec<Customer>,
    pub non_eligible: Vec<Customer>,
    pub eligible_count: usize,
    pub non_eligible_count: usize,
    pub total_count: usize,
}

impl LoyaltyService {
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, LedgerError> {
        let mut customers = self.list_customers().await?;
        customers.sort_by(|a, b| b.points.cmp(&a.points));

        let total_customers = customers.len();
        let total_points = customers.iter().map(|c| c.points).sum();
        let top_customers = customers.iter().take(5).cloned().collect();

        Ok(DashboardStats {
            total_customers,
            total_points,
            top_customers,
            all_customers: customers,
        })
    }

    /// Split the ledger at the eligibility threshold (config, default 100).
    pub async fn reward_eligibility(&self) -> Result<RewardEligibility, LedgerError> {
        let threshold = self.config().eligibility_threshold;
        let customers = self.list_customers().await?;

        let (eligible, non_eligible): (Vec<_>, Vec<_>) =
            customers.into_iter().partition(|c| c.points >= threshold);

        Ok(RewardEligibility {
            eligible_count: eligible.len(),
            non_eligible_count: non_eligible.len(),
            total_count: eligible.len() + non_eligible.len(),
            eligible,
            non_eligible,
        })
    }
}
