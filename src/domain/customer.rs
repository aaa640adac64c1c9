use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Customer Model
// ============================================================================

/// A customer record in the loyalty ledger.
///
/// The store owns the authoritative `points` balance; the mutation service
/// and the scheduler only propose new values through `patch`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a fresh customer with a zero balance.
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email,
            points: 0,
            created_at: Utc::now(),
        }
    }

    /// Create a customer with a starting balance (bulk import path).
    pub fn with_points(name: impl Into<String>, email: Option<String>, points: i64) -> Self {
        Self {
            points,
            ..Self::new(name, email)
        }
    }
}

/// Partial update applied atomically to a single record.
///
/// Only fields that are `Some` are overwritten; `id` and `created_at` are
/// immutable and cannot be patched.
#[derive(Clone, Debug, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub points: Option<i64>,
}

impl CustomerPatch {
    /// Patch that overwrites only the points balance.
    pub fn points(points: i64) -> Self {
        Self {
            points: Some(points),
            ..Default::default()
        }
    }

    /// Overwrite the present fields of `customer`, leaving the rest intact.
    pub fn apply(&self, customer: &mut Customer) {
        if let Some(ref name) = self.name {
            customer.name = name.clone();
        }
        if let Some(ref email) = self.email {
            customer.email = Some(email.clone());
        }
        if let Some(points) = self.points {
            customer.points = points;
        }
    }
}
