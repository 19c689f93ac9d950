use serde::{Deserialize, Serialize};

use crate::workflows::lending::domain::GeoPoint;

/// Behavior when a decision is requested for a loan that already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedecisionPolicy {
    /// Re-run freely; the new decision replaces the old one.
    Rescore,
    /// Refuse once the loan has left `PENDING`.
    LockAfterFinal,
}

/// Underwriting constants, injected rather than hard-coded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingConfig {
    /// Starting point for every credit score.
    pub base_score: u16,
    /// Hard cap on the credit score.
    pub max_score: u16,
    /// Assumed collateral value per acre for the loan-to-value term.
    pub collateral_value_per_acre: f64,
    /// Annual rate in percent applied when an application omits one.
    pub default_interest_rate: f64,
    /// Coordinate used when a borrower has none on record.
    pub default_location: GeoPoint,
    /// Days an installment may run overdue before the loan is marked NPA.
    pub npa_grace_days: i64,
    pub redecision: RedecisionPolicy,
}

impl Default for UnderwritingConfig {
    fn default() -> Self {
        Self {
            base_score: 500,
            max_score: 900,
            collateral_value_per_acre: 50_000.0,
            default_interest_rate: 7.0,
            default_location: GeoPoint {
                latitude: 23.0225,
                longitude: 72.5714,
            },
            npa_grace_days: 90,
            redecision: RedecisionPolicy::Rescore,
        }
    }
}
