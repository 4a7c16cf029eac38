use std::collections::BTreeMap;

use serde::Serialize;

use super::{LicenseStatus, Plan};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_licenses: i64,
    pub active_licenses: i64,
    pub deactivated_licenses: i64,
    pub total_activations: i64,
    /// Active license count per plan
    pub by_plan: BTreeMap<Plan, i64>,
    /// Verification log entries in the last 7 days
    pub recent_verifications: i64,
}

/// Grouped count row read from the license table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStatusCount {
    pub plan: Plan,
    pub status: LicenseStatus,
    pub count: i64,
}
