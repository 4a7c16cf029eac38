use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::{Activation, Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Deactivated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// The license key handed to the customer
    pub id: String,
    pub email: String,
    pub plan: Plan,
    pub status: LicenseStatus,
    pub max_activations: u32,
    pub created_at: i64,
    /// Set when the license is deactivated (None = active)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_at: Option<i64>,
}

impl License {
    pub fn is_active(&self) -> bool {
        self.status == LicenseStatus::Active
    }
}

/// Admin request to issue a license.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLicense {
    pub email: String,
    pub plan: String,
    /// Explicit seat count; defaults to the plan's limit
    #[serde(default)]
    pub max_activations: Option<u32>,
}

/// License row with its live activation count, for admin listings.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseSummary {
    #[serde(flatten)]
    pub license: License,
    pub activation_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseDetails {
    #[serde(flatten)]
    pub license: License,
    pub activations: Vec<Activation>,
}
