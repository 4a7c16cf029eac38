use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    pub license_id: String,
    pub device_id: String,
    pub activated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Why a verification came back negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerifyFailure {
    NotFound,
    Deactivated,
    NotActivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<VerifyFailure>,
}

impl VerificationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: VerifyFailure) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// One row of the verification log (audit database).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationLogEntry {
    pub id: String,
    pub license_id: String,
    pub device_id: String,
    pub ip_address: Option<String>,
    pub timestamp: i64,
    pub valid: bool,
    pub reason: Option<String>,
}
