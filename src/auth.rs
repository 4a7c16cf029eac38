//! Admin authentication and deactivation authorization.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{AsRefStr, EnumString};
use subtle::ConstantTimeEq;

use crate::models::License;

/// Checks candidate credentials against the configured admin secret.
///
/// Only a SHA-256 digest of the secret is kept. Candidates are hashed the same
/// way and the digests compared in constant time, so timing depends on neither
/// the length nor the content of either value. With no secret configured every
/// candidate is rejected.
#[derive(Clone)]
pub struct AdminAuthenticator {
    secret_digest: Option<[u8; 32]>,
}

impl AdminAuthenticator {
    pub fn new(secret: Option<&str>) -> Self {
        let secret_digest = secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(digest);
        Self { secret_digest }
    }

    /// An authenticator that rejects everything.
    pub fn disabled() -> Self {
        Self {
            secret_digest: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret_digest.is_some()
    }

    /// Short hex tag of the configured secret's digest, for startup logs.
    /// Lets operators tell two deployments' secrets apart without printing them.
    pub fn fingerprint(&self) -> Option<String> {
        self.secret_digest.map(|d| hex::encode(&d[..4]))
    }

    pub fn authorize(&self, candidate: Option<&str>) -> bool {
        let Some(expected) = &self.secret_digest else {
            return false;
        };
        // Hash even when the candidate is missing so both paths cost the same
        let provided = digest(candidate.unwrap_or(""));
        let matches: bool = expected.ct_eq(&provided).into();
        matches && candidate.is_some()
    }
}

impl fmt::Debug for AdminAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAuthenticator")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"license-admin-v1:");
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

/// Credentials a caller presents to deactivate a license.
#[derive(Debug, Clone, Default)]
pub struct DeactivationProof {
    pub admin_secret: Option<String>,
    pub device_id: Option<String>,
}

/// Facts the engine has established about a deactivation request.
#[derive(Debug, Clone, Copy)]
pub struct DeactivationCheck<'a> {
    pub license: &'a License,
    /// The admin credential was accepted
    pub admin_authorized: bool,
    /// The presented device holds a live activation on this license
    pub device_holds_seat: bool,
}

/// Decides whether a deactivation may proceed.
pub trait DeactivationPolicy: Send + Sync {
    fn authorize(&self, check: &DeactivationCheck<'_>) -> bool;
}

impl<F> DeactivationPolicy for F
where
    F: Fn(&DeactivationCheck<'_>) -> bool + Send + Sync,
{
    fn authorize(&self, check: &DeactivationCheck<'_>) -> bool {
        self(check)
    }
}

/// Built-in deactivation policies, selected by `DEACTIVATE_AUTH`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeactivationAuth {
    /// Only the admin secret may deactivate
    #[default]
    Admin,
    /// A device holding a seat on the license may deactivate it
    Device,
    /// Either of the above
    AdminOrDevice,
}

impl DeactivationPolicy for DeactivationAuth {
    fn authorize(&self, check: &DeactivationCheck<'_>) -> bool {
        match self {
            DeactivationAuth::Admin => check.admin_authorized,
            DeactivationAuth::Device => check.device_holds_seat,
            DeactivationAuth::AdminOrDevice => check.admin_authorized || check.device_holds_seat,
        }
    }
}
