//! License lifecycle engine.
//!
//! Orchestrates create, activate, verify, deactivate and release against the
//! license store. A license moves `active -> deactivated` and never back;
//! activations only exist while it is active.
//!
//! Every mutation runs inside an `IMMEDIATE` transaction, which takes the
//! SQLite write lock at `BEGIN`. Concurrent activations therefore cannot both
//! see the last free seat, and deactivation's clear-and-flip is never observed
//! half done.

use std::str::FromStr;
use std::sync::Arc;

use rusqlite::TransactionBehavior;

use crate::auth::{AdminAuthenticator, DeactivationAuth, DeactivationCheck, DeactivationPolicy, DeactivationProof};
use crate::config::Config;
use crate::db::{DbPool, queries};
use crate::error::{AppError, Result};
use crate::keygen::{KeyGenerator, normalize_key};
use crate::models::*;
use crate::stats;
use crate::tracker::{self, Reservation};
use crate::util::{mask_key, require_field, validate_email};

const MAX_LICENSE_ID_LEN: usize = 128;
const MAX_DEVICE_ID_LEN: usize = 256;

/// Attempts at inserting a freshly generated key before giving up.
const KEY_COLLISION_RETRIES: usize = 3;

/// Result of a deactivation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deactivation {
    /// Activations removed by this call
    pub released: usize,
    /// False if the license was already deactivated (no-op)
    pub changed: bool,
}

#[derive(Clone)]
pub struct LicenseEngine {
    db: DbPool,
    audit: DbPool,
    keygen: KeyGenerator,
    admin: AdminAuthenticator,
    deactivation: Arc<dyn DeactivationPolicy>,
    verification_log_enabled: bool,
}

impl LicenseEngine {
    /// Engine with the default key prefix, admin-only deactivation and the
    /// verification log enabled.
    pub fn new(db: DbPool, audit: DbPool, admin: AdminAuthenticator) -> Self {
        Self {
            db,
            audit,
            keygen: KeyGenerator::default(),
            admin,
            deactivation: Arc::new(DeactivationAuth::Admin),
            verification_log_enabled: true,
        }
    }

    pub fn from_config(config: &Config, db: DbPool, audit: DbPool) -> Self {
        Self::new(db, audit, AdminAuthenticator::new(config.admin_secret.as_deref()))
            .with_key_generator(KeyGenerator::new(config.license_key_prefix.clone()))
            .with_deactivation_policy(config.deactivate_auth)
            .with_verification_log(config.verification_log_enabled)
    }

    pub fn with_key_generator(mut self, keygen: KeyGenerator) -> Self {
        self.keygen = keygen;
        self
    }

    pub fn with_deactivation_policy(mut self, policy: impl DeactivationPolicy + 'static) -> Self {
        self.deactivation = Arc::new(policy);
        self
    }

    pub fn with_verification_log(mut self, enabled: bool) -> Self {
        self.verification_log_enabled = enabled;
        self
    }

    pub fn admin(&self) -> &AdminAuthenticator {
        &self.admin
    }

    pub fn key_generator(&self) -> &KeyGenerator {
        &self.keygen
    }

    fn require_admin(&self, credential: Option<&str>) -> Result<()> {
        if self.admin.authorize(credential) {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// Issue a new license. Requires the admin credential.
    pub fn create(&self, input: &CreateLicense, admin_credential: Option<&str>) -> Result<License> {
        self.require_admin(admin_credential)?;

        let email = validate_email(&input.email)?;
        let plan = Plan::from_str(input.plan.trim())
            .map_err(|_| AppError::InvalidInput(format!("Unknown plan: {}", input.plan.trim())))?;
        let max_activations = match input.max_activations {
            Some(n) if (1..=MAX_ACTIVATIONS_CEILING).contains(&n) => n,
            Some(n) => {
                return Err(AppError::InvalidInput(format!(
                    "max_activations must be between 1 and {}, got {}",
                    MAX_ACTIVATIONS_CEILING, n
                )));
            }
            None => plan.max_activations(),
        };

        let conn = self.db.get()?;
        let license = insert_new_license(&conn, &self.keygen, email, plan, max_activations)?;

        tracing::info!(
            license = %mask_key(&license.id),
            plan = plan.as_ref(),
            max_activations,
            "Created license"
        );

        Ok(license)
    }

    /// Activate a license on a device.
    ///
    /// Re-activating a device that already holds a seat returns the existing
    /// activation without consuming another seat.
    pub fn activate(&self, license_id: &str, device_id: &str, ip_address: Option<&str>) -> Result<Activation> {
        let license_id = license_id_field(license_id)?;
        let device_id = device_id_field(device_id)?;

        let mut conn = self.db.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let license = queries::get_license(&tx, &license_id)?
            .ok_or_else(|| AppError::NotFound("License not found".into()))?;

        if !license.is_active() {
            tracing::debug!(license = %mask_key(&license.id), "Activation refused: license deactivated");
            return Err(AppError::LicenseDeactivated);
        }

        let reservation = match tracker::reserve(&tx, &license, device_id, ip_address) {
            Ok(r) => r,
            Err(e @ AppError::ActivationLimitExceeded { .. }) => {
                tracing::info!(
                    license = %mask_key(&license.id),
                    max = license.max_activations,
                    "Activation refused: limit reached"
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        tx.commit()?;

        match &reservation {
            Reservation::Created(_) => {
                tracing::info!(license = %mask_key(&license.id), "New activation")
            }
            Reservation::Existing(_) => {
                tracing::debug!(license = %mask_key(&license.id), "Re-activation of existing device")
            }
        }

        Ok(reservation.into_activation())
    }

    /// Check whether a device holds a live activation on an active license.
    ///
    /// Never mutates license or activation state. Unknown licenses are a
    /// negative result, not an error; only blank fields are rejected. Ids
    /// longer than any stored value simply fail to match.
    pub fn verify(&self, license_id: &str, device_id: &str, ip_address: Option<&str>) -> Result<VerificationResult> {
        let license_id = normalize_key(require_field("license_id", license_id, usize::MAX)?);
        let device_id = require_field("device_id", device_id, usize::MAX)?;

        let conn = self.db.get()?;
        let result = match queries::get_verification_snapshot(&conn, &license_id, device_id)? {
            None => VerificationResult::invalid(VerifyFailure::NotFound),
            Some((LicenseStatus::Deactivated, _)) => VerificationResult::invalid(VerifyFailure::Deactivated),
            Some((LicenseStatus::Active, false)) => VerificationResult::invalid(VerifyFailure::NotActivated),
            Some((LicenseStatus::Active, true)) => VerificationResult::valid(),
        };
        drop(conn);

        if self.verification_log_enabled {
            self.log_verification(&license_id, device_id, ip_address, &result);
        }

        Ok(result)
    }

    fn log_verification(&self, license_id: &str, device_id: &str, ip_address: Option<&str>, result: &VerificationResult) {
        let written = self
            .audit
            .get()
            .map_err(AppError::from)
            .and_then(|conn| queries::create_verification_log(&conn, license_id, device_id, ip_address, result));

        if let Err(e) = written {
            tracing::warn!("Failed to write verification log: {}", e);
        }
    }

    /// Deactivate a license: drop every activation and flip the status.
    ///
    /// The configured [`DeactivationPolicy`] must approve `proof` first.
    /// Deactivating an already deactivated license is a successful no-op.
    pub fn deactivate(&self, license_id: &str, proof: &DeactivationProof) -> Result<Deactivation> {
        let license_id = license_id_field(license_id)?;
        let admin_authorized = self.admin.authorize(proof.admin_secret.as_deref());
        let device_id = proof
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let mut conn = self.db.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let license = queries::get_license(&tx, &license_id)?
            .ok_or_else(|| AppError::NotFound("License not found".into()))?;

        let device_holds_seat = match device_id {
            Some(device_id) => queries::get_activation(&tx, &license.id, device_id)?.is_some(),
            None => false,
        };

        let check = DeactivationCheck {
            license: &license,
            admin_authorized,
            device_holds_seat,
        };
        if !self.deactivation.authorize(&check) {
            tracing::warn!(license = %mask_key(&license.id), "Deactivation refused by policy");
            return Err(AppError::Unauthorized);
        }

        if !license.is_active() {
            return Ok(Deactivation {
                released: 0,
                changed: false,
            });
        }

        let released = tracker::release_all(&tx, &license.id)?;
        queries::mark_license_deactivated(&tx, &license.id, queries::now())?;
        tx.commit()?;

        tracing::info!(license = %mask_key(&license.id), released, "Deactivated license");

        Ok(Deactivation {
            released,
            changed: true,
        })
    }

    /// Release the seat held by one device. Returns the remaining live count.
    pub fn release(&self, license_id: &str, device_id: &str) -> Result<u32> {
        let license_id = license_id_field(license_id)?;
        let device_id = device_id_field(device_id)?;

        let mut conn = self.db.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if queries::get_license(&tx, &license_id)?.is_none() {
            return Err(AppError::NotFound("License not found".into()));
        }

        if !tracker::release(&tx, &license_id, device_id)? {
            return Err(AppError::NotFound("No active activation for this device".into()));
        }

        let remaining = tracker::count(&tx, &license_id)?;
        tx.commit()?;

        tracing::info!(license = %mask_key(&license_id), remaining, "Released device seat");
        Ok(remaining)
    }

    /// Admin view of one license with its live activations.
    pub fn get_license(&self, license_id: &str, admin_credential: Option<&str>) -> Result<LicenseDetails> {
        self.require_admin(admin_credential)?;
        let license_id = license_id_field(license_id)?;

        let mut conn = self.db.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let license = queries::get_license(&tx, &license_id)?
            .ok_or_else(|| AppError::NotFound("License not found".into()))?;
        let activations = queries::list_activations_for_license(&tx, &license_id)?;
        tx.commit()?;

        Ok(LicenseDetails { license, activations })
    }

    /// Admin listing of licenses, newest first.
    pub fn list_licenses(
        &self,
        admin_credential: Option<&str>,
        query: &ListLicensesQuery,
    ) -> Result<LicensePage> {
        self.require_admin(admin_credential)?;

        let conn = self.db.get()?;
        let (limit, offset) = (query.limit(), query.offset());
        let (licenses, total) = queries::list_licenses_paginated(&conn, limit, offset)?;
        Ok(LicensePage {
            licenses,
            total,
            limit,
            offset,
        })
    }

    /// Admin summary counts.
    pub fn stats(&self, admin_credential: Option<&str>) -> Result<Stats> {
        self.require_admin(admin_credential)?;

        let mut conn = self.db.get()?;
        if self.verification_log_enabled {
            let audit = self.audit.get()?;
            stats::compute(&mut conn, Some(&*audit))
        } else {
            stats::compute(&mut conn, None)
        }
    }
}

/// Generate a key and insert the license, retrying on the (unlikely) event of
/// a key collision.
pub fn insert_new_license(
    conn: &rusqlite::Connection,
    keygen: &KeyGenerator,
    email: &str,
    plan: Plan,
    max_activations: u32,
) -> Result<License> {
    for _ in 0..KEY_COLLISION_RETRIES {
        let license = License {
            id: keygen.generate(plan),
            email: email.to_string(),
            plan,
            status: LicenseStatus::Active,
            max_activations,
            created_at: queries::now(),
            deactivated_at: None,
        };

        match queries::insert_license(conn, &license) {
            Ok(()) => return Ok(license),
            Err(e) if queries::is_unique_violation(&e) => {
                tracing::warn!("License key collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal("Could not generate a unique license key".into()))
}

fn license_id_field(raw: &str) -> Result<String> {
    let value = require_field("license_id", raw, MAX_LICENSE_ID_LEN)?;
    Ok(normalize_key(value))
}

fn device_id_field(raw: &str) -> Result<&str> {
    require_field("device_id", raw, MAX_DEVICE_ID_LEN)
}
