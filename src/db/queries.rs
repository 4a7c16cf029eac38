use chrono::Utc;
use rusqlite::{Connection, ErrorCode, params};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{
    ACTIVATION_COLS, LICENSE_COLS, LICENSE_SUMMARY_COLS, VERIFICATION_LOG_COLS, query_all,
    query_one,
};

const SECONDS_PER_DAY: i64 = 86400;

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// True when the error is a UNIQUE/PRIMARY KEY violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

// ============ Licenses ============

/// Insert a license row. Returns the raw rusqlite error so callers can detect
/// key collisions and retry.
pub fn insert_license(conn: &Connection, license: &License) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO licenses (id, email, plan, status, max_activations, created_at, deactivated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &license.id,
            &license.email,
            license.plan.as_ref(),
            license.status.as_ref(),
            license.max_activations,
            license.created_at,
            license.deactivated_at,
        ],
    )?;
    Ok(())
}

pub fn get_license(conn: &Connection, id: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE id = ?1", LICENSE_COLS),
        &[&id],
    )
}

pub fn count_licenses(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))
        .map_err(Into::into)
}

/// List licenses newest first, each with its live activation count.
pub fn list_licenses_paginated(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<(Vec<LicenseSummary>, i64)> {
    let total = count_licenses(conn)?;
    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM licenses l ORDER BY l.created_at DESC, l.id LIMIT ?1 OFFSET ?2",
            LICENSE_SUMMARY_COLS
        ),
        &[&limit, &offset],
    )?;
    Ok((items, total))
}

/// Flip an active license to deactivated. Returns false if it was not active.
pub fn mark_license_deactivated(conn: &Connection, id: &str, at: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE licenses SET status = 'deactivated', deactivated_at = ?1
         WHERE id = ?2 AND status = 'active'",
        params![at, id],
    )?;
    Ok(updated > 0)
}

/// Grouped license counts for the stats aggregator.
pub fn count_licenses_by_plan_and_status(conn: &Connection) -> Result<Vec<PlanStatusCount>> {
    query_all(
        conn,
        "SELECT plan, status, COUNT(*) FROM licenses GROUP BY plan, status",
        &[],
    )
}

// ============ Activations ============

pub fn insert_activation(conn: &Connection, activation: &Activation) -> Result<()> {
    conn.execute(
        "INSERT INTO activations (id, license_id, device_id, activated_at, ip_address)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &activation.id,
            &activation.license_id,
            &activation.device_id,
            activation.activated_at,
            &activation.ip_address,
        ],
    )?;
    Ok(())
}

pub fn new_activation(license_id: &str, device_id: &str, ip_address: Option<&str>) -> Activation {
    Activation {
        id: EntityType::Activation.gen_id(),
        license_id: license_id.to_string(),
        device_id: device_id.to_string(),
        activated_at: now(),
        ip_address: ip_address.map(String::from),
    }
}

pub fn get_activation(
    conn: &Connection,
    license_id: &str,
    device_id: &str,
) -> Result<Option<Activation>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE license_id = ?1 AND device_id = ?2",
            ACTIVATION_COLS
        ),
        &[&license_id, &device_id],
    )
}

pub fn list_activations_for_license(conn: &Connection, license_id: &str) -> Result<Vec<Activation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE license_id = ?1 ORDER BY activated_at, id",
            ACTIVATION_COLS
        ),
        &[&license_id],
    )
}

pub fn count_activations_for_license(conn: &Connection, license_id: &str) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM activations WHERE license_id = ?1",
        params![license_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

pub fn count_all_activations(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM activations", [], |row| row.get(0))
        .map_err(Into::into)
}

pub fn delete_activation(conn: &Connection, license_id: &str, device_id: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM activations WHERE license_id = ?1 AND device_id = ?2",
        params![license_id, device_id],
    )?;
    Ok(deleted > 0)
}

pub fn delete_activations_for_license(conn: &Connection, license_id: &str) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM activations WHERE license_id = ?1",
        params![license_id],
    )?;
    Ok(deleted)
}

/// Read license status and device membership in one statement.
///
/// Returns `None` when the license does not exist, otherwise the license status
/// and whether `device_id` holds a live activation.
pub fn get_verification_snapshot(
    conn: &Connection,
    license_id: &str,
    device_id: &str,
) -> Result<Option<(LicenseStatus, bool)>> {
    let mut stmt = conn.prepare(
        "SELECT l.status, a.id IS NOT NULL
         FROM licenses l
         LEFT JOIN activations a ON a.license_id = l.id AND a.device_id = ?2
         WHERE l.id = ?1",
    )?;
    let mut rows = stmt.query(params![license_id, device_id])?;

    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let status: String = row.get(0)?;
    let status = status.parse::<LicenseStatus>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "status".into(), rusqlite::types::Type::Text)
    })?;
    let activated: bool = row.get(1)?;
    Ok(Some((status, activated)))
}

// ============ Verification Log ============

pub fn create_verification_log(
    conn: &Connection,
    license_id: &str,
    device_id: &str,
    ip_address: Option<&str>,
    result: &VerificationResult,
) -> Result<VerificationLogEntry> {
    let entry = VerificationLogEntry {
        id: EntityType::VerificationLog.gen_id(),
        license_id: license_id.to_string(),
        device_id: device_id.to_string(),
        ip_address: ip_address.map(String::from),
        timestamp: now(),
        valid: result.valid,
        reason: result.reason.map(|r| r.as_ref().to_string()),
    };

    conn.execute(
        "INSERT INTO verification_log (id, license_id, device_id, ip_address, timestamp, valid, reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &entry.id,
            &entry.license_id,
            &entry.device_id,
            &entry.ip_address,
            entry.timestamp,
            entry.valid,
            &entry.reason,
        ],
    )?;

    Ok(entry)
}

pub fn list_verification_logs_for_license(
    conn: &Connection,
    license_id: &str,
) -> Result<Vec<VerificationLogEntry>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM verification_log WHERE license_id = ?1 ORDER BY timestamp DESC",
            VERIFICATION_LOG_COLS
        ),
        &[&license_id],
    )
}

pub fn count_verifications_since(conn: &Connection, since: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM verification_log WHERE timestamp > ?1",
        params![since],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

/// Delete verification log entries older than `retention_days`.
pub fn purge_old_verification_logs(conn: &Connection, retention_days: i64) -> Result<usize> {
    let cutoff = now().saturating_sub(retention_days.saturating_mul(SECONDS_PER_DAY));
    let deleted = conn.execute(
        "DELETE FROM verification_log WHERE timestamp < ?1",
        params![cutoff],
    )?;
    Ok(deleted)
}
