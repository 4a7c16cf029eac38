//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! Models implement `FromRow` to define how they are built from a row, and
//! `query_one`/`query_all` cover the common single/multi-row patterns.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// A corrupted or hand-edited row surfaces as a query error instead of a panic.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const LICENSE_COLS: &str =
    "id, email, plan, status, max_activations, created_at, deactivated_at";

/// License columns qualified with `l.` plus a live activation count subquery.
pub const LICENSE_SUMMARY_COLS: &str = "l.id, l.email, l.plan, l.status, l.max_activations, l.created_at, l.deactivated_at, (SELECT COUNT(*) FROM activations a WHERE a.license_id = l.id)";

pub const ACTIVATION_COLS: &str = "id, license_id, device_id, activated_at, ip_address";

pub const VERIFICATION_LOG_COLS: &str =
    "id, license_id, device_id, ip_address, timestamp, valid, reason";

// ============ FromRow Implementations ============

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            email: row.get(1)?,
            plan: parse_enum(row, 2, "plan")?,
            status: parse_enum(row, 3, "status")?,
            max_activations: row.get(4)?,
            created_at: row.get(5)?,
            deactivated_at: row.get(6)?,
        })
    }
}

impl FromRow for LicenseSummary {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseSummary {
            license: License::from_row(row)?,
            activation_count: row.get(7)?,
        })
    }
}

impl FromRow for Activation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Activation {
            id: row.get(0)?,
            license_id: row.get(1)?,
            device_id: row.get(2)?,
            activated_at: row.get(3)?,
            ip_address: row.get(4)?,
        })
    }
}

impl FromRow for VerificationLogEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(VerificationLogEntry {
            id: row.get(0)?,
            license_id: row.get(1)?,
            device_id: row.get(2)?,
            ip_address: row.get(3)?,
            timestamp: row.get(4)?,
            valid: row.get(5)?,
            reason: row.get(6)?,
        })
    }
}

impl FromRow for PlanStatusCount {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(PlanStatusCount {
            plan: parse_enum(row, 0, "plan")?,
            status: parse_enum(row, 1, "status")?,
            count: row.get(2)?,
        })
    }
}
