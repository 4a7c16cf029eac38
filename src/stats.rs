//! License statistics.

use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::error::Result;
use crate::models::{LicenseStatus, PlanStatusCount, Stats};

/// Window for `recent_verifications`.
const RECENT_WINDOW_SECS: i64 = 7 * 86400;

/// Compute stats from the license store and, when given, the verification log.
///
/// The license and activation counts are read inside one deferred transaction
/// so they describe the same snapshot.
pub fn compute(conn: &mut Connection, audit: Option<&Connection>) -> Result<Stats> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
    let rows = queries::count_licenses_by_plan_and_status(&tx)?;
    let total_activations = queries::count_all_activations(&tx)?;
    tx.commit()?;

    let recent_verifications = match audit {
        Some(audit) => queries::count_verifications_since(audit, queries::now() - RECENT_WINDOW_SECS)?,
        None => 0,
    };

    Ok(aggregate(&rows, total_activations, recent_verifications))
}

/// Fold grouped `(plan, status, count)` rows into a [`Stats`] summary.
///
/// `by_plan` only counts active licenses.
pub fn aggregate(rows: &[PlanStatusCount], total_activations: i64, recent_verifications: i64) -> Stats {
    let mut stats = Stats {
        total_activations,
        recent_verifications,
        ..Default::default()
    };

    for row in rows {
        stats.total_licenses += row.count;
        match row.status {
            LicenseStatus::Active => {
                stats.active_licenses += row.count;
                *stats.by_plan.entry(row.plan).or_insert(0) += row.count;
            }
            LicenseStatus::Deactivated => stats.deactivated_licenses += row.count,
        }
    }

    stats
}
