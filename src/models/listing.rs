//! Admin license listing: query window and response page.

use serde::{Deserialize, Serialize};

use super::LicenseSummary;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 100;

/// `?limit&offset` for `GET /admin/licenses`. Out-of-range values are clamped
/// rather than rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListLicensesQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ListLicensesQuery {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// One page of licenses, newest first, each with its live seat count.
#[derive(Debug, Clone, Serialize)]
pub struct LicensePage {
    pub licenses: Vec<LicenseSummary>,
    /// Licenses in the store, across all pages
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl LicensePage {
    /// True when licenses remain past this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.licenses.len() as i64) < self.total
    }
}
