use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractors::{AdminCredential, Json, Path, Query};
use crate::models::{Billing, CreateLicense, License, LicenseDetails, LicensePage, ListLicensesQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLicenseRequest {
    pub email: String,
    pub plan: String,
    #[serde(default)]
    pub max_activations: Option<u32>,
    #[serde(default)]
    pub admin_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateLicenseResponse {
    pub license: License,
    /// Billing category of the license's plan
    pub billing: Billing,
}

pub async fn create_license(
    State(state): State<AppState>,
    credential: AdminCredential,
    Json(req): Json<CreateLicenseRequest>,
) -> Result<Json<CreateLicenseResponse>> {
    let input = CreateLicense {
        email: req.email,
        plan: req.plan,
        max_activations: req.max_activations,
    };
    let license = state
        .engine
        .create(&input, credential.or_body(req.admin_secret.as_deref()))?;

    let billing = license.plan.billing();
    Ok(Json(CreateLicenseResponse { license, billing }))
}

pub async fn list_licenses(
    State(state): State<AppState>,
    credential: AdminCredential,
    Query(query): Query<ListLicensesQuery>,
) -> Result<Json<LicensePage>> {
    let page = state.engine.list_licenses(credential.as_deref(), &query)?;
    Ok(Json(page))
}

pub async fn get_license(
    State(state): State<AppState>,
    credential: AdminCredential,
    Path(license_id): Path<String>,
) -> Result<Json<LicenseDetails>> {
    let details = state.engine.get_license(&license_id, credential.as_deref())?;
    Ok(Json(details))
}
