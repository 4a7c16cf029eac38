use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::error::Result;
use crate::extractors::Json;
use crate::models::VerificationResult;
use crate::state::AppState;
use crate::util::client_ip;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub license_id: String,
    pub device_id: String,
}

/// Negative results are a 200 with `valid: false` and a reason.
pub async fn verify_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>> {
    let ip = client_ip(&headers);
    let result = state
        .engine
        .verify(&req.license_id, &req.device_id, ip.as_deref())?;
    Ok(Json(result))
}
