use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::DeactivationProof;
use crate::error::Result;
use crate::extractors::{AdminCredential, Json};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    pub license_id: String,
    #[serde(default)]
    pub admin_secret: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub status: &'static str,
    pub released: usize,
}

pub async fn deactivate_license(
    State(state): State<AppState>,
    credential: AdminCredential,
    Json(req): Json<DeactivateRequest>,
) -> Result<Json<DeactivateResponse>> {
    let proof = DeactivationProof {
        admin_secret: credential.or_body(req.admin_secret.as_deref()).map(String::from),
        device_id: req.device_id,
    };

    let outcome = state.engine.deactivate(&req.license_id, &proof)?;

    Ok(Json(DeactivateResponse {
        status: "ok",
        released: outcome.released,
    }))
}
