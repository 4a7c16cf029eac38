use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractors::Json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    pub license_id: String,
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub status: &'static str,
    pub remaining_activations: u32,
}

/// Give up the seat held by one device, leaving the license active.
pub async fn release_device(
    State(state): State<AppState>,
    Json(req): Json<ReleaseRequest>,
) -> Result<Json<ReleaseResponse>> {
    let remaining_activations = state.engine.release(&req.license_id, &req.device_id)?;

    Ok(Json(ReleaseResponse {
        status: "ok",
        remaining_activations,
    }))
}
