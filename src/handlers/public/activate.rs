use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractors::Json;
use crate::models::Activation;
use crate::state::AppState;
use crate::util::client_ip;

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub license_id: String,
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub status: &'static str,
    pub activation: Activation,
}

pub async fn activate_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>> {
    let ip = client_ip(&headers);
    let activation = state
        .engine
        .activate(&req.license_id, &req.device_id, ip.as_deref())?;

    Ok(Json(ActivateResponse {
        status: "active",
        activation,
    }))
}
