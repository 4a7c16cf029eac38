mod activate;
mod deactivate;
mod release;
mod verify;

pub use activate::*;
pub use deactivate::*;
pub use release::*;
pub use verify::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/activate", post(activate_license))
        .route("/verify", post(verify_license))
        // Admin secret or device proof, depending on DEACTIVATE_AUTH
        .route("/deactivate", post(deactivate_license))
        .route("/release", post(release_device))
}
