//! Admin routes. Every handler here requires the admin secret, sent as
//! `Authorization: Bearer <secret>` (POST bodies may carry `admin_secret`
//! instead). With no secret configured they all answer 401.

mod licenses;
mod stats;

pub use licenses::*;
pub use stats::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/create", post(create_license))
        .route("/admin/licenses", get(list_licenses))
        .route("/admin/licenses/{license_id}", get(get_license))
        .route("/admin/stats", get(get_stats))
}
