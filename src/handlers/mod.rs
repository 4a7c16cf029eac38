pub mod admin;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// All routes, without the tracing layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(admin::router())
        .with_state(state)
}
