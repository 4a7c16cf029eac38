use axum::extract::State;

use crate::error::Result;
use crate::extractors::{AdminCredential, Json};
use crate::models::Stats;
use crate::state::AppState;

pub async fn get_stats(
    State(state): State<AppState>,
    credential: AdminCredential,
) -> Result<Json<Stats>> {
    let stats = state.engine.stats(credential.as_deref())?;
    Ok(Json(stats))
}
