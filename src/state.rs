use std::sync::Arc;

use crate::engine::LicenseEngine;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LicenseEngine>,
}

impl AppState {
    pub fn new(engine: LicenseEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
