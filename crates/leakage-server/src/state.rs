use std::sync::Arc;

use leakage_config::Settings;

use crate::services::model::ClaimsModel;

/// Shared, read-only state handed to every handler.
pub struct ServerState {
    pub model: Arc<dyn ClaimsModel>,
    pub settings: Settings,
}

impl ServerState {
    pub fn new(model: Arc<dyn ClaimsModel>, settings: Settings) -> Self {
        Self { model, settings }
    }
}
