use std::sync::Arc;
use crate::config::Config;
use crate::services::AuthBackend;

// Shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthBackend,
}

impl AppState {
    pub fn new(config: Config, auth: AuthBackend) -> Self {
        Self {
            config: Arc::new(config),
            auth,
        }
    }
}
