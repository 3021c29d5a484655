use crate::config::AppConfig;
use crate::session::SessionRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<Mutex<SessionRegistry>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sessions = SessionRegistry::new(config.session_ttl);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }
}
