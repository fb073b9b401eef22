//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::SessionRegistry;
use crate::store::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: SessionStore,
    pub registry: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config, store: SessionStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
            registry: Arc::new(SessionRegistry::new()),
        }
    }
}
