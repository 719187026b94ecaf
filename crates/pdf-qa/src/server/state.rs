//! Application state for the HTTP server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::session::{SessionManager, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Pipelines shared by every session
    manager: SessionManager,
    /// Live sessions
    sessions: SessionStore,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    pub fn new(config: AppConfig, manager: SessionManager) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                manager,
                sessions: SessionStore::new(),
                ready: RwLock::new(false),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn manager(&self) -> &SessionManager {
        &self.inner.manager
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
