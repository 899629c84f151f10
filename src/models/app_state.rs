use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::{GameStore, InMemoryGameStore};
use crate::websocket::{ConnectionRegistry, SessionCoordinator};

/// Application state shared between connections. Built once by the server's
/// composition root; nothing here is global.
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<dyn GameStore>,
    pub coordinator: SessionCoordinator,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn GameStore>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let coordinator = SessionCoordinator::new(store.clone(), registry);
        Self {
            config,
            store,
            coordinator,
        }
    }

    /// State backed by the in-memory store.
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(config, Arc::new(InMemoryGameStore::new()))
    }
}
