//! Application state shared across handlers.

use std::sync::Arc;

use memos_core::TokenAuthenticator;
use memos_store::{ObjectStore, Store};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Database store.
    store: Arc<Store>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Token signer and verifier for `config.jwt_secret`.
    tokens: Arc<TokenAuthenticator>,
    /// Blob storage for uploaded resources.
    objects: Arc<dyn ObjectStore>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: ServerConfig, objects: Arc<dyn ObjectStore>) -> Self {
        let tokens = TokenAuthenticator::with_ttl(&config.jwt_secret, config.jwt_expiry_secs);
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            objects,
        }
    }

    /// Get a reference to the database store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenAuthenticator {
        &self.tokens
    }

    /// Get a reference to the object store.
    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
