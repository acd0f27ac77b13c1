//! Shared application state injected into every handler.

use std::{sync::Arc, time::Duration};

use crate::{
    errors::AppError,
    handlers::session::Session,
    services::{
        oauth_state::OAuthStateStore,
        provider::StorageProvider,
        registry::ProviderRegistry,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub oauth_states: Arc<OAuthStateStore>,
    /// Provider used when a session carries no `provider` cookie.
    pub default_provider: String,
}

impl AppState {
    pub fn new(
        registry: ProviderRegistry,
        default_provider: impl Into<String>,
        state_ttl: Duration,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            oauth_states: Arc::new(OAuthStateStore::new(state_ttl)),
            default_provider: default_provider.into(),
        }
    }

    /// Provider the session's token belongs to.
    pub fn provider_for(&self, session: &Session) -> Result<Arc<dyn StorageProvider>, AppError> {
        let name = session.provider.as_deref().unwrap_or(&self.default_provider);
        self.registry
            .get(name)
            .ok_or_else(|| AppError::bad_request(format!("Unsupported provider: {}", name)))
    }
}
