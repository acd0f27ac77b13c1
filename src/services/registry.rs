//! Provider registry: maps a provider name to its implementation so handlers
//! never branch on provider names themselves.

use crate::services::provider::StorageProvider;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("provider `{0}` is already registered")]
    AlreadyRegistered(String),
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn StorageProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under its own [`StorageProvider::name`].
    ///
    /// Fails if the name is already taken.
    pub fn register(&mut self, provider: Arc<dyn StorageProvider>) -> Result<(), RegistryError> {
        let name = provider.name().to_string();
        if self.providers.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        tracing::info!("registered storage provider `{}`", name);
        self.providers.insert(name, provider);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn StorageProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
