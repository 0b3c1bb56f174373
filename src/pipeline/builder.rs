//! Builder for configuring generator instances

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::Generator;
use crate::cache::{CacheConfig, ContentCache};
use crate::history::HistoryStore;
use crate::providers::{ChatProvider, OpenAiClient};
use crate::templates::TemplateRegistry;
use crate::{Result, SkaldError};

/// Main entry point for creating generator instances.
pub struct Skald;

impl Skald {
    /// Create a new builder for configuring the generator.
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }
}

/// Where the history store comes from.
enum HistorySource {
    InMemory,
    Path(PathBuf),
    Shared(Arc<HistoryStore>),
}

/// Builder for configuring generator instances.
///
/// Only a provider is mandatory. Defaults: built-in templates, a
/// 100-entry / one-hour cache, and an in-memory history store.
pub struct GeneratorBuilder {
    registry: Option<TemplateRegistry>,
    provider: Option<Arc<dyn ChatProvider>>,
    cache_config: CacheConfig,
    history: HistorySource,
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            provider: None,
            cache_config: CacheConfig::default(),
            history: HistorySource::InMemory,
        }
    }

    /// Use a custom template registry instead of the built-in one.
    pub fn templates(mut self, registry: TemplateRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use any [`ChatProvider`] as the remote backend.
    pub fn provider(mut self, provider: impl ChatProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Use a provider that is shared with other owners.
    pub fn shared_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Configure an OpenAI-compatible endpoint as the backend.
    pub fn openai(
        self,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let mut client = OpenAiClient::with_base_url(api_key, base_url);
        if let Some(timeout) = timeout {
            client = client.timeout(timeout);
        }
        self.provider(client)
    }

    /// Set the content cache bound and TTL.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Persist history to a SQLite file, opened at build time.
    pub fn history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history = HistorySource::Path(path.into());
        self
    }

    /// Use an already opened history store.
    pub fn history(mut self, store: Arc<HistoryStore>) -> Self {
        self.history = HistorySource::Shared(store);
        self
    }

    /// Build the generator.
    pub fn build(self) -> Result<Generator> {
        let provider = self.provider.ok_or(SkaldError::NoProvider)?;

        if self.cache_config.max_entries == 0 {
            return Err(SkaldError::Configuration(
                "cache max_entries must be at least 1".to_string(),
            ));
        }

        let registry = match self.registry {
            Some(registry) => registry,
            None => TemplateRegistry::builtin()?,
        };
        if registry.is_empty() {
            return Err(SkaldError::Configuration(
                "template registry is empty".to_string(),
            ));
        }

        let history = match self.history {
            HistorySource::InMemory => Arc::new(HistoryStore::open_in_memory()?),
            HistorySource::Path(path) => Arc::new(HistoryStore::open(&path)?),
            HistorySource::Shared(store) => store,
        };

        Ok(Generator::new(
            Arc::new(registry),
            provider,
            ContentCache::new(&self.cache_config),
            history,
        ))
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
