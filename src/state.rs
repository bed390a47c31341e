//! Application state management

use std::sync::Arc;

use crate::cache::BlockCache;
use crate::config::Config;
use crate::events::EventBus;
use crate::html::LuaSandbox;
use crate::lookup::BlockResolver;
use crate::settings::{RenderSettings, SettingsSource};
use crate::store::DocumentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    resolver: BlockResolver,
    settings: Arc<dyn SettingsSource>,
    events: EventBus,
    sandbox: LuaSandbox,
}

impl AppState {
    /// Create a new application state
    ///
    /// The block cache is created here, once, with the configured TTL.
    pub fn new(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        settings: Arc<dyn SettingsSource>,
        events: EventBus,
    ) -> Self {
        let cache = BlockCache::new(config.cache.ttl);
        Self {
            inner: Arc::new(AppStateInner {
                resolver: BlockResolver::new(store, cache),
                settings,
                events,
                sandbox: LuaSandbox::default(),
            }),
        }
    }

    /// Get the cache-fronted block resolver
    pub fn resolver(&self) -> &BlockResolver {
        &self.inner.resolver
    }

    /// Get the block cache
    pub fn cache(&self) -> &BlockCache {
        self.inner.resolver.cache()
    }

    /// Get the document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        self.inner.resolver.store()
    }

    /// Get the document event bus
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Get the custom renderer sandbox limits
    pub fn sandbox(&self) -> &LuaSandbox {
        &self.inner.sandbox
    }

    /// Load the current renderer settings
    pub async fn render_settings(&self) -> RenderSettings {
        self.inner.settings.render_settings().await
    }
}
