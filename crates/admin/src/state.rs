//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::services::ImportQueue;
use crate::shopify::{AdminRestClient, StorefrontClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: ConsoleConfig,
    storefront: StorefrontClient,
    import_queue: ImportQueue,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        let admin = AdminRestClient::new(&config.shopify);
        let import_queue = ImportQueue::new(admin, config.shopify.import_delay);

        Self {
            inner: Arc::new(AppStateInner {
                storefront: StorefrontClient::new(),
                import_queue,
                config,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// Get a reference to the storefront client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the import queue.
    #[must_use]
    pub fn import_queue(&self) -> &ImportQueue {
        &self.inner.import_queue
    }
}
