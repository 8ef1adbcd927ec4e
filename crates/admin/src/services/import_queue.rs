//! Sequential smart collection import.
//!
//! Collections are created one at a time with a fixed pause after each
//! request. A failed item is recorded and the queue moves on; a batch is never
//! aborted. Progress is published on a `watch` channel so the HTTP layer and
//! the CLI can observe a running import.

use std::collections::VecDeque;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::{Map, Value};
use shop_console_core::{ImportProgress, ImportResults, UNKNOWN_HANDLE};
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, instrument, warn};

use crate::shopify::{AdminRestClient, normalize_shop_domain};

/// The shop an import writes to.
#[derive(Clone)]
pub struct ImportTarget {
    shop: String,
    access_token: SecretString,
}

impl std::fmt::Debug for ImportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportTarget")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl ImportTarget {
    /// Create a target from operator input.
    ///
    /// The shop URL is reduced to its domain.
    #[must_use]
    pub fn new(shop_url: &str, access_token: SecretString) -> Self {
        Self {
            shop: normalize_shop_domain(shop_url),
            access_token,
        }
    }

    /// The shop domain.
    #[must_use]
    pub fn shop(&self) -> &str {
        &self.shop
    }
}

/// Imports smart collections one by one.
#[derive(Debug)]
pub struct ImportQueue {
    client: AdminRestClient,
    delay: Duration,
    progress: watch::Sender<ImportProgress>,
}

impl ImportQueue {
    /// Create a queue that waits `delay` after each request.
    #[must_use]
    pub fn new(client: AdminRestClient, delay: Duration) -> Self {
        let (progress, _) = watch::channel(ImportProgress::default());
        Self {
            client,
            delay,
            progress,
        }
    }

    /// Watch the progress of the current or most recent import.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ImportProgress> {
        self.progress.subscribe()
    }

    /// Progress of the current or most recent import.
    #[must_use]
    pub fn progress(&self) -> ImportProgress {
        *self.progress.borrow()
    }

    /// Import every collection in order.
    ///
    /// Always completes. Per-item failures are reported in the returned
    /// results with the item's `handle` (or `"unknown"`).
    #[instrument(skip(self, target, collections), fields(shop = %target.shop, total = collections.len()))]
    pub async fn run(&self, target: &ImportTarget, collections: Vec<Map<String, Value>>) -> ImportResults {
        let total = collections.len();
        let mut jobs: VecDeque<Map<String, Value>> = collections.into();
        let mut results = ImportResults::default();
        let mut pacer = self.pacer();

        self.progress.send_replace(ImportProgress::starting(total));
        info!("Starting collection import");

        while let Some(collection) = jobs.pop_front() {
            let handle = handle_of(&collection);

            match self
                .client
                .create_smart_collection(&target.shop, &target.access_token, collection)
                .await
            {
                Ok(()) => {
                    info!(handle = %handle, "Imported collection");
                    results.record_success();
                }
                Err(e) => {
                    warn!(handle = %handle, error = %e, "Failed to import collection");
                    results.record_failure(handle, e.to_string());
                }
            }

            self.progress
                .send_replace(ImportProgress::from((&results, total)));

            if !jobs.is_empty()
                && let Some(pacer) = pacer.as_mut()
            {
                pacer.reset();
                pacer.tick().await;
            }
        }

        info!(
            success = results.success,
            failed = results.failed,
            "Collection import finished"
        );
        results
    }

    /// Interval that spaces requests, or `None` when no delay is configured.
    fn pacer(&self) -> Option<Interval> {
        if self.delay.is_zero() {
            return None;
        }
        let mut interval = tokio::time::interval(self.delay);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(interval)
    }
}

/// The handle reported for an item, `"unknown"` when it has none.
fn handle_of(collection: &Map<String, Value>) -> String {
    collection
        .get("handle")
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
        .unwrap_or(UNKNOWN_HANDLE)
        .to_string()
}
