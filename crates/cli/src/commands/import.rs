//! Bulk smart collection import command.
//!
//! # Usage
//!
//! ```bash
//! SHOPIFY_ACCESS_TOKEN=shpat_... sc-cli import --file smart_collections.json --shop demo.myshopify.com
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (or pass `--token`)
//! - `SHOPIFY_API_VERSION`, `SHOPIFY_ADMIN_SCHEME`, `IMPORT_DELAY_MS` - as
//!   for the console service

use std::path::Path;

use secrecy::SecretString;
use shop_console_admin::config::{ConfigError, ConsoleConfig};
use shop_console_admin::services::{ImportQueue, ImportTarget};
use shop_console_admin::shopify::AdminRestClient;
use shop_console_core::ImportResults;
use shop_console_core::collections::{CollectionError, parse_import_document};
use thiserror::Error;
use tokio::task::JoinHandle;

use super::{FileError, read_text};

/// Errors that can occur before an import starts.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Document(#[from] CollectionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Import every collection in `file` into `shop`.
///
/// Per-collection failures are reported in the results, not as an error.
pub async fn run(file: &Path, shop: &str, token: SecretString) -> Result<ImportResults, ImportError> {
    let collections = parse_import_document(&read_text(file)?)?;
    let config = ConsoleConfig::from_env()?;

    let queue = ImportQueue::new(
        AdminRestClient::new(&config.shopify),
        config.shopify.import_delay,
    );
    let target = ImportTarget::new(shop, token);

    let mut progress = queue.subscribe();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let p = *progress.borrow_and_update();
            tracing::info!(
                processed = p.processed,
                total = p.total,
                succeeded = p.succeeded,
                failed = p.failed,
                "Import progress"
            );
            if p.is_complete() {
                break;
            }
        }
    });

    let results = queue.run(&target, collections).await;
    drop(queue);
    finish_reporter(reporter).await;

    Ok(results)
}

/// Wait for the progress reporter, logging it if it panicked or was cancelled.
async fn finish_reporter(reporter: JoinHandle<()>) {
    if let Err(e) = reporter.await {
        tracing::warn!(error = %e, "Import progress reporter failed");
    }
}
