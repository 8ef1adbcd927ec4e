//! Storefront collection extraction command.
//!
//! # Usage
//!
//! ```bash
//! sc-cli extract example.myshopify.com
//! sc-cli extract example.myshopify.com --search summer
//! sc-cli extract --cached --search summer
//! sc-cli extract --clear
//! ```
//!
//! Every successful extraction replaces the cache file; `--cached` reads it
//! back without contacting the store.

use std::path::Path;

use shop_console_admin::shopify::{ShopifyError, StorefrontClient};
use shop_console_core::{ExtractedCollection, filter_by_title};
use thiserror::Error;

use super::{FileError, read_text, write_text};

/// Default cache location, relative to the working directory.
pub const DEFAULT_CACHE_FILE: &str = "collections_cache.json";

/// Errors that can occur during extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error("Invalid cache file: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("No collections found or store is password protected.")]
    NoCollections,

    #[error("No cached collections at {0}")]
    NoCache(String),
}

/// Fetch a store's collections and replace the cache.
pub async fn fetch(url: &str, cache: &Path) -> Result<Vec<ExtractedCollection>, ExtractError> {
    let collections = StorefrontClient::new().extract_collections(url).await?;
    if collections.is_empty() {
        return Err(ExtractError::NoCollections);
    }
    write_text(cache, &serde_json::to_string_pretty(&collections)?)?;
    tracing::info!(count = collections.len(), cache = %cache.display(), "Cached collections");
    Ok(collections)
}

/// Read the collections saved by the last extraction.
pub fn cached(cache: &Path) -> Result<Vec<ExtractedCollection>, ExtractError> {
    if !cache.exists() {
        return Err(ExtractError::NoCache(cache.display().to_string()));
    }
    Ok(serde_json::from_str(&read_text(cache)?)?)
}

/// Delete the cache file. Returns whether there was one.
pub fn clear(cache: &Path) -> Result<bool, ExtractError> {
    match std::fs::remove_file(cache) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(FileError {
            path: cache.to_path_buf(),
            source,
        }
        .into()),
    }
}

/// One display line per collection matching `search`.
#[must_use]
pub fn describe(collections: &[ExtractedCollection], search: Option<&str>) -> Vec<String> {
    filter_by_title(collections, search.unwrap_or_default())
        .into_iter()
        .map(|c| format!("{}\t{}\t{}", c.title, c.handle, c.url))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::scratch_path;

    fn collection(title: &str, handle: &str) -> ExtractedCollection {
        ExtractedCollection {
            title: title.to_string(),
            handle: handle.to_string(),
            url: format!("https://example.com/collections/{handle}"),
        }
    }

    #[test]
    fn test_cache_round_trip_and_clear() {
        let cache = scratch_path("collections_cache.json");
        let collections = vec![collection("Summer", "summer")];
        std::fs::write(&cache, serde_json::to_string(&collections).unwrap()).unwrap();

        assert_eq!(cached(&cache).unwrap(), collections);
        assert!(clear(&cache).unwrap());
        assert!(!clear(&cache).unwrap());
        assert!(matches!(cached(&cache), Err(ExtractError::NoCache(_))));
    }

    #[test]
    fn test_describe_filters_by_title() {
        let collections = vec![collection("Summer Sale", "summer"), collection("Winter", "winter")];
        let lines = describe(&collections, Some("SALE"));
        assert_eq!(
            lines,
            vec!["Summer Sale\tsummer\thttps://example.com/collections/summer".to_string()]
        );
        assert_eq!(describe(&collections, None).len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let cache = scratch_path("invalid_url_cache.json");
        let err = fetch("https://", &cache).await.unwrap_err();
        assert!(matches!(err, ExtractError::Shopify(ShopifyError::InvalidUrl(_))));
        assert!(!cache.exists());
    }
}
