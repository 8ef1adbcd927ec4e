//! Public storefront reads.

use reqwest::Client;
use serde::Deserialize;
use shop_console_core::ExtractedCollection;
use tracing::{debug, instrument, warn};

use super::ShopifyError;

/// Maximum page size accepted by `collections.json`.
const COLLECTIONS_PAGE_LIMIT: u32 = 250;

/// Turn operator input into a store base URL.
///
/// Adds `https://` when no scheme is given and drops one trailing slash.
///
/// # Errors
///
/// Returns `ShopifyError::InvalidUrl` if the result is not a valid URL.
pub fn normalize_store_url(raw: &str) -> Result<String, ShopifyError> {
    let trimmed = raw.trim();
    let mut base = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    if base.ends_with('/') {
        base.pop();
    }

    let parsed = url::Url::parse(&base).map_err(|e| ShopifyError::InvalidUrl(format!("{base}: {e}")))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ShopifyError::InvalidUrl(base));
    }
    Ok(base)
}

#[derive(Debug, Deserialize)]
struct CollectionsPage {
    collections: Vec<CollectionSummary>,
}

#[derive(Debug, Deserialize)]
struct CollectionSummary {
    title: String,
    handle: String,
}

/// Client for unauthenticated storefront endpoints.
#[derive(Debug, Clone, Default)]
pub struct StorefrontClient {
    client: Client,
}

impl StorefrontClient {
    /// Create a new storefront client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// List the collections a store publishes.
    ///
    /// Reads at most one page of 250 collections.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid, the request fails, the store
    /// answers with a non-success status, or the body is not a collections
    /// listing.
    #[instrument(skip(self))]
    pub async fn extract_collections(
        &self,
        store_url: &str,
    ) -> Result<Vec<ExtractedCollection>, ShopifyError> {
        let base = normalize_store_url(store_url)?;
        let endpoint = format!("{base}/collections.json?limit={COLLECTIONS_PAGE_LIMIT}");

        let response = self.client.get(&endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Store rejected collections request");
            return Err(ShopifyError::Upstream {
                status: status.as_u16(),
                message: "Failed to fetch from store".to_string(),
            });
        }

        let body = response.text().await?;
        let page: CollectionsPage = serde_json::from_str(&body)?;

        let collections: Vec<ExtractedCollection> = page
            .collections
            .into_iter()
            .map(|c| ExtractedCollection {
                url: format!("{base}/collections/{}", c.handle),
                title: c.title,
                handle: c.handle,
            })
            .collect();

        debug!(count = collections.len(), "Extracted collections");
        Ok(collections)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        assert_eq!(
            normalize_store_url("example.myshopify.com").unwrap(),
            "https://example.myshopify.com"
        );
    }

    #[test]
    fn test_normalize_strips_one_trailing_slash() {
        assert_eq!(
            normalize_store_url("https://example.com/").unwrap(),
            "https://example.com"
        );
        assert_eq!(
            normalize_store_url("http://127.0.0.1:8080").unwrap(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_store_url("https://").is_err());
        assert!(normalize_store_url("http://exa mple.com").is_err());
    }

    #[test]
    fn test_collections_page_ignores_extra_fields() {
        let page: CollectionsPage = serde_json::from_str(
            r#"{"collections":[{"id":1,"title":"Summer","handle":"summer","published_at":null}]}"#,
        )
        .unwrap();
        assert_eq!(page.collections.len(), 1);
        assert_eq!(page.collections[0].handle, "summer");
    }

    #[test]
    fn test_collections_page_requires_collections() {
        assert!(serde_json::from_str::<CollectionsPage>(r#"{"products":[]}"#).is_err());
    }
}
