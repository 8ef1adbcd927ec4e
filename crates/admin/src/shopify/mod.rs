//! Shopify HTTP clients.
//!
//! - [`StorefrontClient`] reads a store's public `collections.json`.
//! - [`AdminRestClient`] creates smart collections through the Admin REST API
//!   with a caller-supplied access token.
//!
//! Neither client holds store credentials: the shop and token come with each
//! request and are never logged.

mod admin;
mod storefront;

pub use admin::{AdminRestClient, normalize_shop_domain, sanitize_payload};
pub use storefront::{StorefrontClient, normalize_store_url};

use thiserror::Error;

/// Errors that can occur when talking to a Shopify store.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("{message}")]
    Upstream {
        /// HTTP status returned by the store.
        status: u16,
        /// Error text reported to the operator.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The store address could not be turned into a URL.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

impl ShopifyError {
    /// HTTP status returned by the store, if it answered.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
