//! Shop Console service library.
//!
//! HTTP service behind the console's four tools:
//!
//! - Tag automation: merge collection membership into a master product CSV
//! - Collection extraction from a storefront's public listing
//! - Smart collection import through the Admin REST API
//! - Import progress reporting
//!
//! The service keeps no store credentials. Access tokens arrive with each
//! import request and are held as [`secrecy::SecretString`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

pub use config::{ConfigError, ConsoleConfig, LogFormat, ShopifyConfig};
pub use error::AppError;
pub use state::AppState;
