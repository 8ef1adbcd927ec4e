//! Shop Console Core - tag merge engine and shared types.
//!
//! This crate provides the logic shared by the Shop Console components:
//! - `admin` - HTTP service with the Shopify proxies and tag automation upload
//! - `cli` - Command-line drivers for every tool
//!
//! # Architecture
//!
//! The core crate performs no network or file I/O. Inputs arrive as bytes and
//! outputs leave as strings, so every tool can be driven from a request
//! handler, a terminal or a test.
//!
//! # Modules
//!
//! - [`tagging`] - Merge per-collection tags into a master product export
//! - [`codec`] - CSV and ZIP capabilities injected into the engine
//! - [`collections`] - Smart collection authoring for `smart_collections.json`
//! - [`types`] - Rows, collection shapes, import results and run IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod collections;
pub mod tagging;
pub mod types;

pub use types::*;
