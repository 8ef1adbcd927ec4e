//! Business logic services for the console.
//!
//! # Services
//!
//! - `import_queue` - Rate-limited sequential smart collection import

pub mod import_queue;

pub use import_queue::{ImportQueue, ImportTarget};
