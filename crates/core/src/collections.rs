//! Smart collection authoring.
//!
//! Operators fill in a handle, a title and the tag a product must carry; each
//! draft becomes a smart collection with a single `tag equals <tag>` rule. The
//! accumulated set is written as `smart_collections.json`, the input of the
//! bulk importer.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{CollectionRule, SmartCollection, SortOrder};

/// File name of the authored collection set.
pub const SMART_COLLECTIONS_FILE_NAME: &str = "smart_collections.json";

/// Errors raised while authoring or loading collections.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A required draft field is blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// No collection exists at the given position.
    #[error("No collection at index {0}")]
    NoSuchIndex(usize),

    /// The document is valid JSON but not an array of collections.
    #[error("Invalid JSON format. Expected an array of collections.")]
    NotAnArray,

    /// JSON could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Form input for one smart collection.
#[derive(Debug, Clone, Default)]
pub struct SmartCollectionDraft {
    pub handle: String,
    pub title: String,
    pub body_html: String,
    pub sort_order: SortOrder,
    pub condition_tag: String,
}

impl SmartCollectionDraft {
    /// Validate the draft and build the collection.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::MissingField` when the handle, title or
    /// condition tag is blank.
    pub fn build(self) -> Result<SmartCollection, CollectionError> {
        if self.handle.trim().is_empty() {
            return Err(CollectionError::MissingField("handle"));
        }
        if self.title.trim().is_empty() {
            return Err(CollectionError::MissingField("title"));
        }
        if self.condition_tag.trim().is_empty() {
            return Err(CollectionError::MissingField("condition_tag"));
        }

        Ok(SmartCollection {
            handle: self.handle,
            title: self.title,
            body_html: self.body_html,
            sort_order: self.sort_order,
            rules: vec![CollectionRule::tag_equals(self.condition_tag)],
        })
    }
}

/// An ordered, editable list of smart collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartCollectionSet {
    collections: Vec<SmartCollection>,
}

impl SmartCollectionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a set previously written by [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `CollectionError` if the text is not a JSON array of smart
    /// collections.
    pub fn from_json(text: &str) -> Result<Self, CollectionError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_array() {
            return Err(CollectionError::NotAnArray);
        }
        Ok(Self {
            collections: serde_json::from_value(value)?,
        })
    }

    /// Validate a draft and append it, returning its index.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::MissingField` if the draft is incomplete.
    pub fn add(&mut self, draft: SmartCollectionDraft) -> Result<usize, CollectionError> {
        let collection = draft.build()?;
        tracing::debug!(handle = %collection.handle, "Added smart collection");
        self.collections.push(collection);
        Ok(self.collections.len() - 1)
    }

    /// Remove the collection at `index`.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::NoSuchIndex` if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<SmartCollection, CollectionError> {
        if index >= self.collections.len() {
            return Err(CollectionError::NoSuchIndex(index));
        }
        Ok(self.collections.remove(index))
    }

    /// Collections in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[SmartCollection] {
        &self.collections
    }

    /// Number of collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, CollectionError> {
        Ok(serde_json::to_string_pretty(&self.collections)?)
    }
}

/// Parse an import document into raw collection objects.
///
/// The importer passes collections through to Shopify as-is, so entries are
/// kept as JSON objects rather than [`SmartCollection`]s. Non-object entries
/// are rejected.
///
/// # Errors
///
/// Returns `CollectionError::NotAnArray` if the document is not an array of
/// objects, or `CollectionError::Json` if it is not valid JSON.
pub fn parse_import_document(text: &str) -> Result<Vec<Map<String, Value>>, CollectionError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                _ => Err(CollectionError::NotAnArray),
            })
            .collect(),
        _ => Err(CollectionError::NotAnArray),
    }
}
