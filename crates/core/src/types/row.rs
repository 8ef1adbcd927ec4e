//! Header-indexed tabular records.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Column holding the product handle used to match rows.
pub const HANDLE_COLUMN: &str = "Handle";

/// Lower-case handle column accepted in per-collection exports.
pub const HANDLE_COLUMN_LOWER: &str = "handle";

/// Column holding the product title.
pub const TITLE_COLUMN: &str = "Title";

/// Column holding the comma-separated tag list.
pub const TAGS_COLUMN: &str = "Tags";

/// One record of a tabular dataset.
///
/// Fields keep the order in which their columns appeared in the source so
/// re-encoding reproduces the original column layout. Columns the engine does
/// not know about are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, String>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a column, if the row has it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Set a column value, appending the column if it is new.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Iterate over column names in source order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(column, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of columns present on this row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no columns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The master-row `Handle`, when present and non-empty.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.get(HANDLE_COLUMN).filter(|h| !h.is_empty())
    }

    /// The handle of a collection export row.
    ///
    /// Exports disagree on the header casing, so `Handle` is tried first and
    /// `handle` second; the first non-empty value wins.
    #[must_use]
    pub fn collection_handle(&self) -> Option<&str> {
        self.handle().or_else(|| {
            self.get(HANDLE_COLUMN_LOWER)
                .filter(|h| !h.is_empty())
        })
    }

    /// The `Title` value, or an empty string.
    #[must_use]
    pub fn title(&self) -> &str {
        self.get(TITLE_COLUMN).unwrap_or_default()
    }

    /// The raw `Tags` value, or an empty string.
    #[must_use]
    pub fn tags(&self) -> &str {
        self.get(TAGS_COLUMN).unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A decoded dataset: its header and its records.
///
/// The header is kept separately from the rows so a file with no records
/// still encodes with its original columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Header columns in source order.
    pub columns: Vec<String>,
    /// Records in source order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from a header and its rows.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Columns to write when encoding.
    ///
    /// The declared header first, then any column a row added, in first-seen
    /// order.
    #[must_use]
    pub fn header(&self) -> IndexSet<&str> {
        let mut header: IndexSet<&str> = self.columns.iter().map(String::as_str).collect();
        for row in &self.rows {
            header.extend(row.columns());
        }
        header
    }
}
