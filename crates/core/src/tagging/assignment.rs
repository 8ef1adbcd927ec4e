//! Building the handle-to-tags mapping from collection exports.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::codec::{ArchiveEntry, TableCodec};

const CSV_SUFFIX: &str = ".csv";
const MACOS_METADATA_PREFIX: &str = "__MACOSX";

/// Tags to add per product handle.
///
/// Each handle maps to an insertion-ordered set, so a tag is recorded at most
/// once and tags come out in the order their collection files were scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAssignment {
    tags: IndexMap<String, IndexSet<String>>,
}

impl TagAssignment {
    /// Create an empty assignment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `handle` should carry `tag`.
    pub fn insert(&mut self, handle: impl Into<String>, tag: impl Into<String>) {
        self.tags
            .entry(handle.into())
            .or_default()
            .insert(tag.into());
    }

    /// Union another assignment into this one.
    ///
    /// Merging is associative and the per-handle result is a set union, so
    /// entries scanned independently can be combined in any grouping.
    pub fn merge(&mut self, other: Self) {
        for (handle, tags) in other.tags {
            self.tags.entry(handle).or_default().extend(tags);
        }
    }

    /// Tags assigned to `handle`, if any.
    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&IndexSet<String>> {
        self.tags.get(handle)
    }

    /// Whether `handle` has any assigned tags.
    #[must_use]
    pub fn contains(&self, handle: &str) -> bool {
        self.tags.contains_key(handle)
    }

    /// Number of distinct handles with assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no handle has assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// A collection export that contributed tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedCollection {
    /// Archive entry name.
    pub entry: String,
    /// Tag derived from the entry name.
    pub tag: String,
    /// Rows in the entry that carried a handle.
    pub handles: usize,
}

/// An archive entry that was ignored, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub entry: String,
    pub reason: String,
}

/// Result of scanning an archive of collection exports.
#[derive(Debug, Clone, Default)]
pub struct ArchiveScan {
    /// Handle to tags mapping built from every readable collection.
    pub assignment: TagAssignment,
    /// Collection exports that were read, in archive order.
    pub collections: Vec<ScannedCollection>,
    /// Collection exports that could not be read or parsed.
    pub skipped: Vec<SkippedEntry>,
}

/// Whether an archive entry is a collection export.
///
/// Only `.csv` files count; the `__MACOSX` resource-fork copies macOS adds to
/// archives are ignored.
#[must_use]
pub fn is_collection_entry(name: &str) -> bool {
    name.ends_with(CSV_SUFFIX) && !name.starts_with(MACOS_METADATA_PREFIX)
}

/// Tag derived from an archive entry: `prefix` followed by the entry name
/// without its `.csv` suffix.
#[must_use]
pub fn tag_name(prefix: &str, entry_name: &str) -> String {
    let stem = entry_name.strip_suffix(CSV_SUFFIX).unwrap_or(entry_name);
    format!("{prefix}{stem}")
}

/// Scan archive entries and build the tag assignment.
///
/// Entries are visited once, in order. An entry that cannot be read or parsed
/// contributes nothing and is listed in [`ArchiveScan::skipped`]; the rest of
/// the batch is still processed.
pub fn build_tag_assignment<C: TableCodec + ?Sized>(
    codec: &C,
    entries: &[ArchiveEntry],
    prefix: &str,
) -> ArchiveScan {
    let mut scan = ArchiveScan::default();

    for entry in entries {
        if !is_collection_entry(&entry.name) {
            tracing::trace!(entry = %entry.name, "Ignoring non-collection entry");
            continue;
        }

        let rows = match &entry.text {
            Ok(text) => codec.decode(text).map(|table| table.rows),
            Err(e) => {
                tracing::warn!(entry = %entry.name, error = %e, "Unreadable collection entry");
                scan.skipped.push(SkippedEntry {
                    entry: entry.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(entry = %entry.name, error = %e, "Unparsable collection entry");
                scan.skipped.push(SkippedEntry {
                    entry: entry.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let tag = tag_name(prefix, &entry.name);
        let mut handles = 0;
        for handle in rows.iter().filter_map(crate::types::Row::collection_handle) {
            scan.assignment.insert(handle, tag.as_str());
            handles += 1;
        }

        tracing::debug!(entry = %entry.name, tag = %tag, handles, "Scanned collection");
        scan.collections.push(ScannedCollection {
            entry: entry.name.clone(),
            tag,
            handles,
        });
    }

    scan
}
