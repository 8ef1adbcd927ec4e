//! Tag merge engine.
//!
//! Given a master product export and an archive of per-collection exports,
//! adds one tag per collection (`prefix` + file name) to every product that
//! appears in that collection, leaving the rest of the master file untouched.
//!
//! The work is split into pure steps:
//!
//! - [`build_tag_assignment`] scans the archive into a [`TagAssignment`]
//! - [`apply_tags`] merges the assignment into the master rows
//! - [`export_csv`] re-encodes the rows
//!
//! [`TagAutomation`] chains them into a run with phases and a log.

mod apply;
mod assignment;
mod run;

pub use apply::{ApplyOutcome, RowGate, apply_tags, parse_tags};
pub use assignment::{
    ArchiveScan, ScannedCollection, SkippedEntry, TagAssignment, build_tag_assignment,
    is_collection_entry, tag_name,
};
pub use run::{RunPhase, RunReport, TagAutomation, TagRunError, TagRunInput, TagRunOutput};

use crate::codec::{CodecError, TableCodec};
use crate::types::Table;

/// File name of the updated master export.
pub const OUTPUT_FILE_NAME: &str = "Master_Updated_With_Tags.csv";

/// Prefix used when the operator does not choose one.
pub const DEFAULT_TAG_PREFIX: &str = "cus-";

/// Encode the full table, passthrough columns included.
///
/// The master header is written as read; a `Tags` column the merge had to
/// add comes last.
///
/// # Errors
///
/// Returns `CodecError` if the codec cannot write the rows.
pub fn export_csv<C: TableCodec + ?Sized>(codec: &C, table: &Table) -> Result<String, CodecError> {
    codec.encode(table)
}
