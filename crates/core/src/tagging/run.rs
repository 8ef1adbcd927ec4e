//! End-to-end tag automation runs.
//!
//! A run walks a fixed sequence of phases:
//!
//! ```text
//! Idle -> ParsingMaster -> ScanningArchive -> ApplyingTags -> Exporting -> Done
//!   \__________\_______________\________________\______________\-> Failed
//! ```
//!
//! `Done` and `Failed` are terminal. Each run gets a [`RunId`] and a
//! human-readable log mirroring its `tracing` events, so drivers can show the
//! operator what happened without a log collector.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::{RowGate, apply_tags, build_tag_assignment, export_csv, is_collection_entry};
use crate::codec::{ArchiveReader, CodecError, TableCodec, decode_text};
use crate::types::{RunId, Table};

/// Phase of a tag automation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    ParsingMaster,
    ScanningArchive,
    ApplyingTags,
    Exporting,
    Done,
    Failed,
}

impl RunPhase {
    /// Whether the run has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The phase that follows this one on success.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::ParsingMaster),
            Self::ParsingMaster => Some(Self::ScanningArchive),
            Self::ScanningArchive => Some(Self::ApplyingTags),
            Self::ApplyingTags => Some(Self::Exporting),
            Self::Exporting => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Whether moving from this phase to `to` is allowed.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }
}

/// Errors that end a tag automation run.
#[derive(Debug, Error)]
pub enum TagRunError {
    /// A required input was not supplied.
    #[error("Missing input: {0}")]
    InputMissing(&'static str),

    /// The master CSV could not be parsed.
    #[error("Failed to parse master CSV: {0}")]
    MasterDecode(#[source] CodecError),

    /// The collections archive could not be opened.
    #[error("Failed to open collections archive: {0}")]
    ArchiveOpen(#[source] CodecError),

    /// The updated CSV could not be generated.
    #[error("Failed to generate CSV: {0}")]
    Export(#[source] CodecError),
}

impl TagRunError {
    /// Whether the error was caused by the caller's input rather than the
    /// system.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InputMissing(_))
    }

    /// Whether the error was caused by undecodable input files.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(self, Self::MasterDecode(_) | Self::ArchiveOpen(_))
    }
}

/// Inputs of one run.
#[derive(Debug, Clone, Copy)]
pub struct TagRunInput<'a> {
    /// Master product CSV bytes.
    pub master: Option<&'a [u8]>,
    /// Collections ZIP bytes.
    pub archive: Option<&'a [u8]>,
    /// Prefix prepended to every derived tag.
    pub prefix: &'a str,
}

/// Successful output of a run.
#[derive(Debug, Clone, Serialize)]
pub struct TagRunOutput {
    /// The updated master CSV.
    pub csv: String,
    /// Rows in the master CSV.
    pub row_count: usize,
    /// Rows whose `Tags` changed.
    pub updated_count: usize,
    /// Distinct handles with assigned tags.
    pub handles_mapped: usize,
    /// Collection exports read from the archive.
    pub collections: Vec<super::ScannedCollection>,
    /// Collection exports skipped because they could not be read.
    pub skipped: Vec<super::SkippedEntry>,
}

/// Everything a driver needs to report on a finished run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub phase: RunPhase,
    pub log: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<TagRunOutput>,
    #[serde(skip)]
    pub error: Option<TagRunError>,
}

impl RunReport {
    /// Whether the run produced an output file.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.phase, RunPhase::Done) && self.output.is_some()
    }
}

/// Drives the tag merge engine through a complete run.
///
/// The codec and archive reader are injected so the same driver serves the
/// HTTP endpoint, the CLI and tests with in-memory fakes.
#[derive(Debug, Clone, Default)]
pub struct TagAutomation<C, A> {
    codec: C,
    archive: A,
    gate: RowGate,
}

impl<C: TableCodec, A: ArchiveReader> TagAutomation<C, A> {
    /// Create a driver from a codec and an archive reader.
    #[must_use]
    pub fn new(codec: C, archive: A) -> Self {
        Self {
            codec,
            archive,
            gate: RowGate::default(),
        }
    }

    /// Use a different row eligibility gate.
    #[must_use]
    pub const fn with_gate(mut self, gate: RowGate) -> Self {
        self.gate = gate;
        self
    }

    /// Run the full pipeline.
    ///
    /// Never fails: errors are recorded in the returned report, which ends in
    /// [`RunPhase::Failed`].
    #[instrument(skip_all, fields(run_id = tracing::field::Empty, prefix = %input.prefix))]
    pub fn run(&self, input: TagRunInput<'_>) -> RunReport {
        let mut run = RunState::new();
        tracing::Span::current().record("run_id", tracing::field::display(run.id));
        run.log("Starting automation process...");

        match self.execute(input, &mut run) {
            Ok(output) => {
                run.advance(RunPhase::Done);
                run.log("Process complete!");
                run.finish(Some(output), None)
            }
            Err(e) => {
                error!(phase = ?run.phase, error = %e, "Tag automation run failed");
                run.log(format!("ERROR: {e}"));
                run.advance(RunPhase::Failed);
                run.finish(None, Some(e))
            }
        }
    }

    fn execute(&self, input: TagRunInput<'_>, run: &mut RunState) -> Result<TagRunOutput, TagRunError> {
        let master = input.master.ok_or(TagRunError::InputMissing("master CSV"))?;
        let archive = input.archive.ok_or(TagRunError::InputMissing("collections ZIP"))?;

        run.advance(RunPhase::ParsingMaster);
        run.log("Parsing Master CSV...");
        let Table { columns, rows } = self
            .codec
            .decode(&decode_text(master))
            .map_err(TagRunError::MasterDecode)?;
        let row_count = rows.len();
        run.log(format!("Loaded {row_count} rows from Master CSV."));

        run.advance(RunPhase::ScanningArchive);
        run.log("Scanning Collections ZIP...");
        let entries = self
            .archive
            .open(archive, &is_collection_entry)
            .map_err(TagRunError::ArchiveOpen)?;
        let scan = build_tag_assignment(&self.codec, &entries, input.prefix);
        for collection in &scan.collections {
            run.log(format!(
                "Found collection: {} -> Tag: {}",
                collection.entry, collection.tag
            ));
        }
        for skipped in &scan.skipped {
            warn!(entry = %skipped.entry, reason = %skipped.reason, "Skipped collection entry");
            run.log(format!("Skipped {}: {}", skipped.entry, skipped.reason));
        }
        let handles_mapped = scan.assignment.len();
        run.log(format!("Mapped tags for {handles_mapped} unique handles."));

        run.advance(RunPhase::ApplyingTags);
        run.log("Applying tags to Master Data...");
        let outcome = apply_tags(rows, &scan.assignment, self.gate);
        run.log(format!(
            "Finished processing. Updated tags in {} rows.",
            outcome.updated_count
        ));

        run.advance(RunPhase::Exporting);
        run.log("Generating final CSV...");
        let table = Table::new(columns, outcome.rows);
        let csv = export_csv(&self.codec, &table).map_err(TagRunError::Export)?;

        Ok(TagRunOutput {
            csv,
            row_count,
            updated_count: outcome.updated_count,
            handles_mapped,
            collections: scan.collections,
            skipped: scan.skipped,
        })
    }
}

struct RunState {
    id: RunId,
    phase: RunPhase,
    log: Vec<String>,
}

impl RunState {
    fn new() -> Self {
        Self {
            id: RunId::new(),
            phase: RunPhase::Idle,
            log: Vec::new(),
        }
    }

    fn advance(&mut self, to: RunPhase) {
        debug_assert!(
            self.phase.can_transition_to(to),
            "invalid run transition {:?} -> {to:?}",
            self.phase
        );
        tracing::debug!(from = ?self.phase, to = ?to, "Run phase change");
        self.phase = to;
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(run_id = %self.id, "{message}");
        self.log.push(message);
    }

    fn finish(self, output: Option<TagRunOutput>, error: Option<TagRunError>) -> RunReport {
        RunReport {
            run_id: self.id,
            phase: self.phase,
            log: self.log,
            output,
            error,
        }
    }
}
