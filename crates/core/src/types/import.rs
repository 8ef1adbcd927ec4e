//! Bulk import result and progress types.

use serde::{Deserialize, Serialize};

/// Handle reported for a collection that carried none.
pub const UNKNOWN_HANDLE: &str = "unknown";

/// One collection that failed to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub handle: String,
    pub error: String,
}

/// Aggregate outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResults {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<ImportFailure>,
}

impl ImportResults {
    /// Record a successful item.
    pub const fn record_success(&mut self) {
        self.success += 1;
    }

    /// Record a failed item.
    pub fn record_failure(&mut self, handle: impl Into<String>, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push(ImportFailure {
            handle: handle.into(),
            error: error.into(),
        });
    }

    /// Number of items processed so far.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.success + self.failed
    }
}

/// Observable progress of a running import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ImportProgress {
    /// Progress of an import that has not started any item yet.
    #[must_use]
    pub const fn starting(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            succeeded: 0,
            failed: 0,
        }
    }

    /// Whether every queued item has been processed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

impl From<(&ImportResults, usize)> for ImportProgress {
    fn from((results, total): (&ImportResults, usize)) -> Self {
        Self {
            total,
            processed: results.processed(),
            succeeded: results.success,
            failed: results.failed,
        }
    }
}
