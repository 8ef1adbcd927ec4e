//! CLI command implementations.

pub mod collections;
pub mod extract;
pub mod import;
pub mod tag;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A file the CLI could not read or write.
#[derive(Debug, Error)]
#[error("{path}: {source}")]
pub struct FileError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, FileError> {
    std::fs::read(path).map_err(|source| FileError {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_text(path: &Path) -> Result<String, FileError> {
    std::fs::read_to_string(path).map_err(|source| FileError {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_text(path: &Path, contents: &str) -> Result<(), FileError> {
    std::fs::write(path, contents).map_err(|source| FileError {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sc-cli-{}-{name}", std::process::id()))
}
