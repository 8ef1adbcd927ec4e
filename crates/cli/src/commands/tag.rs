//! Tag automation command.
//!
//! # Usage
//!
//! ```bash
//! sc-cli tag --master products_export.csv --archive collections.zip
//! sc-cli tag --master products_export.csv --archive collections.zip --prefix col- --tag-all-rows
//! ```

use std::path::Path;

use shop_console_core::codec::{CsvCodec, ZipArchiveReader};
use shop_console_core::tagging::{RowGate, RunReport, TagAutomation, TagRunError, TagRunInput};
use thiserror::Error;

use super::{FileError, read_bytes, write_text};

/// Errors that can occur during a tag run.
#[derive(Debug, Error)]
pub enum TagError {
    /// An input or output file failed.
    #[error(transparent)]
    File(#[from] FileError),

    /// The run itself failed.
    #[error(transparent)]
    Run(#[from] TagRunError),

    /// The run ended without output or error.
    #[error("Tag automation produced no output")]
    NoOutput,
}

/// Options for one tag run.
#[derive(Debug)]
pub struct TagOptions<'a> {
    pub master: &'a Path,
    pub archive: &'a Path,
    pub output: &'a Path,
    pub prefix: &'a str,
    pub tag_all_rows: bool,
}

/// Merge collection tags into the master CSV and write the result.
///
/// Returns the run report; its log has already been emitted via `tracing`.
pub fn run(options: &TagOptions<'_>) -> Result<RunReport, TagError> {
    let master = read_bytes(options.master)?;
    let archive = read_bytes(options.archive)?;

    let gate = if options.tag_all_rows {
        RowGate::AnyRow
    } else {
        RowGate::TitleOrTags
    };
    let mut report = TagAutomation::new(CsvCodec, ZipArchiveReader)
        .with_gate(gate)
        .run(TagRunInput {
            master: Some(&master),
            archive: Some(&archive),
            prefix: options.prefix,
        });

    if let Some(error) = report.error.take() {
        return Err(error.into());
    }
    let output = report.output.as_ref().ok_or(TagError::NoOutput)?;
    write_text(options.output, &output.csv)?;

    tracing::info!(
        run_id = %report.run_id,
        output = %options.output.display(),
        updated = output.updated_count,
        "Wrote updated master CSV"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;
    use crate::commands::scratch_path;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, contents) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_tag_run_writes_output() {
        let master = scratch_path("tag-master.csv");
        let archive = scratch_path("tag-collections.zip");
        let output = scratch_path("tag-output.csv");
        std::fs::write(
            &master,
            "Handle,Title,Tags\nmug-01,Mug,featured\nmug-01,,\nmug-02,,\n",
        )
        .unwrap();
        write_zip(
            &archive,
            &[
                ("new-arrivals.csv", "Handle\nmug-01\nmug-02\n"),
                ("__MACOSX/new-arrivals.csv", "junk"),
            ],
        );

        let report = run(&TagOptions {
            master: &master,
            archive: &archive,
            output: &output,
            prefix: "cus-",
            tag_all_rows: false,
        })
        .unwrap();

        assert_eq!(report.output.as_ref().unwrap().updated_count, 1);
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "Handle,Title,Tags\nmug-01,Mug,\"featured, cus-new-arrivals\"\nmug-01,,\nmug-02,,\n"
        );

        for path in [master, archive, output] {
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn test_missing_master_is_file_error() {
        let err = run(&TagOptions {
            master: Path::new("/nonexistent/master.csv"),
            archive: Path::new("/nonexistent/collections.zip"),
            output: Path::new("/nonexistent/out.csv"),
            prefix: "cus-",
            tag_all_rows: false,
        })
        .unwrap_err();
        assert!(matches!(err, TagError::File(_)));
        assert!(err.to_string().contains("master.csv"));
    }

    #[test]
    fn test_corrupt_archive_is_run_error() {
        let master = scratch_path("corrupt-master.csv");
        let archive = scratch_path("corrupt.zip");
        std::fs::write(&master, "Handle,Title,Tags\nmug-01,Mug,\n").unwrap();
        std::fs::write(&archive, b"not a zip").unwrap();

        let err = run(&TagOptions {
            master: &master,
            archive: &archive,
            output: &scratch_path("corrupt-out.csv"),
            prefix: "cus-",
            tag_all_rows: false,
        })
        .unwrap_err();
        assert!(matches!(err, TagError::Run(TagRunError::ArchiveOpen(_))));

        for path in [master, archive] {
            std::fs::remove_file(path).ok();
        }
    }
}
