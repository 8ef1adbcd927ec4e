//! Tabular text and archive capabilities consumed by the tag merge engine.
//!
//! The engine never talks to a concrete parser. It takes a [`TableCodec`] and
//! an [`ArchiveReader`], so production code plugs in [`CsvCodec`] and
//! [`ZipArchiveReader`] while tests can hand it in-memory fakes.

mod archive;
mod table;

pub use archive::{MAX_ENTRY_BYTES, ZipArchiveReader};
pub use table::CsvCodec;

use thiserror::Error;

use crate::types::Table;

const UTF8_BOM: &str = "\u{feff}";

/// Errors raised while decoding or encoding tabular data and archives.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Tabular text could not be parsed or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Archive could not be opened or an entry could not be read.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O failure while reading an archive entry or flushing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoded output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Archive entry decompresses to more than the allowed size.
    #[error("Entry exceeds {limit} bytes when decompressed")]
    EntryTooLarge { limit: u64 },
}

/// Decodes header-indexed tabular text into rows and back.
pub trait TableCodec {
    /// Parse text with a header row into a table, rows in source order.
    ///
    /// Every row carries every header column.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the text is not valid tabular data.
    fn decode(&self, text: &str) -> Result<Table, CodecError>;

    /// Encode a table as text with a header row.
    ///
    /// The header is [`Table::header`]: the declared columns, then any column
    /// a row added.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the rows cannot be written.
    fn encode(&self, table: &Table) -> Result<String, CodecError>;
}

/// Opens an archive and yields its file entries in archive order.
pub trait ArchiveReader {
    /// Open `bytes` as an archive and read the entries `wanted` accepts.
    ///
    /// Entries whose name `wanted` rejects are neither read nor returned.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the archive itself cannot be read. Failures of
    /// individual entries are reported on the entry instead.
    fn open(
        &self,
        bytes: &[u8],
        wanted: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<ArchiveEntry>, CodecError>;
}

/// One file inside an archive.
#[derive(Debug)]
pub struct ArchiveEntry {
    /// Full path of the entry inside the archive.
    pub name: String,
    /// Decoded text of the entry, or why it could not be read.
    pub text: Result<String, CodecError>,
}

impl ArchiveEntry {
    /// A readable entry.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Ok(text.into()),
        }
    }

    /// An entry whose contents could not be read.
    #[must_use]
    pub fn unreadable(name: impl Into<String>, error: CodecError) -> Self {
        Self {
            name: name.into(),
            text: Err(error),
        }
    }
}

/// Decode uploaded bytes as UTF-8 text.
///
/// Invalid sequences are replaced rather than rejected and a leading byte
/// order mark is dropped so it cannot leak into the first header name.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string()
}
