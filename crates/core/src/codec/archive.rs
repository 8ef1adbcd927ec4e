//! ZIP implementation of [`ArchiveReader`].

use std::io::{Cursor, Read};

use super::{ArchiveEntry, ArchiveReader, CodecError, decode_text};

/// Largest decompressed size read from a single entry: 64 MiB.
pub const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// Archive reader backed by the `zip` crate.
///
/// Directory entries and entries the caller does not want are skipped without
/// decompressing them. Wanted entries are read up to [`MAX_ENTRY_BYTES`] and
/// decoded as UTF-8 text; an entry that fails to decompress or is too large is
/// returned as [`ArchiveEntry::unreadable`] so the caller can skip it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveReader;

impl ArchiveReader for ZipArchiveReader {
    fn open(
        &self,
        bytes: &[u8],
        wanted: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<ArchiveEntry>, CodecError> {
        read_entries(bytes, wanted, MAX_ENTRY_BYTES)
    }
}

fn read_entries(
    bytes: &[u8],
    wanted: &dyn Fn(&str) -> bool,
    limit: u64,
) -> Result<Vec<ArchiveEntry>, CodecError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let name = archive
            .name_for_index(index)
            .map_or_else(|| format!("#{index}"), str::to_string);
        if name.ends_with('/') || !wanted(&name) {
            tracing::trace!(entry = %name, "Not reading archive entry");
            continue;
        }

        let file = match archive.by_index(index) {
            Ok(file) => file,
            Err(e) => {
                entries.push(ArchiveEntry::unreadable(name, e.into()));
                continue;
            }
        };
        if file.is_dir() {
            continue;
        }
        if file.size() > limit {
            entries.push(ArchiveEntry::unreadable(name, CodecError::EntryTooLarge { limit }));
            continue;
        }

        // The declared size can lie, so the read itself is bounded too.
        let mut contents = Vec::new();
        match file.take(limit + 1).read_to_end(&mut contents) {
            Ok(read) if u64::try_from(read).unwrap_or(u64::MAX) > limit => {
                entries.push(ArchiveEntry::unreadable(name, CodecError::EntryTooLarge { limit }));
            }
            Ok(_) => entries.push(ArchiveEntry::new(name, decode_text(&contents))),
            Err(e) => entries.push(ArchiveEntry::unreadable(name, e.into())),
        }
    }
    Ok(entries)
}
