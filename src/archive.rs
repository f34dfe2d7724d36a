use std::io::{Cursor, Read};

use tracing::debug;

use crate::error::{IndexError, Result};
use crate::unihan::is_candidate_entry;

// The header size is untrusted; larger entries just grow the buffer.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// A named text entry of the Unihan container.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub text: String,
}

/// Read the Unihan data files out of a zip archive. Entries that are not
/// Unihan data files are never decompressed.
pub fn read_entries(bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();
        if file.is_dir() || !is_candidate_entry(&name) {
            continue;
        }

        let mut raw = Vec::with_capacity(prealloc_hint(file.size()));
        file.read_to_end(&mut raw)
            .map_err(|source| IndexError::ArchiveEntry {
                entry: name.clone(),
                source,
            })?;
        // undecodable bytes only spoil their own line, which then fails to parse
        let text = String::from_utf8_lossy(&raw).into_owned();
        debug!(entry = %name, bytes = raw.len(), "archive entry read");
        entries.push(ArchiveEntry { name, text });
    }

    Ok(entries)
}

fn prealloc_hint(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_PREALLOC)).unwrap_or(0)
}
