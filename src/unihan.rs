use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::archive::ArchiveEntry;
use crate::record::CharacterRecord;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Field tag of the radical-stroke lines.
pub const RS_FIELD_TAG: &str = "kRSUnicode";

// radical, optional prime, dot, signed residual strokes; anything after is ignored
static RS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9]+)'?\.(-?[0-9]+)").unwrap());

/// Whether an archive entry is a Unihan data file worth scanning.
pub fn is_candidate_entry(name: &str) -> bool {
    if name.ends_with('/') || name.starts_with("__MACOSX") || name.contains("/.") {
        return false;
    }
    let base = name.rsplit('/').next().unwrap_or(name);
    base.starts_with("Unihan_")
        && base.ends_with(".txt")
        && !base.contains("ReadMe")
        && !base.contains("History")
}

/// Parse one database line. Anything that is not a well-formed
/// `kRSUnicode` line yields `None`.
pub fn parse_line(line: &str, custom_range: &RangeInclusive<u32>) -> Option<CharacterRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut fields = line.split('\t');
    let code_field = fields.next()?;
    let tag = fields.next()?;
    let rs_field = fields.next()?;
    if tag != RS_FIELD_TAG {
        return None;
    }

    let code_point = u32::from_str_radix(code_field.strip_prefix("U+")?, 16).ok()?;
    let (radical, stroke) = parse_radical_stroke(rs_field)?;

    if custom_range.contains(&code_point) {
        return Some(CharacterRecord::custom_range(code_point, radical, stroke));
    }
    let ch = char::from_u32(code_point)?;
    Some(CharacterRecord::native(code_point, ch, radical, stroke))
}

/// `"85'.3"` → `(85, 3)`, `"9.-1"` → `(9, -1)`, `"75.2.1 75.4"` → `(75, 2)`.
pub fn parse_radical_stroke(field: &str) -> Option<(u16, i32)> {
    let caps = RS_RE.captures(field.trim())?;
    let radical: u16 = caps[1].parse().ok()?;
    let stroke: i32 = caps[2].parse().ok()?;
    if radical == 0 {
        return None;
    }
    Some((radical, stroke))
}

/// Lazily extract the records of one entry's text.
pub fn extract_entry<'a>(
    text: &'a str,
    custom_range: &'a RangeInclusive<u32>,
) -> impl Iterator<Item = CharacterRecord> + 'a {
    text.lines().filter_map(move |line| parse_line(line, custom_range))
}

fn extract_one(entry: &ArchiveEntry, custom_range: &RangeInclusive<u32>) -> Vec<CharacterRecord> {
    if !is_candidate_entry(&entry.name) {
        return Vec::new();
    }
    let records: Vec<CharacterRecord> = extract_entry(&entry.text, custom_range).collect();
    let tagged = entry
        .text
        .lines()
        .filter(|l| l.split('\t').nth(1) == Some(RS_FIELD_TAG))
        .count();
    debug!(
        entry = %entry.name,
        records = records.len(),
        skipped = tagged.saturating_sub(records.len()),
        "extracted"
    );
    records
}

#[cfg(feature = "rayon")]
pub fn extract_all(
    entries: &[ArchiveEntry],
    custom_range: &RangeInclusive<u32>,
) -> Vec<CharacterRecord> {
    entries
        .par_iter()
        .flat_map_iter(|entry| extract_one(entry, custom_range))
        .collect()
}

#[cfg(not(feature = "rayon"))]
pub fn extract_all(
    entries: &[ArchiveEntry],
    custom_range: &RangeInclusive<u32>,
) -> Vec<CharacterRecord> {
    entries
        .iter()
        .flat_map(|entry| extract_one(entry, custom_range))
        .collect()
}
