//! GlyphWiki dictionaries: glyphs with no code point, drawn from per-glyph
//! font files and identified by `<source>-<id>`.

use std::fmt;

use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::attributes::{format_id, AttributeResolver};
use crate::error::{IndexError, Result};
use crate::record::{CharacterRecord, FontRef};

const DEFAULT_TABLE: &str = include_str!("../data/supplementary.tsv");

/// Prefix used for sources this build does not know about.
pub const FALLBACK_PREFIX: &str = "GW";

/// Synthetic sort keys start here, far above the last Unicode scalar value.
pub const SYNTHETIC_KEY_BASE: u64 = 0x1_0000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    Verbatim,
    ZeroPad(usize),
}

impl IdFormat {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            IdFormat::ZeroPad(width) if raw.chars().all(|c| c.is_ascii_digit()) => {
                format!("{:0>width$}", raw, width = *width)
            }
            _ => raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub title: &'static str,
    pub prefix: &'static str,
    pub id_format: IdFormat,
}

macro_rules! sources {
    ($($variant:ident => $name:literal, $prefix:literal, $title:literal, $fmt:expr;)*) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum Source {
            $($variant,)*
            Other(String),
        }

        impl Source {
            pub const KNOWN: &'static [Source] = &[$(Source::$variant,)*];

            pub fn from_name(name: &str) -> Self {
                match name {
                    $($name => Source::$variant,)*
                    other => Source::Other(other.to_string()),
                }
            }

            /// GlyphWiki name, used in font file names.
            pub fn name(&self) -> &str {
                match self {
                    $(Source::$variant => $name,)*
                    Source::Other(name) => name.as_str(),
                }
            }

            pub fn descriptor(&self) -> SourceDescriptor {
                match self {
                    $(Source::$variant => SourceDescriptor {
                        title: $title,
                        prefix: $prefix,
                        id_format: $fmt,
                    },)*
                    Source::Other(_) => SourceDescriptor {
                        title: "GlyphWiki",
                        prefix: FALLBACK_PREFIX,
                        id_format: IdFormat::Verbatim,
                    },
                }
            }
        }
    };
}

sources! {
    Kokuji => "kokuji", "K", "国字の字典", IdFormat::Verbatim;
    WaseiKanji => "wasei-kanji", "W", "和製漢字の辞典", IdFormat::Verbatim;
    KadokawaDaijigen => "kadokawa-daijigen", "KD", "角川大字源国字一覧", IdFormat::Verbatim;
    NihonjinNoTsukutta => "nihonjin-no-tsukutta", "N", "日本人の作った漢字", IdFormat::Verbatim;
    ShinchoNihongo => "shincho-nihongo", "S", "新潮日本語漢字辞典", IdFormat::Verbatim;
    Hokke => "hokke", "H", "法華三大部難字記", IdFormat::Verbatim;
    Chukajikai => "chukajikai", "Z", "中華字海", IdFormat::Verbatim;
    KozoujiJiten => "kozouji-jiten", "G", "古壮字字典", IdFormat::Verbatim;
    ShinsenJikyo => "shinsen-jikyo", "SJ", "新撰字鏡-抄録本", IdFormat::Verbatim;
    ToshoryoRuiju => "toshoryo-ruiju", "T", "図書寮本類聚名義抄", IdFormat::Verbatim;
    KozanjiTenrei => "kozanji-tenrei", "KT", "高山寺本篆隷万象名義", IdFormat::Verbatim;
    ChunomJiten => "chunom-jiten", "V", "字喃字典", IdFormat::Verbatim;
    DaijitenChunom => "daijiten-chunom", "VD", "大字典字喃", IdFormat::Verbatim;
    JitenChunomTekiin => "jiten-chunom-tekiin", "J", "字典字喃摘引", IdFormat::Verbatim;
    JoshinBunJiten => "joshin-bun-jiten", "JU", "女真文辞典", IdFormat::Verbatim;
    BuyiFangkuai => "buyi-fangkuai", "B", "布依方块古文字", IdFormat::Verbatim;
    ChinaJingyu => "china-jingyu", "C", "中国京语词典", IdFormat::Verbatim;
    Dkw => "dkw", "DKW", "大漢和辞典", IdFormat::Verbatim;
    Ids => "ids", "IDS", "IDS", IdFormat::Verbatim;
    Irg2024 => "irg2024", "IRG", "IRG Working Set 2024", IdFormat::ZeroPad(5);
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplementaryEntry {
    pub source: Source,
    pub id: String,
    pub radical: u16,
    pub stroke: i32,
    /// The glyph is a variant of an encoded character and is not listed.
    pub unicode_sim: bool,
}

/// Parse a table of `source  id  radical  stroke  [unicode_sim]` rows.
/// Blank lines and `#` comments are ignored.
pub fn parse_table(text: &str) -> Result<Vec<SupplementaryEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(parse_row(line).map_err(|reason| IndexError::Table {
            line: idx + 1,
            reason,
        })?);
    }
    Ok(entries)
}

fn parse_row(line: &str) -> std::result::Result<SupplementaryEntry, String> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(format!("expected at least 4 tab-separated fields, got {}", fields.len()));
    }
    let (source, id) = (fields[0], fields[1]);
    if source.is_empty() || id.is_empty() {
        return Err("empty source or id".to_string());
    }
    let radical: u16 = fields[2]
        .parse()
        .map_err(|_| format!("bad radical '{}'", fields[2]))?;
    if radical == 0 {
        return Err("radical must be at least 1".to_string());
    }
    let stroke: i32 = fields[3]
        .parse()
        .map_err(|_| format!("bad stroke count '{}'", fields[3]))?;
    let unicode_sim = match fields.get(4).copied() {
        None | Some("") | Some("no") => false,
        Some("yes") => true,
        Some(other) => return Err(format!("bad unicode_sim flag '{}'", other)),
    };

    Ok(SupplementaryEntry {
        source: Source::from_name(source),
        id: id.to_string(),
        radical,
        stroke,
        unicode_sim,
    })
}

/// The curated table shipped with the crate.
pub fn default_table() -> Result<Vec<SupplementaryEntry>> {
    parse_table(DEFAULT_TABLE)
}

/// Fixed table followed by the generated IRG working-set range `1..=count`,
/// whose attributes come from the resolver.
pub fn build_table(
    fixed: Vec<SupplementaryEntry>,
    resolver: &AttributeResolver,
    count: u32,
) -> Vec<SupplementaryEntry> {
    let mut table = fixed;
    table.reserve(count as usize);
    table.extend((1..=count).map(|n| {
        let id = format_id(n);
        let attr = resolver.resolve(&id);
        SupplementaryEntry {
            source: Source::Irg2024,
            id,
            radical: attr.radical,
            stroke: attr.stroke,
            unicode_sim: false,
        }
    }));
    table
}

/// Pseudo code point for a glyph with no Unicode identity: depends only on
/// `(source_name, id)` and never collides with a real code point.
pub fn synthetic_sort_key(source_name: &str, id: &str) -> u64 {
    let mut buf = Vec::with_capacity(source_name.len() + id.len() + 1);
    buf.extend_from_slice(source_name.as_bytes());
    buf.push(0x1F);
    buf.extend_from_slice(id.as_bytes());
    SYNTHETIC_KEY_BASE + (xxh3_64(&buf) >> 16)
}

fn font_family(source_name: &str, id: &str) -> String {
    format!("GW_{}_{}", source_name, id)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn synthesize_entry(entry: &SupplementaryEntry) -> CharacterRecord {
    let descriptor = entry.source.descriptor();
    let name = entry.source.name();
    let id = descriptor.id_format.apply(&entry.id);

    CharacterRecord::supplementary(
        entry.radical,
        entry.stroke,
        synthetic_sort_key(name, &id),
        format!("{}+{}", descriptor.prefix, id),
        FontRef {
            file: format!("{}-{}.ttf", name, id),
            family: font_family(name, &id),
        },
    )
}

pub fn synthesize(entries: &[SupplementaryEntry]) -> Vec<CharacterRecord> {
    let records: Vec<CharacterRecord> = entries
        .iter()
        .filter(|e| !e.unicode_sim)
        .map(synthesize_entry)
        .collect();
    debug!(
        entries = entries.len(),
        records = records.len(),
        "supplementary records synthesized"
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Attribute, AttributeMap};
    use crate::record::{SourceKind, PLACEHOLDER_GLYPH};

    fn entry(source: &str, id: &str, radical: u16, stroke: i32) -> SupplementaryEntry {
        SupplementaryEntry {
            source: Source::from_name(source),
            id: id.to_string(),
            radical,
            stroke,
            unicode_sim: false,
        }
    }

    #[test]
    fn kokuji_entry() {
        let r = synthesize_entry(&entry("kokuji", "0001", 2, 11));
        assert_eq!(r.display_label(), "K+0001");
        assert_eq!(r.font().unwrap().file, "kokuji-0001.ttf");
        assert_eq!(r.font().unwrap().family, "GW_kokuji_0001");
        assert_eq!(r.source_kind(), SourceKind::Supplementary);
        assert_eq!(r.display_form().glyph(), PLACEHOLDER_GLYPH);
        assert_eq!((r.radical(), r.stroke()), (2, 11));

        let again = synthesize_entry(&entry("kokuji", "0001", 2, 11));
        assert_eq!(r.sort_key(), again.sort_key());
        assert_eq!(r.sort_key(), synthetic_sort_key("kokuji", "0001"));
    }

    #[test]
    fn sort_keys_are_outside_unicode_and_distinct() {
        let a = synthetic_sort_key("kokuji", "0001");
        let b = synthetic_sort_key("kokuji", "0002");
        let c = synthetic_sort_key("hokke", "0001");
        assert!(a > 0x10FFFF && b > 0x10FFFF && c > 0x10FFFF);
        assert_ne!(a, b);
        assert_ne!(a, c);
        // the separator keeps ("ab", "c") and ("a", "bc") apart
        assert_ne!(synthetic_sort_key("ab", "c"), synthetic_sort_key("a", "bc"));
    }

    #[test]
    fn unknown_source_uses_fallback_prefix() {
        let r = synthesize_entry(&entry("some-new-dict", "12", 30, 2));
        assert_eq!(r.display_label(), "GW+12");
        assert_eq!(r.font().unwrap().file, "some-new-dict-12.ttf");
        assert_eq!(r.font().unwrap().family, "GW_some_new_dict_12");
    }

    #[test]
    fn known_names_round_trip() {
        for source in Source::KNOWN {
            assert_eq!(&Source::from_name(source.name()), source);
            assert_ne!(source.descriptor().prefix, FALLBACK_PREFIX);
        }
        assert_eq!(Source::KNOWN.len(), 20);
    }

    #[test]
    fn irg_ids_are_zero_padded() {
        let r = synthesize_entry(&entry("irg2024", "42", 85, 9));
        assert_eq!(r.display_label(), "IRG+00042");
        assert_eq!(r.font().unwrap().file, "irg2024-00042.ttf");
    }

    #[test]
    fn build_table_appends_resolved_range() {
        let mut map = AttributeMap::new();
        map.insert("00002".into(), Attribute { radical: 85, stroke: 9 });
        let resolver = AttributeResolver::new(map);
        let table = build_table(vec![entry("dkw", "00005", 1, 1)], &resolver, 3);

        assert_eq!(table.len(), 4);
        assert_eq!(table[0].source, Source::Dkw);
        let generated: Vec<_> = table[1..]
            .iter()
            .map(|e| (e.id.as_str(), e.radical, e.stroke))
            .collect();
        assert_eq!(generated, vec![("00001", 216, 0), ("00002", 85, 9), ("00003", 216, 0)]);
        assert!(table[1..].iter().all(|e| e.source == Source::Irg2024));
    }

    #[test]
    fn unicode_sim_entries_are_not_listed() {
        let mut sim = entry("kokuji", "0009", 53, 2);
        sim.unicode_sim = true;
        let records = synthesize(&[entry("kokuji", "0001", 2, 11), sim]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn default_table_parses() {
        let table = default_table().unwrap();
        assert_eq!(table.len(), 193);
        assert!(table.iter().all(|e| !matches!(e.source, Source::Other(_))));
        assert!(table.iter().any(|e| e.stroke < 0));
    }

    #[test]
    fn table_errors_carry_line_numbers() {
        let text = "# header\nkokuji\t0001\t2\t11\nkokuji\t0002\tx\t8\n";
        match parse_table(text) {
            Err(IndexError::Table { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("radical"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_table("dkw\t1\t0\t1").is_err());
        assert!(parse_table("dkw\t1\t1").is_err());
        assert!(parse_table("dkw\t1\t1\t1\tmaybe").is_err());
    }
}
