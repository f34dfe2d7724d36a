use std::ops::RangeInclusive;

use tracing::info;

use crate::archive::ArchiveEntry;
use crate::attributes::AttributeResolver;
use crate::ordering;
use crate::pagination::{self, Page};
use crate::supplementary::{self, SupplementaryEntry};
use crate::unihan;

/// Unicode Extension J, whose glyphs come from per-character font files.
pub const DEFAULT_CUSTOM_RANGE: RangeInclusive<u32> = 0x323B0..=0x3347F;
pub const DEFAULT_COLUMNS: usize = 10;
pub const DEFAULT_ROWS: usize = 7;
/// Size of the IRG Working Set 2024.
pub const DEFAULT_GENERATED_COUNT: u32 = 4674;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub custom_range: RangeInclusive<u32>,
    pub columns: usize,
    pub rows: usize,
    pub generated_count: u32,
}

impl PipelineConfig {
    pub fn page_capacity(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            custom_range: DEFAULT_CUSTOM_RANGE,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            generated_count: DEFAULT_GENERATED_COUNT,
        }
    }
}

/// Extract, synthesize, order and paginate. Empty inputs give zero pages.
pub fn run(
    entries: &[ArchiveEntry],
    fixed_table: Vec<SupplementaryEntry>,
    resolver: &AttributeResolver,
    config: &PipelineConfig,
) -> Vec<Page> {
    let database = unihan::extract_all(entries, &config.custom_range);
    let table = supplementary::build_table(fixed_table, resolver, config.generated_count);
    let synthetic = supplementary::synthesize(&table);
    info!(
        database = database.len(),
        supplementary = synthetic.len(),
        "records ready"
    );

    let ordered = ordering::order(database, synthetic);
    let pages = pagination::paginate(ordered, config.page_capacity());
    info!(pages = pages.len(), capacity = config.page_capacity(), "paginated");
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{consolidate, AttributeMap, NO_SOURCE_RADICAL, UNKNOWN_RADICAL};
    use crate::record::SourceKind;

    fn small_config(generated_count: u32) -> PipelineConfig {
        PipelineConfig {
            columns: 2,
            rows: 2,
            generated_count,
            ..PipelineConfig::default()
        }
    }

    fn fixture_entries() -> Vec<ArchiveEntry> {
        vec![ArchiveEntry {
            name: "Unihan_IRGSources.txt".into(),
            text: std::fs::read_to_string("tests/fixtures/Unihan_IRGSources.txt").unwrap(),
        }]
    }

    #[test]
    fn oversized_grid_saturates() {
        let config = PipelineConfig {
            columns: usize::MAX,
            rows: 3,
            ..PipelineConfig::default()
        };
        assert_eq!(config.page_capacity(), usize::MAX);
        assert_eq!(PipelineConfig::default().page_capacity(), 70);
    }

    #[test]
    fn empty_everything_gives_no_pages() {
        let pages = run(&[], Vec::new(), &AttributeResolver::absent(), &small_config(0));
        assert!(pages.is_empty());
    }

    #[test]
    fn merges_all_sources() {
        let table = supplementary::parse_table("kokuji\t0001\t2\t11\nhokke\t02944\t1\t-1\n").unwrap();
        let pages = run(&fixture_entries(), table, &AttributeResolver::absent(), &small_config(2));
        let cells: Vec<_> = pages.iter().flat_map(|p| &p.cells).collect();

        // 7 database records, 2 fixed entries, 2 generated entries
        assert_eq!(cells.len(), 11);
        let first = &cells[0].record;
        assert_eq!(first.display_label(), "H+02944");
        assert_eq!((first.radical(), first.stroke()), (1, -1));

        let kinds: Vec<SourceKind> = cells.iter().map(|c| c.record.source_kind()).collect();
        assert!(kinds.contains(&SourceKind::NativeUnicode));
        assert!(kinds.contains(&SourceKind::CustomUnicodeRange));
        assert!(kinds.contains(&SourceKind::Supplementary));

        let last = &cells[cells.len() - 1].record;
        assert_eq!(last.radical(), NO_SOURCE_RADICAL);
        assert!(pages.iter().all(|p| p.cells.len() <= 4));
    }

    #[test]
    fn generated_range_uses_store_buckets() {
        let store = AttributeResolver::new(consolidate(AttributeMap::new(), 3));
        let pages = run(&[], Vec::new(), &store, &small_config(3));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].radical, UNKNOWN_RADICAL);
        assert_eq!(pages[0].cells.len(), 3);
    }
}
