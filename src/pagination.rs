use serde::Serialize;

use crate::record::CharacterRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub record: CharacterRecord,
    /// First record of its radical in the full ordered sequence.
    pub group_start: bool,
}

/// One printed sheet: part (or all) of a single radical group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub radical: u16,
    pub cells: Vec<Cell>,
}

impl Page {
    /// Whether this page picks up a group begun on an earlier page.
    pub fn is_continuation(&self) -> bool {
        self.cells.first().is_some_and(|c| !c.group_start)
    }
}

/// Flag every record whose radical differs from its predecessor's.
pub fn mark_group_starts(records: Vec<CharacterRecord>) -> Vec<Cell> {
    let mut prev: Option<u16> = None;
    records
        .into_iter()
        .map(|record| {
            let group_start = prev != Some(record.radical());
            prev = Some(record.radical());
            Cell {
                record,
                group_start,
            }
        })
        .collect()
}

/// Chunk an ordered sequence into pages of at most `capacity` cells. Each
/// radical group starts on a fresh page, so groups never share a page.
pub fn paginate(records: Vec<CharacterRecord>, capacity: usize) -> Vec<Page> {
    let capacity = capacity.max(1);
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<Cell> = Vec::with_capacity(capacity);

    for cell in mark_group_starts(records) {
        if !current.is_empty() && (cell.group_start || current.len() == capacity) {
            pages.push(close_page(std::mem::take(&mut current)));
        }
        current.push(cell);
    }
    if !current.is_empty() {
        pages.push(close_page(current));
    }

    pages
}

fn close_page(cells: Vec<Cell>) -> Page {
    let radical = cells.first().map_or(0, |c| c.record.radical());
    Page { radical, cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(radical: u16, n: u32) -> Vec<CharacterRecord> {
        (0..n)
            .map(|i| {
                let cp = 0x4E00 + u32::from(radical) * 0x100 + i;
                CharacterRecord::native(cp, char::from_u32(cp).unwrap(), radical, i as i32)
            })
            .collect()
    }

    #[test]
    fn group_starts_on_radical_change_only() {
        let mut records = run(1, 3);
        records.extend(run(2, 2));
        let cells = mark_group_starts(records);
        let flags: Vec<bool> = cells.iter().map(|c| c.group_start).collect();
        assert_eq!(flags, vec![true, false, false, true, false]);
    }

    #[test]
    fn groups_never_share_a_page() {
        let mut records = run(1, 2);
        records.extend(run(2, 2));
        let pages = paginate(records, 70);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].radical, 1);
        assert_eq!(pages[1].radical, 2);
        assert!(pages.iter().all(|p| p.cells[0].group_start));
    }

    #[test]
    fn long_group_spans_pages_without_reflagging() {
        let pages = paginate(run(5, 7), 3);
        let sizes: Vec<usize> = pages.iter().map(|p| p.cells.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert!(!pages[0].is_continuation());
        assert!(pages[1].is_continuation());
        assert!(pages[2].is_continuation());
        let starts = pages
            .iter()
            .flat_map(|p| &p.cells)
            .filter(|c| c.group_start)
            .count();
        assert_eq!(starts, 1);

        let strokes: Vec<i32> = pages
            .iter()
            .flat_map(|p| &p.cells)
            .map(|c| c.record.stroke())
            .collect();
        assert_eq!(strokes, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn exact_multiple_has_no_empty_page() {
        let pages = paginate(run(3, 6), 3);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn empty_input_gives_no_pages() {
        assert!(paginate(Vec::new(), 70).is_empty());
    }

    #[test]
    fn zero_capacity_behaves_as_one() {
        let pages = paginate(run(4, 2), 0);
        assert_eq!(pages.len(), 2);
    }
}
