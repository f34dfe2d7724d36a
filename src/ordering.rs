use crate::record::CharacterRecord;

/// Concatenate database records and synthetic records into one collection.
pub fn unify(
    database: impl IntoIterator<Item = CharacterRecord>,
    supplementary: impl IntoIterator<Item = CharacterRecord>,
) -> Vec<CharacterRecord> {
    database.into_iter().chain(supplementary).collect()
}

/// Ascending by `(radical, stroke, sort_key)`.
pub fn sort_records(records: &mut [CharacterRecord]) {
    records.sort_by_key(CharacterRecord::order_key);
}

pub fn order(
    database: impl IntoIterator<Item = CharacterRecord>,
    supplementary: impl IntoIterator<Item = CharacterRecord>,
) -> Vec<CharacterRecord> {
    let mut records = unify(database, supplementary);
    sort_records(&mut records);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FontRef;

    fn synthetic(radical: u16, stroke: i32, key: u64) -> CharacterRecord {
        CharacterRecord::supplementary(
            radical,
            stroke,
            key,
            format!("T+{}", key),
            FontRef {
                file: format!("t-{}.ttf", key),
                family: format!("GW_t_{}", key),
            },
        )
    }

    #[test]
    fn radical_then_stroke_then_key() {
        let db = vec![
            CharacterRecord::native(0x4E8C, '二', 7, 0),
            CharacterRecord::native(0x4E01, '丁', 1, 1),
            CharacterRecord::native(0x4E00, '一', 1, 0),
        ];
        let sup = vec![synthetic(1, 0, 0x1_0000_0005), synthetic(1, -1, 0x1_0000_0009)];
        let labels: Vec<String> = order(db, sup)
            .iter()
            .map(|r| r.display_label().to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["T+4294967305", "U+4E00", "T+4294967301", "U+4E01", "U+4E8C"]
        );
    }

    #[test]
    fn ordering_is_repeatable() {
        let build = || {
            order(
                vec![CharacterRecord::native(0x4E00, '一', 1, 0)],
                vec![synthetic(1, 0, 0x1_0000_0001), synthetic(216, 0, 0x1_0000_0002)],
            )
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn empty_inputs() {
        assert!(order(Vec::new(), Vec::new()).is_empty());
    }
}
