use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::attributes::{Attribute, AttributeMap};

static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">([0-9]{5})<").unwrap());
static RS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,3})'?\.([0-9]{1,2})(\.[0-9]+)?").unwrap());

const MAX_KANGXI_RADICAL: u16 = 214;

/// Parse the working-set list page (`list.php?show_all=1`) into the rows
/// whose radical-stroke value could be identified.
pub fn parse_list_page(html: &str) -> AttributeMap {
    let mut map = AttributeMap::new();
    let mut rows = 0usize;

    for row in html.split("</tr>") {
        let Some(id) = ID_RE.captures(row).map(|c| c[1].to_string()) else {
            continue;
        };
        rows += 1;
        if let Some(attr) = find_attribute(row) {
            map.insert(id, attr);
        }
    }

    info!(rows, identified = map.len(), "IRG list page parsed");
    map
}

/// First standalone `rad.str` token with a Kangxi radical. Tokens glued to
/// letters, digits or dashes (`G-12.3`, `UTC-00791.5`) are source references.
fn find_attribute(row: &str) -> Option<Attribute> {
    for caps in RS_RE.captures_iter(row) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        // a glued sub-index may be dropped, leaving the dot as the boundary
        let short_end = caps.get(3).and(caps.get(2)).map(|m| m.end());
        if !is_standalone(row, whole.start(), whole.end(), short_end) {
            continue;
        }
        let (Ok(radical), Ok(stroke)) = (caps[1].parse::<u16>(), caps[2].parse::<i32>()) else {
            continue;
        };
        if (1..=MAX_KANGXI_RADICAL).contains(&radical) {
            return Some(Attribute { radical, stroke });
        }
        debug!(radical, "radical out of Kangxi range, trying next token");
    }
    None
}

fn is_standalone(row: &str, start: usize, end: usize, short_end: Option<usize>) -> bool {
    let before_ok = row[..start].chars().next_back().map_or(true, |c| !is_word(c));
    let after_ok = |end: usize| row[end..].chars().next().map_or(true, |c| !is_word(c));
    before_ok && (after_ok(end) || short_end.is_some_and(after_ok))
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
