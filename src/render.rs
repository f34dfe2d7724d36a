use std::collections::HashSet;
use std::fmt::Write;

use crate::pagination::{Cell, Page};
use crate::record::FontRef;

/// Distinct fonts referenced by the pages, in first-seen order.
pub fn font_faces(pages: &[Page]) -> Vec<&FontRef> {
    let mut seen = HashSet::new();
    pages
        .iter()
        .flat_map(|p| &p.cells)
        .filter_map(|c| c.record.font())
        .filter(|f| seen.insert(f.family.as_str()))
        .collect()
}

pub fn to_json(pages: &[Page]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(pages)
}

const STYLE: &str = "
body { margin: 0; }
.sheet { break-after: page; page-break-after: always; padding: 5mm; }
.grid { display: grid; gap: 0; }
.cell { position: relative; display: flex; flex-direction: column; align-items: center; justify-content: center; aspect-ratio: 1; }
.char { font-size: 40px; line-height: 1; }
.code { font-family: monospace; font-size: 11px; color: #888; }
.radical-start { outline: 2px solid #000; }
.radical-label { position: absolute; top: 0; left: 0; font-size: 8px; color: #fff; background: #000; padding: 1px 3px; }
";

/// A self-contained HTML document with one sheet per page.
pub fn render_html(pages: &[Page], columns: usize) -> String {
    let mut out = String::with_capacity(pages.len() * 4096);
    out.push_str("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str("<title>CJK radical index</title>\n<style>");
    for font in font_faces(pages) {
        let _ = writeln!(
            out,
            "@font-face {{ font-family: '{}'; src: url('{}'); }}",
            escape(&font.family),
            escape(&font.file)
        );
    }
    out.push_str(STYLE);
    let _ = writeln!(
        out,
        ".grid {{ grid-template-columns: repeat({}, 1fr); }}",
        columns.max(1)
    );
    out.push_str("</style>\n</head>\n<body>\n");

    for page in pages {
        let _ = writeln!(
            out,
            "<section class=\"sheet\" data-radical=\"{}\">\n<div class=\"grid\">",
            page.radical
        );
        for cell in &page.cells {
            write_cell(&mut out, cell);
        }
        out.push_str("</div>\n</section>\n");
    }

    let _ = writeln!(out, "<footer>{} pages</footer>", pages.len());
    out.push_str("</body>\n</html>\n");
    out
}

fn write_cell(out: &mut String, cell: &Cell) {
    let record = &cell.record;
    let class = if cell.group_start {
        "cell radical-start"
    } else {
        "cell"
    };
    let _ = write!(out, "<div class=\"{}\">", class);
    if cell.group_start {
        let _ = write!(out, "<div class=\"radical-label\">R{}</div>", record.radical());
    }
    match record.font() {
        Some(font) => {
            let _ = write!(
                out,
                "<div class=\"char\" style=\"font-family: '{}';\">",
                escape(&font.family)
            );
        }
        None => out.push_str("<div class=\"char\">"),
    }
    let _ = writeln!(
        out,
        "{}</div><div class=\"code\">{}</div></div>",
        escape(&record.display_form().glyph().to_string()),
        escape(record.display_label())
    );
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::paginate;
    use crate::record::CharacterRecord;

    fn sample_pages() -> Vec<Page> {
        let records = vec![
            CharacterRecord::native(0x4E00, '一', 1, 0),
            CharacterRecord::custom_range(0x323B7, 1, 4),
            CharacterRecord::custom_range(0x323B7, 1, 4),
            CharacterRecord::native(0x4E28, '丨', 2, 0),
        ];
        paginate(records, 70)
    }

    #[test]
    fn fonts_are_declared_once() {
        let pages = sample_pages();
        assert_eq!(font_faces(&pages).len(), 1);
        let html = render_html(&pages, 10);
        assert_eq!(html.matches("@font-face").count(), 1);
        assert!(html.contains("url('u323b7.ttf')"));
    }

    #[test]
    fn group_starts_are_marked() {
        let html = render_html(&sample_pages(), 10);
        assert_eq!(html.matches("radical-start\"").count(), 2);
        assert!(html.contains(">R1</div>"));
        assert!(html.contains(">R2</div>"));
        assert!(html.contains("U+4E00"));
        assert_eq!(html.matches("<section class=\"sheet\"").count(), 2);
    }

    #[test]
    fn empty_document() {
        let html = render_html(&[], 10);
        assert!(html.contains("<footer>0 pages</footer>"));
        assert!(!html.contains("<section"));
    }

    #[test]
    fn json_carries_flags_and_labels() {
        let json = to_json(&sample_pages()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0]["cells"][0];
        assert_eq!(first["group_start"], true);
        assert_eq!(first["record"]["display_label"], "U+4E00");
        assert_eq!(first["record"]["source_kind"], "native_unicode");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href='x'>&"), "&lt;a href=&#39;x&#39;&gt;&amp;");
    }
}
