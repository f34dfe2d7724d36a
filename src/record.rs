use serde::Serialize;

/// Glyph typeset in cells whose real shape comes from an external font.
pub const PLACEHOLDER_GLYPH: char = '〓';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Plain Unihan character, covered by the regular font stack.
    NativeUnicode,
    /// Real code point inside the configured custom-font range.
    CustomUnicodeRange,
    /// GlyphWiki dictionary glyph with no code point.
    Supplementary,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::NativeUnicode => "native_unicode",
            SourceKind::CustomUnicodeRange => "custom_unicode_range",
            SourceKind::Supplementary => "supplementary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayForm {
    Char(char),
    Placeholder,
}

impl DisplayForm {
    pub fn glyph(&self) -> char {
        match self {
            DisplayForm::Char(c) => *c,
            DisplayForm::Placeholder => PLACEHOLDER_GLYPH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontRef {
    pub file: String,
    pub family: String,
}

/// One cell's worth of data. Built once by the extractor or the synthesizer,
/// then only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterRecord {
    radical: u16,
    stroke: i32,
    sort_key: u64,
    display_form: DisplayForm,
    source_kind: SourceKind,
    display_label: String,
    font: Option<FontRef>,
}

impl CharacterRecord {
    pub fn native(code_point: u32, ch: char, radical: u16, stroke: i32) -> Self {
        CharacterRecord {
            radical,
            stroke,
            sort_key: u64::from(code_point),
            display_form: DisplayForm::Char(ch),
            source_kind: SourceKind::NativeUnicode,
            display_label: unicode_label(code_point),
            font: None,
        }
    }

    pub fn custom_range(code_point: u32, radical: u16, stroke: i32) -> Self {
        CharacterRecord {
            radical,
            stroke,
            sort_key: u64::from(code_point),
            display_form: DisplayForm::Placeholder,
            source_kind: SourceKind::CustomUnicodeRange,
            display_label: unicode_label(code_point),
            font: Some(FontRef {
                file: format!("u{:x}.ttf", code_point),
                family: format!("U_CUSTOM_FONT_{:X}", code_point),
            }),
        }
    }

    pub fn supplementary(
        radical: u16,
        stroke: i32,
        sort_key: u64,
        display_label: String,
        font: FontRef,
    ) -> Self {
        CharacterRecord {
            radical,
            stroke,
            sort_key,
            display_form: DisplayForm::Placeholder,
            source_kind: SourceKind::Supplementary,
            display_label,
            font: Some(font),
        }
    }

    pub fn radical(&self) -> u16 {
        self.radical
    }

    pub fn stroke(&self) -> i32 {
        self.stroke
    }

    pub fn sort_key(&self) -> u64 {
        self.sort_key
    }

    pub fn display_form(&self) -> DisplayForm {
        self.display_form
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    pub fn font(&self) -> Option<&FontRef> {
        self.font.as_ref()
    }

    /// Total ordering key: radical, then residual strokes, then identity.
    pub fn order_key(&self) -> (u16, i32, u64) {
        (self.radical, self.stroke, self.sort_key)
    }
}

fn unicode_label(code_point: u32) -> String {
    format!("U+{:04X}", code_point)
}
