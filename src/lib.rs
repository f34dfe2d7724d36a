//! Radical/stroke index of CJK characters: Unihan records merged with
//! GlyphWiki dictionary glyphs, ordered and cut into printable pages.

pub mod archive;
pub mod attributes;
pub mod error;
pub mod fetch;
pub mod irg;
pub mod ordering;
pub mod pagination;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod settings;
pub mod supplementary;
pub mod unihan;

pub use error::{IndexError, Result};
pub use pagination::{Cell, Page};
pub use pipeline::PipelineConfig;
pub use record::{CharacterRecord, DisplayForm, FontRef, SourceKind};
