use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{IndexError, Result};
use crate::pipeline::{
    PipelineConfig, DEFAULT_COLUMNS, DEFAULT_CUSTOM_RANGE, DEFAULT_GENERATED_COUNT, DEFAULT_ROWS,
};

pub const ENV_PREFIX: &str = "KANJI";
const DEFAULT_CONFIG_FILE: &str = "kanji_grid";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub unihan_url: String,
    pub irg_list_url: String,
    pub glyph_base_url: String,
    pub attributes_path: PathBuf,
    pub html_path: PathBuf,
    #[serde(default)]
    pub json_path: Option<PathBuf>,
    pub font_dir: PathBuf,
    pub custom_range_low: u32,
    pub custom_range_high: u32,
    pub columns: usize,
    pub rows: usize,
    pub generated_count: u32,
    pub fetch_concurrency: usize,
    pub timeout_secs: u64,
}

impl Settings {
    /// Defaults, then the config file (if any), then `KANJI_*` variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("unihan_url", "https://www.unicode.org/Public/UCD/latest/ucd/Unihan.zip")?
            .set_default("irg_list_url", "https://hc.jsecs.org/irg/ws2024/app/list.php?show_all=1")?
            .set_default("glyph_base_url", "https://glyphwiki.org/glyph/")?
            .set_default("attributes_path", "irg2024_attributes.json")?
            .set_default("html_path", "ALL_KANJI.html")?
            .set_default("font_dir", "fonts")?
            .set_default("custom_range_low", i64::from(*DEFAULT_CUSTOM_RANGE.start()))?
            .set_default("custom_range_high", i64::from(*DEFAULT_CUSTOM_RANGE.end()))?
            .set_default("columns", DEFAULT_COLUMNS as i64)?
            .set_default("rows", DEFAULT_ROWS as i64)?
            .set_default("generated_count", i64::from(DEFAULT_GENERATED_COUNT))?
            .set_default("fetch_concurrency", 8i64)?
            .set_default("timeout_secs", 60i64)?;

        let builder = match file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Core configuration, rejecting values the pipeline cannot honour.
    pub fn pipeline(&self) -> Result<PipelineConfig> {
        if self.columns == 0 || self.rows == 0 {
            return Err(IndexError::InvalidConfig(format!(
                "page grid must be at least 1x1, got {}x{}",
                self.columns, self.rows
            )));
        }
        if self.columns.checked_mul(self.rows).is_none() {
            return Err(IndexError::InvalidConfig(format!(
                "page grid {}x{} is too large",
                self.columns, self.rows
            )));
        }
        if self.custom_range_low > self.custom_range_high {
            return Err(IndexError::InvalidConfig(format!(
                "custom range is empty: {:#X} > {:#X}",
                self.custom_range_low, self.custom_range_high
            )));
        }
        Ok(PipelineConfig {
            custom_range: self.custom_range_low..=self.custom_range_high,
            columns: self.columns,
            rows: self.rows,
            generated_count: self.generated_count,
        })
    }
}
