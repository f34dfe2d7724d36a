use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IndexError, Result};

/// Radical bucket for ids the store knows about but could not classify.
pub const UNKNOWN_RADICAL: u16 = 215;
/// Radical bucket for ids with no attribute source at all.
pub const NO_SOURCE_RADICAL: u16 = 216;

/// Radical and residual stroke count of one working-set glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "rad")]
    pub radical: u16,
    #[serde(rename = "str")]
    pub stroke: i32,
}

impl Attribute {
    pub const UNKNOWN: Attribute = Attribute {
        radical: UNKNOWN_RADICAL,
        stroke: 0,
    };
    pub const NO_SOURCE: Attribute = Attribute {
        radical: NO_SOURCE_RADICAL,
        stroke: 0,
    };
}

/// Keyed by 5-digit zero-padded id ("00042").
pub type AttributeMap = BTreeMap<String, Attribute>;

pub fn format_id(n: u32) -> String {
    format!("{:05}", n)
}

#[derive(Debug, Clone, Default)]
pub struct AttributeResolver {
    map: AttributeMap,
}

impl AttributeResolver {
    /// Rows with radical 0 cannot be classified and go to the unknown bucket.
    pub fn new(mut map: AttributeMap) -> Self {
        for (id, attr) in map.iter_mut().filter(|(_, a)| a.radical == 0) {
            warn!(id = %id, "attribute entry with radical 0 treated as unknown");
            *attr = Attribute::UNKNOWN;
        }
        AttributeResolver { map }
    }

    /// Resolver for when no store could be loaded.
    pub fn absent() -> Self {
        AttributeResolver::default()
    }

    /// Stored pair verbatim, or `(216, 0)` when the id is not in the store.
    pub fn resolve(&self, id: &str) -> Attribute {
        self.map.get(id).copied().unwrap_or(Attribute::NO_SOURCE)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Fill ids `1..=count` the scrape missed with the store-level unknown bucket.
/// Entries outside the range are dropped.
pub fn consolidate(mut scraped: AttributeMap, count: u32) -> AttributeMap {
    (1..=count)
        .map(|n| {
            let id = format_id(n);
            let attr = scraped.remove(&id).unwrap_or(Attribute::UNKNOWN);
            (id, attr)
        })
        .collect()
}

pub fn count_unknown(map: &AttributeMap) -> usize {
    map.values()
        .filter(|a| a.radical == UNKNOWN_RADICAL)
        .count()
}

/// Read a store file. The file must hold a JSON object; rows that do not
/// decode as an attribute are kept as unknown.
pub fn load(path: &Path) -> Result<AttributeMap> {
    let raw = fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
    let rows: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(&raw).map_err(|source| IndexError::AttributeStore {
            path: path.to_path_buf(),
            source,
        })?;

    let mut bad = 0usize;
    let map: AttributeMap = rows
        .into_iter()
        .map(|(id, value)| {
            let attr = serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(id = %id, "unreadable attribute row treated as unknown: {}", e);
                bad += 1;
                Attribute::UNKNOWN
            });
            (id, attr)
        })
        .collect();
    debug!(path = %path.display(), entries = map.len(), bad, "attribute store loaded");
    Ok(map)
}

/// Load the store, degrading to an absent resolver when it is missing or
/// unreadable.
pub fn load_or_absent(path: &Path) -> AttributeResolver {
    match load(path) {
        Ok(map) => AttributeResolver::new(map),
        Err(e) => {
            warn!(
                "{}; generated entries fall back to radical {}",
                e, NO_SOURCE_RADICAL
            );
            AttributeResolver::absent()
        }
    }
}

pub fn save(path: &Path, map: &AttributeMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IndexError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(map).map_err(|source| IndexError::AttributeStore {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|e| IndexError::io(path, e))
}
