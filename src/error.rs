use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the I/O layer around the index pipeline. The pipeline itself
/// never fails: bad records are skipped, missing attributes are defaulted.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("unreadable archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read archive entry '{entry}': {source}")]
    ArchiveEntry { entry: String, source: io::Error },

    #[error("attribute store {} is not valid JSON: {source}", .path.display())]
    AttributeStore {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("supplementary table line {line}: {reason}")]
    Table { line: usize, reason: String },

    #[error(transparent)]
    Settings(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Fetch { url: String, source: reqwest::Error },
}

impl IndexError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IndexError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
