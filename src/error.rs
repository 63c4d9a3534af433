use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the I/O-facing parts of the authoring core.
///
/// Authoring operations themselves (painting, placing, tagging, extraction)
/// never fail; they degrade to no-ops instead.
#[derive(Debug, Error)]
pub enum MapError {
    /// Reading or writing a file failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File that could not be read or written
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// A JSON document could not be parsed
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        /// File holding the malformed document
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },
    /// An in-memory JSON string could not be parsed
    #[error("JSON parse error: {0}")]
    Parse(serde_json::Error),
    /// In-memory state could not be serialized
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The asset pack is structurally valid JSON but semantically broken
    #[error("invalid asset pack: {0}")]
    InvalidPack(String),
    /// Unsupported file format (non-JSON)
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl MapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        MapError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Rejects anything that is not a `.json` path, matching the loader policy.
pub(crate) fn require_json(path: &std::path::Path) -> Result<(), MapError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(()),
        _ => Err(MapError::UnsupportedFormat(path.display().to_string())),
    }
}
