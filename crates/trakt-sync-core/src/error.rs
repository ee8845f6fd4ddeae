use thiserror::Error;
use trakt_sync_sources::SourceError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CacheError {
    /// A persisted file that must be readable is missing or unparseable.
    /// Never masked as an empty cache.
    #[error("Cache file {file} is corrupted: {reason}")]
    Corrupted { file: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Remote tracking service error: {0}")]
    Remote(#[from] SourceError),

    #[error("Failed to serialize {file}: {source}")]
    Serialization {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Library snapshot is invalid: {0}")]
    Parse(#[from] serde_json::Error),
}
