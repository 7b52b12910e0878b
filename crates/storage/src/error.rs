use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Content store error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Failed to encode content entry: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Failed to prepare storage directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
