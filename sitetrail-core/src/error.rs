use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Corrupt record file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
