use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirstatError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid exclusion pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scan was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DirstatError>;
