//! Error types for the filesystem backend.

use cattrans_core::ItemId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors that can occur in filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    /// Site not found at the specified path.
    #[error("site not found at '{0}'")]
    SiteNotFound(PathBuf),

    /// Site already exists.
    #[error("site already exists at '{0}'")]
    SiteExists(PathBuf),

    /// Article not found.
    #[error("article not found: {0}")]
    ArticleNotFound(ItemId),

    /// Title cannot be turned into an alias.
    #[error("invalid title: {0:?}")]
    InvalidTitle(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] cattrans_core::CoreError),
}
