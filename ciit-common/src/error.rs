//! Common error types for CIIT

use thiserror::Error;

/// Common result type for CIIT operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the CIIT crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file parse/serialize error (wraps serde_yaml::Error)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Session file parse/serialize error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested catalog or session record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
