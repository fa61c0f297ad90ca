//! Error types for the LRP workspace

use thiserror::Error;

/// Workspace error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid data, configuration, or parameter vector
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
