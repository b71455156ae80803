//! Error handling for apigee-rs core types.
//!
//! These errors cover setup problems that are detected before any remote call
//! is made: bad configuration values and invalid arguments. Remote failures
//! live in `ag-client`.

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a configuration error for a missing required setting.
    #[must_use]
    pub fn missing(setting: &str) -> Self {
        Self::Config(format!("{setting} is required"))
    }
}
