//! CLI error types.

use ag_client::ClientError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Setup error from the core crate.
    #[error(transparent)]
    Core(#[from] ag_core::Error),

    /// Remote or batch failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ag_core::BatchError> for CliError {
    fn from(err: ag_core::BatchError) -> Self {
        Self::Client(ClientError::Batch(err))
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
