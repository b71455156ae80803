//! Client error types.

use ag_core::BatchError;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-2xx status.
    #[error("API error: {status} - {message}{}", body_suffix(.body))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Description of the status code.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An entity source could not be read.
    #[error("could not read {path}: {message}")]
    Source {
        /// Location of the source.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Setup error from the core crate.
    #[error(transparent)]
    Core(#[from] ag_core::Error),

    /// Failure of a single entity inside a batch.
    #[error("{kind} '{name}': {source}")]
    Entity {
        /// Entity kind label.
        kind: &'static str,
        /// Entity name.
        name: String,
        /// Underlying failure.
        #[source]
        source: Box<ClientError>,
    },

    /// One or more entities of a batch failed.
    #[error("{0}")]
    Batch(#[from] BatchError),
}

impl ClientError {
    /// Attaches the entity this error belongs to.
    #[must_use]
    pub fn for_entity(self, kind: &'static str, name: impl Into<String>) -> Self {
        Self::Entity {
            kind,
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// HTTP status of the underlying API error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Entity { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns true if the API reported that the entity already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Returns true if the API reported that the entity does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// Client result type.
pub type ClientResult<T> = Result<T, ClientError>;
