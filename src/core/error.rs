//! Error types and handling for the letter export service
//!
//! Per-operation problems in a delta are never errors: the translator skips
//! them. Everything that can actually fail an export is listed here.

use std::fmt;
use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the letter export service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Editor content lacks the `textValue` + `delta.ops` shape
    #[error("Unsupported content format: {0}")]
    UnsupportedFormat(String),

    /// No bearer credential was supplied
    #[error("Missing authentication token")]
    MissingCredential,

    /// Invalid request input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A call to the remote document service failed
    #[error("{step} failed: {source}")]
    Remote {
        /// Export step that issued the call
        step: ExportStep,
        /// Underlying remote failure
        #[source]
        source: RemoteError,
    },

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the remote document service
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (connect, timeout, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Service answered successfully but the payload was not understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// The remote steps of an export, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStep {
    /// Creating the blank document
    CreateDocument,
    /// Applying the translated requests
    BatchUpdate,
    /// Renaming/relocating the document in Drive
    Rename,
    /// Deleting an orphaned document after a failure
    Delete,
}

impl fmt::Display for ExportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStep::CreateDocument => "create document",
            ExportStep::BatchUpdate => "batch update",
            ExportStep::Rename => "rename document",
            ExportStep::Delete => "delete document",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unsupported format error
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Tag a remote failure with the step that produced it
    pub fn remote(step: ExportStep, source: impl Into<RemoteError>) -> Self {
        Self::Remote {
            step,
            source: source.into(),
        }
    }

    /// Check if this error was raised before any remote call could happen
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            Error::MissingCredential | Error::InvalidInput(_) | Error::UnsupportedFormat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display_names_step() {
        let err = Error::remote(
            ExportStep::BatchUpdate,
            RemoteError::Status {
                status: 400,
                body: "bad range".to_string(),
            },
        );
        assert_eq!(err.to_string(), "batch update failed: service returned 400: bad range");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::MissingCredential.is_pre_flight());
        assert!(Error::unsupported_format("no delta").is_pre_flight());

        let remote = Error::remote(ExportStep::Rename, RemoteError::InvalidResponse("x".into()));
        assert!(!remote.is_pre_flight());
    }
}
