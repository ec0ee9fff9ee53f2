//! Error types for credential-core

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Credential error types
///
/// None of these are retried internally. Each carries the diagnostic the
/// operator needs (missing field name, HTTP status, raw response body).
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Cannot create master key file {path:?}: {source}")]
    KeyCreationError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Integrity check failed: {0}")]
    IntegrityError(String),

    #[error("Service account key is missing required field '{0}'")]
    SchemaError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid config entry: {0}")]
    InvalidEntry(String),

    #[error("Token endpoint unreachable: {0}")]
    NetworkError(String),

    #[error("Token endpoint returned HTTP {status}: {body}")]
    TokenEndpointError { status: u16, body: String },

    #[error(
        "Token response contained no refresh token. This usually means consent was \
         already granted for this client; revoke the app's access and run the flow again. \
         Response: {body}"
    )]
    MissingRefreshToken { body: String },

    #[error("Invalid operator input: {0}")]
    UserInputError(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid flow state: {0}")]
    FlowStateError(String),
}

impl CredentialError {
    /// Wrap an I/O failure on `path` as a storage error
    pub fn storage(path: &Path, err: std::io::Error) -> Self {
        Self::StorageError(format!("{}: {}", path.display(), err))
    }

    /// The only failure the process cannot recover from: the master key file
    /// could not be created because of a permission problem.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::KeyCreationError { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }

    /// Whether this failure came from talking to the token endpoint
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::TokenEndpointError { .. }
        )
    }
}
