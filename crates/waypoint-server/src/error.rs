//! Server error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for listener operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised while starting or running a listener.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be parsed.
    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress {
        /// The address as given.
        addr: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Binding the socket failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The certificate or key could not be loaded.
    #[error("failed to load TLS material from {path}: {reason}")]
    TlsMaterial {
        /// File being read.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// rustls rejected the configuration.
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    /// I/O error while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub(crate) fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    pub(crate) fn tls_material(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::TlsMaterial {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
