//! Error types for Waypoint core.
//!
//! Encoding a payload is the only fallible operation in this crate. Decode
//! failures at the handler boundary are expressed as [`Outcome`](crate::Outcome)
//! values instead of Rust errors.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced while turning a payload into response bytes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The payload could not be serialized to JSON.
    #[error("Error marshalling entity to JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload could not be serialized to XML.
    #[error("Error marshalling entity to XML: {0}")]
    Xml(#[from] quick_xml::se::SeError),

    /// A caller-supplied encoder failed.
    #[error("Encoder '{encoder}' failed: {reason}")]
    Custom {
        /// Name of the failing encoder.
        encoder: String,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl CoreError {
    /// Creates an error for a custom encoder.
    pub fn custom(encoder: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Custom {
            encoder: encoder.into(),
            reason: reason.into(),
        }
    }
}
