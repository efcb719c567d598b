//! Error types for the documentation crate.
//!
//! Documentation faults never reach request serving: the viewer logs them
//! and drops the affected entry.

use thiserror::Error;

/// Errors that can occur while building documentation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the OpenAPI document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Failed to parse a preloaded YAML document.
    #[error("Failed to parse OpenAPI YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Schema conversion failed.
    #[error("Failed to convert schema for '{type_name}': {reason}")]
    SchemaConversionError {
        /// The type being converted.
        type_name: String,
        /// The reason for the conversion failure.
        reason: String,
    },

    /// IO error when reading files.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DocsError {
    pub(crate) fn schema(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaConversionError {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_yaml_error() {
        let err: DocsError = serde_yaml::from_str::<Vec<String>>("{not: [a list")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::YamlError(_)));
    }

    #[test]
    fn test_schema_conversion_error() {
        let err = DocsError::schema("User", "duplicate property 'name'");
        assert!(err.to_string().contains("User"));
        assert!(err.to_string().contains("duplicate property"));
    }
}
