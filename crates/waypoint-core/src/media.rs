//! Media types understood by the encoders, decoders and the schema factory.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A payload media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaType {
    /// `application/json`
    #[serde(rename = "application/json")]
    Json,
    /// `application/xml`
    #[serde(rename = "application/xml")]
    Xml,
}

impl MediaType {
    /// Returns the MIME string for this media type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Returns the title-cased short name (`Json`, `Xml`).
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Json => "Json",
            Self::Xml => "Xml",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_strings() {
        assert_eq!(MediaType::Json.as_str(), "application/json");
        assert_eq!(MediaType::Xml.to_string(), "application/xml");
        assert_eq!(MediaType::Xml.title(), "Xml");
    }

    #[test]
    fn test_media_type_serialization() {
        let json = serde_json::to_string(&MediaType::Json).unwrap();
        assert_eq!(json, "\"application/json\"");
    }
}
