//! Payload encoders.
//!
//! An [`Encoder`] turns a [`Payload`] into response bytes and declares the
//! headers that describe them. Three encoders ship with the crate; callers
//! can supply their own by implementing the trait.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::error::CoreResult;
use crate::payload::Payload;

/// Converts payloads into bytes plus the headers that describe them.
pub trait Encoder: Send + Sync {
    /// Encodes the payload. An empty payload yields an empty body.
    fn encode(&self, payload: &Payload) -> CoreResult<Bytes>;

    /// Headers written alongside every body produced by this encoder.
    fn headers(&self) -> HeaderMap;
}

fn content_type(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
    headers
}

/// Indented JSON (one space per level), `Content-Type: application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, payload: &Payload) -> CoreResult<Bytes> {
        match payload.body() {
            None => Ok(Bytes::new()),
            Some(body) => Ok(Bytes::from(body.json_bytes(b" ")?)),
        }
    }

    fn headers(&self) -> HeaderMap {
        content_type("application/json")
    }
}

/// Indented XML (two spaces per level), `Content-Type: application/xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlEncoder;

impl Encoder for XmlEncoder {
    fn encode(&self, payload: &Payload) -> CoreResult<Bytes> {
        match payload.body() {
            None => Ok(Bytes::new()),
            Some(body) => Ok(Bytes::from(body.xml_string(2)?)),
        }
    }

    fn headers(&self) -> HeaderMap {
        content_type("application/xml")
    }
}

/// Plain text, `Content-Type: text/plain`.
///
/// Strings pass through untouched, objects and arrays fall back to the JSON
/// encoder and scalars use their display form.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEncoder;

impl Encoder for TextEncoder {
    fn encode(&self, payload: &Payload) -> CoreResult<Bytes> {
        let Some(body) = payload.body() else {
            return Ok(Bytes::new());
        };

        match body.json_value()? {
            serde_json::Value::Null => Ok(Bytes::new()),
            serde_json::Value::String(text) => Ok(Bytes::from(text)),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                JsonEncoder.encode(payload)
            }
            scalar => Ok(Bytes::from(scalar.to_string())),
        }
    }

    fn headers(&self) -> HeaderMap {
        content_type("text/plain")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct User {
        name: String,
        age: u32,
    }

    fn user() -> Payload {
        Payload::new(User {
            name: "Ada".to_string(),
            age: 36,
        })
    }

    #[test]
    fn test_empty_payload_is_empty_body() {
        assert!(JsonEncoder.encode(&Payload::Empty).unwrap().is_empty());
        assert!(XmlEncoder.encode(&Payload::Empty).unwrap().is_empty());
        assert!(TextEncoder.encode(&Payload::Empty).unwrap().is_empty());
    }

    #[test]
    fn test_json_encoder() {
        let bytes = JsonEncoder.encode(&user()).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            "{\n \"name\": \"Ada\",\n \"age\": 36\n}"
        );
        assert_eq!(
            JsonEncoder.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_xml_encoder() {
        let bytes = XmlEncoder.encode(&user()).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with("<User>"));
        assert!(text.contains("\n  <name>Ada</name>"));
        assert_eq!(
            XmlEncoder.headers().get(CONTENT_TYPE).unwrap(),
            "application/xml"
        );
    }

    #[test]
    fn test_xml_encoder_sequence_writes_each_element() {
        let users = vec![
            User { name: "Ada".to_string(), age: 36 },
            User { name: "Alan".to_string(), age: 41 },
        ];
        let bytes = XmlEncoder.encode(&Payload::new(users)).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(text.matches("<User>").count(), 2);
        assert!(text.contains("<name>Ada</name>"));
        assert!(text.contains("<name>Alan</name>"));
    }

    #[test]
    fn test_xml_encoder_wraps_scalars() {
        let bytes = XmlEncoder.encode(&Payload::new("bad id")).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap().trim(), "<string>bad id</string>");

        let bytes = XmlEncoder.encode(&Payload::new(5_i32)).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap().trim(), "<i32>5</i32>");
    }

    #[test]
    fn test_text_encoder_passes_strings_through() {
        let bytes = TextEncoder.encode(&Payload::new("plain words")).unwrap();
        assert_eq!(&bytes[..], b"plain words");
    }

    #[test]
    fn test_text_encoder_scalars_and_aggregates() {
        assert_eq!(&TextEncoder.encode(&Payload::new(42)).unwrap()[..], b"42");
        assert_eq!(&TextEncoder.encode(&Payload::new(true)).unwrap()[..], b"true");

        let mut map = BTreeMap::new();
        map.insert("k", 1);
        let bytes = TextEncoder.encode(&Payload::new(map)).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "{\n \"k\": 1\n}");
        assert_eq!(TextEncoder.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
    }
}
