//! Request body decoding.
//!
//! Every reader returns the decoded value or a [`Rejection`] that converts
//! into the [`Outcome`] the handler should return:
//!
//! - malformed JSON or XML, or invalid UTF-8 for text: `422 Unprocessable Entity`
//! - a body over a strict limit: `413 Payload Too Large`
//!
//! ```rust
//! use bytes::Bytes;
//! use http::StatusCode;
//! use serde::Deserialize;
//! use waypoint_core::Outcome;
//! use waypoint_server::{input_json, Request};
//!
//! #[derive(Deserialize)]
//! struct Greeting {
//!     place: String,
//! }
//!
//! fn greet(req: &Request) -> Outcome {
//!     match input_json::<Greeting>(req) {
//!         Ok(greeting) => Outcome::text_ok(StatusCode::OK, format!("hello {}", greeting.place)),
//!         Err(rejection) => rejection.into(),
//!     }
//! }
//!
//! let ok = greet(&Request::new(Bytes::from(r#"{"place":"world"}"#)));
//! assert_eq!(ok.status(), Some(StatusCode::OK));
//!
//! let bad = greet(&Request::new(Bytes::from("{")));
//! assert_eq!(bad.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
//! ```

use std::fmt;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use waypoint_core::Outcome;

use crate::handler::Request;

/// Limits applied while reading a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOpts {
    /// Reject bodies over `limit` instead of truncating them.
    pub strict: bool,
    /// Maximum number of bytes to read. `0` means unlimited.
    pub limit: usize,
}

impl InputOpts {
    /// Rejects bodies over `limit` bytes with `413`.
    #[must_use]
    pub const fn strict(limit: usize) -> Self {
        Self { strict: true, limit }
    }

    /// Silently truncates bodies to `limit` bytes.
    #[must_use]
    pub const fn lax(limit: usize) -> Self {
        Self {
            strict: false,
            limit,
        }
    }
}

/// A body that could not be read or decoded.
#[derive(Debug, Clone)]
pub struct Rejection {
    outcome: Outcome,
    retained: Bytes,
}

impl Rejection {
    fn new(outcome: Outcome, retained: Bytes) -> Self {
        Self { outcome, retained }
    }

    fn unprocessable(message: impl fmt::Display, retained: Bytes) -> Self {
        Self::new(
            Outcome::err(StatusCode::UNPROCESSABLE_ENTITY, message.to_string()),
            retained,
        )
    }

    /// The failure to return from the handler.
    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// The bytes that were read before giving up. Never longer than the limit.
    #[must_use]
    pub fn retained(&self) -> &Bytes {
        &self.retained
    }

    /// Shortcut for `self.outcome().status()`.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.outcome.status()
    }

    fn status_text(&self) -> &'static str {
        self.status()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("rejected")
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        rejection.outcome
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome.payload().downcast_ref::<String>() {
            Some(message) => write!(f, "{}: {message}", self.status_text()),
            None => f.write_str(self.status_text()),
        }
    }
}

/// The whole body.
pub fn input_bytes(req: &Request) -> Result<Bytes, Rejection> {
    input_bytes_with_opts(req, InputOpts::default())
}

/// The body as UTF-8 text.
pub fn input_text(req: &Request) -> Result<String, Rejection> {
    input_text_with_opts(req, InputOpts::default())
}

/// The body decoded as JSON.
pub fn input_json<T: DeserializeOwned>(req: &Request) -> Result<T, Rejection> {
    input_json_with_opts(req, InputOpts::default())
}

/// The body decoded as XML.
pub fn input_xml<T: DeserializeOwned>(req: &Request) -> Result<T, Rejection> {
    input_xml_with_opts(req, InputOpts::default())
}

/// The body, limited by `opts`.
pub fn input_bytes_with_opts(req: &Request, opts: InputOpts) -> Result<Bytes, Rejection> {
    let body = req.body();
    if opts.limit == 0 || body.len() <= opts.limit {
        return Ok(body.clone());
    }

    let retained = body.slice(..opts.limit);
    if opts.strict {
        return Err(Rejection::new(
            Outcome::reject(StatusCode::PAYLOAD_TOO_LARGE),
            retained,
        ));
    }

    Ok(retained)
}

/// The body as UTF-8 text, limited by `opts`.
pub fn input_text_with_opts(req: &Request, opts: InputOpts) -> Result<String, Rejection> {
    let raw = input_bytes_with_opts(req, opts)?;
    match std::str::from_utf8(&raw) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => Err(Rejection::unprocessable(e, raw)),
    }
}

/// The body decoded as JSON, limited by `opts`.
pub fn input_json_with_opts<T: DeserializeOwned>(req: &Request, opts: InputOpts) -> Result<T, Rejection> {
    let raw = input_bytes_with_opts(req, opts)?;
    serde_json::from_slice(&raw).map_err(|e| Rejection::unprocessable(e, raw))
}

/// The body decoded as XML, limited by `opts`.
pub fn input_xml_with_opts<T: DeserializeOwned>(req: &Request, opts: InputOpts) -> Result<T, Rejection> {
    let raw = input_bytes_with_opts(req, opts)?;
    quick_xml::de::from_reader(raw.as_ref()).map_err(|e| Rejection::unprocessable(e, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use waypoint_core::{Encoder, JsonEncoder, OutcomeKind, Payload};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Pet {
        name: String,
        age: u32,
        vaccinated: bool,
    }

    fn request(body: impl Into<Bytes>) -> Request {
        Request::new(body.into())
    }

    #[test]
    fn test_strict_limit_rejects_and_retains_prefix() {
        let req = request("0123456789");
        let rejection = input_bytes_with_opts(&req, InputOpts::strict(5)).unwrap_err();

        assert_eq!(rejection.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
        assert_eq!(rejection.outcome().kind(), OutcomeKind::FailureEmpty);
        assert!(rejection.retained().len() <= 5);
        assert_eq!(rejection.to_string(), "Payload Too Large");
    }

    #[test]
    fn test_lax_limit_truncates() {
        let req = request("0123456789");
        let body = input_bytes_with_opts(&req, InputOpts::lax(5)).unwrap();
        assert_eq!(body, Bytes::from_static(b"01234"));
    }

    #[test]
    fn test_limit_zero_is_unlimited() {
        let req = request("0123456789");
        assert_eq!(input_bytes_with_opts(&req, InputOpts::strict(0)).unwrap().len(), 10);
        assert_eq!(input_bytes(&req).unwrap().len(), 10);
    }

    #[test]
    fn test_body_at_limit_passes_strict() {
        let req = request("01234");
        assert_eq!(input_bytes_with_opts(&req, InputOpts::strict(5)).unwrap().len(), 5);
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        let req = request(vec![0xff, 0xfe, 0xfd]);
        let rejection = input_text(&req).unwrap_err();
        assert_eq!(rejection.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));

        assert_eq!(input_text(&request("héllo")).unwrap(), "héllo");
    }

    #[test]
    fn test_json_round_trip_through_encoder() {
        let pet = Pet {
            name: "Rex".to_string(),
            age: 3,
            vaccinated: true,
        };
        let encoded = JsonEncoder.encode(&Payload::new(pet.clone())).unwrap();

        let decoded: Pet = input_json(&request(encoded)).unwrap();
        assert_eq!(decoded, pet);
    }

    #[test]
    fn test_json_decode_failure_is_422_with_message() {
        let rejection = input_json::<Pet>(&request(r#"{"name": 1}"#)).unwrap_err();
        let outcome: Outcome = rejection.into();

        assert!(outcome.is_err());
        assert_eq!(outcome.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(outcome.payload().downcast_ref::<String>().is_some());
    }

    #[test]
    fn test_json_strict_limit_wins_over_decoding() {
        let req = request(r#"{"name":"Rex","age":3,"vaccinated":true}"#);
        let rejection = input_json_with_opts::<Pet>(&req, InputOpts::strict(8)).unwrap_err();
        assert_eq!(rejection.status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[test]
    fn test_xml_decode() {
        let req = request("<Pet><name>Rex</name><age>3</age><vaccinated>true</vaccinated></Pet>");
        let pet: Pet = input_xml(&req).unwrap();
        assert_eq!(pet.name, "Rex");
        assert_eq!(pet.age, 3);

        let rejection = input_xml::<Pet>(&request("<Pet><name>Rex</name>")).unwrap_err();
        assert_eq!(rejection.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(rejection.to_string().starts_with("Unprocessable Entity: "));
    }
}
