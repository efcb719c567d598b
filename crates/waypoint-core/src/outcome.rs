//! Handler outcomes.
//!
//! Every request handler, group validator and combinator returns an
//! [`Outcome`]. It records whether the work succeeded, the HTTP status to
//! write, an optional payload and the [`Encoder`] that will serialize it.
//!
//! # Shapes
//!
//! An outcome always has exactly one [`OutcomeKind`]:
//!
//! | Constructor | Kind |
//! |---|---|
//! | [`Outcome::ok`], [`Outcome::oks`] | `Success` |
//! | [`Outcome::accept`] | `SuccessEmpty` |
//! | [`Outcome::err`] | `Failure` |
//! | [`Outcome::reject`] | `FailureEmpty` |
//! | [`Outcome::next`] | `Continue` |
//!
//! # Example
//!
//! ```
//! use http::StatusCode;
//! use waypoint_core::{Outcome, OutcomeKind};
//!
//! let created = Outcome::oks(StatusCode::CREATED, "done").text();
//! assert_eq!(created.kind(), OutcomeKind::Success);
//! assert_eq!(created.status(), Some(StatusCode::CREATED));
//! ```

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::encoder::{Encoder, JsonEncoder, TextEncoder, XmlEncoder};
use crate::error::CoreResult;
use crate::payload::Payload;

/// The shape of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Success carrying a payload.
    Success,
    /// Success without a payload.
    SuccessEmpty,
    /// Failure carrying a payload.
    Failure,
    /// Failure without a payload.
    FailureEmpty,
    /// Neutral "proceed" value; bypasses automatic resolution.
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ok,
    Err,
    Next,
}

/// The result of running a handler.
#[derive(Clone)]
pub struct Outcome {
    state: State,
    status: Option<StatusCode>,
    payload: Payload,
    encoder: Arc<dyn Encoder>,
    headers: HeaderMap,
}

impl Outcome {
    fn build(state: State, status: Option<StatusCode>, payload: Payload) -> Self {
        Self {
            state,
            status,
            payload,
            encoder: Arc::new(JsonEncoder),
            headers: HeaderMap::new(),
        }
    }

    /// Success with `200 OK`.
    pub fn ok<T>(payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::oks(StatusCode::OK, payload)
    }

    /// Success with a custom status code.
    pub fn oks<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::build(State::Ok, Some(status), Payload::new(payload))
    }

    /// Failure with a status code and an error payload.
    pub fn err<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::build(State::Err, Some(status), Payload::new(payload))
    }

    /// Success without a body.
    #[must_use]
    pub fn accept(status: StatusCode) -> Self {
        Self::build(State::Ok, Some(status), Payload::Empty)
    }

    /// Failure without a body.
    #[must_use]
    pub fn reject(status: StatusCode) -> Self {
        Self::build(State::Err, Some(status), Payload::Empty)
    }

    /// The neutral "proceed" outcome. Counts as success for chaining.
    #[must_use]
    pub fn next() -> Self {
        Self::build(State::Next, None, Payload::Empty)
    }

    /// JSON-encoded success.
    pub fn json_ok<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::oks(status, payload).json()
    }

    /// XML-encoded success.
    pub fn xml_ok<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::oks(status, payload).xml()
    }

    /// Text-encoded success.
    pub fn text_ok<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::oks(status, payload).text()
    }

    /// JSON-encoded failure.
    pub fn json_err<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::err(status, payload).json()
    }

    /// XML-encoded failure.
    pub fn xml_err<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::err(status, payload).xml()
    }

    /// Text-encoded failure.
    pub fn text_err<T>(status: StatusCode, payload: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::err(status, payload).text()
    }

    /// Uses the JSON encoder (the default).
    #[must_use]
    pub fn json(self) -> Self {
        self.with_encoder(Arc::new(JsonEncoder))
    }

    /// Uses the XML encoder.
    #[must_use]
    pub fn xml(self) -> Self {
        self.with_encoder(Arc::new(XmlEncoder))
    }

    /// Uses the plain text encoder.
    #[must_use]
    pub fn text(self) -> Self {
        self.with_encoder(Arc::new(TextEncoder))
    }

    /// Uses a caller-supplied encoder.
    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Adds a response header written after the encoder's own headers.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the shape of this outcome.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match (self.state, self.payload.is_empty()) {
            (State::Ok, false) => OutcomeKind::Success,
            (State::Ok, true) => OutcomeKind::SuccessEmpty,
            (State::Err, false) => OutcomeKind::Failure,
            (State::Err, true) => OutcomeKind::FailureEmpty,
            (State::Next, _) => OutcomeKind::Continue,
        }
    }

    /// `true` for success and continue outcomes.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.state != State::Err
    }

    /// `true` for failure outcomes.
    #[must_use]
    pub fn is_err(&self) -> bool {
        self.state == State::Err
    }

    /// `true` for the continue outcome.
    #[must_use]
    pub fn is_next(&self) -> bool {
        self.state == State::Next
    }

    /// The status code. `None` only for the continue outcome.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The encoder that will serialize the payload.
    #[must_use]
    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }

    /// Extra headers attached with [`Outcome::with_header`].
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Encodes the payload with this outcome's encoder.
    pub fn encode(&self) -> CoreResult<Bytes> {
        self.encoder.encode(&self.payload)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("kind", &self.kind())
            .field("status", &self.status)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}
