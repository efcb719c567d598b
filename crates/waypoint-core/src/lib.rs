//! # Waypoint Core
//!
//! Core types shared by every Waypoint crate:
//!
//! - [`Outcome`] - what a handler returns: success, failure or continue, with a status,
//!   an optional payload and the [`Encoder`] that will serialize it
//! - [`Encoder`] - payload to bytes plus headers ([`JsonEncoder`], [`XmlEncoder`], [`TextEncoder`])
//! - [`Context`] - per-request key/value store of type-erased [`Value`]s
//! - [`Arg`] - typed parsing for textual inputs (path, query, environment)
//! - [`MediaType`] - JSON or XML
//! - [`CoreError`] - encoding failures

#![doc(html_root_url = "https://docs.rs/waypoint-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arg;
mod context;
mod encoder;
mod error;
mod media;
mod outcome;
mod payload;

pub use arg::Arg;
pub use context::{Context, RequestId, Value};
pub use encoder::{Encoder, JsonEncoder, TextEncoder, XmlEncoder};
pub use error::{CoreError, CoreResult};
pub use media::MediaType;
pub use outcome::{Outcome, OutcomeKind};
pub use payload::{Body, Payload};
