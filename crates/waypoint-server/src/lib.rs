//! # Waypoint Server
//!
//! Routing and serving for the Waypoint framework.
//!
//! - [`Router`]: route registration, contextualizers, group validators,
//!   error and panic handlers, documentation and static resources
//! - [`fallback`] and [`validate`] to compose handlers
//! - [`input_json`], [`input_xml`], [`input_text`] and [`input_bytes`] to read
//!   bodies as [`Outcome`](waypoint_core::Outcome) values
//! - [`Cors`] policy applied by every listener
//! - [`Server`]: HTTP, HTTPS and HTTP-to-HTTPS redirect listeners with
//!   graceful shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use http::{Method, StatusCode};
//! use waypoint_core::Outcome;
//! use waypoint_server::{handler, Cors, Router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router
//!         .cors(Cors::permissive())
//!         .route(Method::GET, handler(|_, _| Outcome::text_ok(StatusCode::OK, "pong")), "/ping", &[]);
//!
//!     router.listen(":8080").await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod combinators;
mod cors;
mod decode;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod shutdown;
mod static_files;
mod tls;

pub use combinators::{fallback, validate};
pub use cors::Cors;
pub use decode::{
    input_bytes, input_bytes_with_opts, input_json, input_json_with_opts, input_text, input_text_with_opts, input_xml,
    input_xml_with_opts, InputOpts, Rejection,
};
pub use error::{ServerError, ServerResult};
pub use handler::{
    handler, BoxError, Contextualizer, ErrorHandler, Handler, HandlerOptions, Panic, PanicHandler, Request, Response,
};
pub use request::{RequestExt, RouteKey, RouteParams};
pub use response::{empty, plain_text, write_outcome};
pub use router::Router;
pub use server::{Server, DEFAULT_MAX_BODY_SIZE, DEFAULT_SHUTDOWN_TIMEOUT};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
pub use static_files::{StaticFileError, StaticFiles};
pub use tls::load_acceptor;
