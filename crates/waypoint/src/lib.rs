//! # Waypoint
//!
//! **HTTP routing with contextualizers, typed outcomes and generated OpenAPI
//! documentation.**
//!
//! - Patterned routes with path parameters and per-route context, error and
//!   panic handlers
//! - Group validators guarding every route under a path prefix
//! - [`Outcome`](core::Outcome) values encoded as JSON, XML, text or with a
//!   custom encoder
//! - OpenAPI 3 documents built from `#[derive(Reflect)]` types, served with
//!   Swagger UI
//! - HTTP, HTTPS and HTTP-to-HTTPS redirect listeners, CORS, static files and
//!   graceful shutdown
//!
//! ## Quick Start
//!
//! ```no_run
//! use waypoint::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_dotenv().load()?;
//!     init_logging(&LogConfig::for_mode(config.dev))?;
//!
//!     let mut router = Router::new();
//!     router
//!         .config(config)
//!         .doc_viewer(OpenApiViewer::new().load(OpenApiViewerOptions::new().title("Greeter").port(8080)))
//!         .route_document(
//!             Method::GET,
//!             handler(|req, _ctx| {
//!                 let place = req.param("place").map(|p| p.as_str().to_string()).unwrap_or_default();
//!                 Outcome::text_ok(StatusCode::OK, format!("hello {place}"))
//!             }),
//!             "/hello/{}",
//!             DocRoute::new().parameter("place", "Where to say hello"),
//!         );
//!
//!     router.listen(":8080").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request pipeline
//!
//! ```text
//! CORS → route lookup → contextualizer → group validators → handler → writer
//!                                              │                 │
//!                                              └──── failure ────┴→ error handler
//! any panic ─────────────────────────────────────────────────────→ panic handler
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use waypoint_config as config;
pub use waypoint_core as core;
pub use waypoint_docs as docs;
pub use waypoint_router as router;
pub use waypoint_server as server;
pub use waypoint_telemetry as telemetry;

/// The [`Reflect`](docs::Reflect) trait and its derive.
pub use waypoint_docs::Reflect;

/// Prelude module for convenient imports.
///
/// ```rust
/// use waypoint::prelude::*;
///
/// let mut router = Router::new();
/// router.route(Method::GET, handler(|_, _| Outcome::accept(StatusCode::NO_CONTENT)), "/health", &[]);
/// ```
pub mod prelude {
    pub use http::{Method, StatusCode};

    pub use waypoint_config::{ConfigLoader, WaypointConfig};
    pub use waypoint_core::{Arg, Context, Encoder, JsonEncoder, MediaType, Outcome, TextEncoder, Value, XmlEncoder};
    pub use waypoint_docs::{
        doc_tags, DocGroup, DocPayload, DocRoute, DocViewer, OpenApiViewer, OpenApiViewerOptions, Reflect, VoidViewer,
    };
    pub use waypoint_server::{
        fallback, handler, input_bytes, input_json, input_text, input_xml, validate, Cors, Handler, HandlerOptions,
        InputOpts, Request, RequestExt, Response, Router, Server, ShutdownSignal,
    };
    pub use waypoint_telemetry::{init_logging, LogConfig};
}
