//! Handler types.
//!
//! Handlers in Waypoint are synchronous functions over a fully buffered
//! request:
//!
//! - **Request handlers** and group validators: `(&Request, &mut Context) -> Outcome`
//! - **Contextualizers** build the per-request [`Context`]
//! - **Error handlers** receive the failing [`Outcome`] and write the response
//! - **Panic handlers** receive the [`Panic`] caught at the request boundary
//!
//! # Example
//!
//! ```rust
//! use http::StatusCode;
//! use waypoint_core::{Context, Outcome};
//! use waypoint_server::{handler, HandlerOptions, Request};
//!
//! let hello = handler(|_req: &Request, ctx: &mut Context| {
//!     let name = ctx.get_or_empty("user").str_or("world").to_string();
//!     Outcome::text_ok(StatusCode::OK, format!("hello {name}"))
//! });
//!
//! let options = HandlerOptions::new(hello).context(|_req: &Request| {
//!     let mut ctx = Context::new();
//!     ctx.put("user", "ada".to_string());
//!     Ok(ctx)
//! });
//! assert!(options.contextualizer().is_some());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use waypoint_core::{Context, Outcome};

/// A fully buffered inbound request.
pub type Request = http::Request<Bytes>;

/// The response written back to the client.
pub type Response = http::Response<Full<Bytes>>;

/// Boxed error returned by contextualizers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A request handler or group validator.
pub type Handler = Arc<dyn Fn(&Request, &mut Context) -> Outcome + Send + Sync>;

/// Builds the per-request context.
pub type Contextualizer = Arc<dyn Fn(&Request) -> Result<Context, BoxError> + Send + Sync>;

/// Writes the response for a failed outcome.
pub type ErrorHandler = Arc<dyn Fn(&Request, &Context, Outcome) -> Response + Send + Sync>;

/// Writes the response after a panic.
pub type PanicHandler = Arc<dyn Fn(&Request, &Panic) -> Response + Send + Sync>;

/// Wraps a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Request, &mut Context) -> Outcome + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A panic caught while serving a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panic {
    /// Key of the route being served (`"GET /x"`).
    pub route: String,
    /// The panic payload rendered as text.
    pub message: String,
}

impl Panic {
    pub(crate) fn new(route: impl Into<String>, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        Self {
            route: route.into(),
            message,
        }
    }
}

impl fmt::Display for Panic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic in '{}': {}", self.route, self.message)
    }
}

/// A route handler plus its optional context, error and panic overrides.
#[derive(Clone)]
pub struct HandlerOptions {
    handler: Handler,
    context: Option<Contextualizer>,
    error: Option<ErrorHandler>,
    panic: Option<PanicHandler>,
}

impl HandlerOptions {
    /// Options with no overrides.
    #[must_use]
    pub fn new(handler: Handler) -> Self {
        Self {
            handler,
            context: None,
            error: None,
            panic: None,
        }
    }

    /// Builds the context for this route instead of the global contextualizer.
    #[must_use]
    pub fn context<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> Result<Context, BoxError> + Send + Sync + 'static,
    {
        self.context = Some(Arc::new(f));
        self
    }

    /// Handles failures of this route instead of the global error handler.
    #[must_use]
    pub fn error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &Context, Outcome) -> Response + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(f));
        self
    }

    /// Handles panics of this route instead of the global panic handler.
    #[must_use]
    pub fn panic<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &Panic) -> Response + Send + Sync + 'static,
    {
        self.panic = Some(Arc::new(f));
        self
    }

    /// The request handler.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// The route contextualizer, if any.
    #[must_use]
    pub fn contextualizer(&self) -> Option<&Contextualizer> {
        self.context.as_ref()
    }

    /// The route error handler, if any.
    #[must_use]
    pub fn error_handler(&self) -> Option<&ErrorHandler> {
        self.error.as_ref()
    }

    /// The route panic handler, if any.
    #[must_use]
    pub fn panic_handler(&self) -> Option<&PanicHandler> {
        self.panic.as_ref()
    }
}

impl From<Handler> for HandlerOptions {
    fn from(handler: Handler) -> Self {
        Self::new(handler)
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("context", &self.context.is_some())
            .field("error", &self.error.is_some())
            .field("panic", &self.panic.is_some())
            .finish_non_exhaustive()
    }
}
