//! Cross-origin resource sharing.
//!
//! A [`Cors`] policy is attached to the router and applied by every
//! listener before the request reaches routing. Preflight (`OPTIONS`)
//! requests are answered directly with `200 OK`.
//!
//! ```rust
//! use waypoint_server::Cors;
//!
//! let cors = Cors::empty()
//!     .allowed_origins(["https://app.example.com"])
//!     .allowed_methods(["GET", "POST"])
//!     .allow_credentials();
//! assert!(cors.credentials_allowed());
//! ```

use http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
};
use http::{Method, StatusCode};
use tracing::debug;

use crate::handler::{Request, Response};

/// Allowed origins, methods and headers, and whether credentials are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cors {
    allowed_origins: Vec<String>,
    allowed_methods: Vec<String>,
    allowed_headers: Vec<String>,
    allow_credentials: bool,
}

impl Cors {
    /// Nothing allowed, credentials off.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Any origin; GET, POST, PUT, DELETE and OPTIONS; `Content-Type` and
    /// `Authorization` headers; credentials on.
    #[must_use]
    pub fn permissive() -> Self {
        Self::empty()
            .allowed_origins(["*"])
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(["Content-Type", "Authorization"])
            .allow_credentials()
    }

    /// Replaces the allowed origins.
    #[must_use]
    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the allowed methods.
    #[must_use]
    pub fn allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the allowed request headers.
    #[must_use]
    pub fn allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Allows credentials.
    #[must_use]
    pub fn allow_credentials(mut self) -> Self {
        self.allow_credentials = true;
        self
    }

    /// Disallows credentials.
    #[must_use]
    pub fn not_allow_credentials(mut self) -> Self {
        self.allow_credentials = false;
        self
    }

    /// Allowed origins in order.
    #[must_use]
    pub fn origins(&self) -> &[String] {
        &self.allowed_origins
    }

    /// Allowed methods in order.
    #[must_use]
    pub fn methods(&self) -> &[String] {
        &self.allowed_methods
    }

    /// Allowed headers in order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.allowed_headers
    }

    /// `true` when credentials are allowed.
    #[must_use]
    pub fn credentials_allowed(&self) -> bool {
        self.allow_credentials
    }

    /// The CORS headers for a request carrying `origin`.
    ///
    /// An origin list of exactly `*` echoes the request origin and adds
    /// `Vary: Origin`. Empty lists produce no header.
    #[must_use]
    pub fn response_headers(&self, origin: Option<&HeaderValue>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let joined = self.allowed_origins.join(", ");
        if joined == "*" {
            if let Some(origin) = origin {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
            headers.insert(VARY, HeaderValue::from_static("Origin"));
        } else {
            insert_joined(&mut headers, ACCESS_CONTROL_ALLOW_ORIGIN, &joined);
        }

        insert_joined(&mut headers, ACCESS_CONTROL_ALLOW_METHODS, &self.allowed_methods.join(", "));
        insert_joined(&mut headers, ACCESS_CONTROL_ALLOW_HEADERS, &self.allowed_headers.join(", "));
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static(if self.allow_credentials { "true" } else { "false" }),
        );

        headers
    }

    /// Runs `next` with CORS headers added to its response.
    ///
    /// `OPTIONS` requests never reach `next`. Headers already set by `next`
    /// are kept.
    pub fn handle<F>(&self, req: Request, next: F) -> Response
    where
        F: FnOnce(Request) -> Response,
    {
        let headers = self.response_headers(req.headers().get(ORIGIN));

        if req.method() == Method::OPTIONS {
            debug!(path = %req.uri().path(), "answering preflight request");
            let mut response = Response::default();
            *response.status_mut() = StatusCode::OK;
            *response.headers_mut() = headers;
            return response;
        }

        let mut response = next(req);
        for (name, value) in &headers {
            if !response.headers().contains_key(name) {
                response.headers_mut().insert(name.clone(), value.clone());
            }
        }
        response
    }
}

fn insert_joined(headers: &mut HeaderMap, name: HeaderName, joined: &str) {
    if joined.is_empty() {
        return;
    }
    match HeaderValue::from_str(joined) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => debug!(header = %name, error = %e, "skipping invalid CORS header value"),
    }
}
