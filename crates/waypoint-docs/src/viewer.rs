//! Documentation viewers.
//!
//! A [`DocViewer`] receives every route and group registration and exposes
//! the endpoints that serve the resulting documentation. [`VoidViewer`]
//! disables documentation while keeping the router API unchanged.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;

use crate::doc::{DocGroup, DocOperation};

/// Body and content type produced by a documentation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocResponse {
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// Response body.
    pub body: Bytes,
}

impl DocResponse {
    /// An HTML page.
    #[must_use]
    pub fn html(body: impl Into<Bytes>) -> Self {
        Self {
            content_type: "text/html; charset=utf-8",
            body: body.into(),
        }
    }

    /// A JSON document.
    #[must_use]
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self {
            content_type: "application/json",
            body: body.into(),
        }
    }
}

/// Callback serving a documentation endpoint.
pub type DocHandlerFn = Arc<dyn Fn() -> DocResponse + Send + Sync>;

/// A documentation endpoint exposed by a viewer.
#[derive(Clone)]
pub struct DocViewerHandler {
    /// HTTP method.
    pub method: Method,
    /// Absolute route, not prefixed with the router base path.
    pub route: String,
    /// Serves the endpoint.
    pub handler: DocHandlerFn,
    /// Short name.
    pub name: String,
    /// Human readable description.
    pub description: String,
}

impl DocViewerHandler {
    /// The public description of this endpoint.
    #[must_use]
    pub fn source(&self) -> DocViewerSource {
        DocViewerSource {
            name: self.name.clone(),
            route: self.route.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for DocViewerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocViewerHandler")
            .field("method", &self.method)
            .field("route", &self.route)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A documentation endpoint as listed by `Router::viewer_sources`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocViewerSource {
    /// Short name.
    pub name: String,
    /// Route serving the documentation.
    pub route: String,
    /// Human readable description.
    pub description: String,
}

/// Accumulates route documentation and serves it.
///
/// Registration happens during router setup; the handlers returned by
/// [`DocViewer::handlers`] observe every registration made before the first
/// documentation request.
pub trait DocViewer: Send + Sync {
    /// Endpoints exposing the documentation.
    fn handlers(&self) -> Vec<DocViewerHandler>;

    /// Registers documentation shared by every route under `group`.
    fn register_group(&self, group: &str, data: &DocGroup);

    /// Registers a single route operation.
    fn register_route(&self, route: &DocOperation);
}

/// A viewer that documents nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidViewer;

impl DocViewer for VoidViewer {
    fn handlers(&self) -> Vec<DocViewerHandler> {
        Vec::new()
    }

    fn register_group(&self, _group: &str, _data: &DocGroup) {}

    fn register_route(&self, _route: &DocOperation) {}
}
