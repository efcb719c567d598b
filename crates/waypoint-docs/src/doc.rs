//! Documentation attached to routes and route groups.
//!
//! ```rust
//! use http::StatusCode;
//! use waypoint_docs::{doc_tags, DocPayload, DocRoute};
//!
//! let doc = DocRoute::new()
//!     .description("Greets a place")
//!     .parameter("place", "Where to say hello")
//!     .request(DocPayload::json::<String>())
//!     .response(StatusCode::OK, DocPayload::xml::<Vec<String>>())
//!     .response(StatusCode::IM_A_TEAPOT, DocPayload::text().description("short and stout"))
//!     .tags(doc_tags(["greetings"]));
//!
//! assert_eq!(doc.responses.len(), 2);
//! ```

use std::fmt;

use http::{Method, StatusCode};
use indexmap::IndexMap;
use waypoint_core::MediaType;

use crate::reflect::{Reflect, Shape};

/// Parameter name to description.
pub type DocParameters = IndexMap<String, String>;

/// Status code (`"200"`, `"default"`) to payload.
pub type DocResponses = IndexMap<String, DocPayload>;

/// A documented request or response body.
#[derive(Clone)]
pub struct DocPayload {
    shape: fn() -> Shape,
    media: MediaType,
    content_type: &'static str,
    description: String,
}

impl DocPayload {
    /// A JSON body of type `T`.
    #[must_use]
    pub fn json<T: Reflect>() -> Self {
        Self::with_media::<T>(MediaType::Json, MediaType::Json.as_str())
    }

    /// An XML body of type `T`.
    #[must_use]
    pub fn xml<T: Reflect>() -> Self {
        Self::with_media::<T>(MediaType::Xml, MediaType::Xml.as_str())
    }

    /// A plain text body.
    #[must_use]
    pub fn text() -> Self {
        Self::with_media::<String>(MediaType::Json, "text/plain")
    }

    fn with_media<T: Reflect>(media: MediaType, content_type: &'static str) -> Self {
        Self {
            shape: T::shape,
            media,
            content_type,
            description: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Shape of the documented type.
    #[must_use]
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    /// Media type used to name schema components.
    #[must_use]
    pub fn media(&self) -> MediaType {
        self.media
    }

    /// Content type the body is listed under.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// The description; may be empty.
    #[must_use]
    pub fn description_text(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for DocPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocPayload")
            .field("media", &self.media)
            .field("content_type", &self.content_type)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Documentation shared by every route under a group prefix.
#[derive(Debug, Clone, Default)]
pub struct DocGroup {
    /// Headers every route in the group expects.
    pub headers: DocParameters,
    /// Cookies every route in the group expects.
    pub cookies: DocParameters,
    /// Responses every route in the group may produce.
    pub responses: DocResponses,
}

impl DocGroup {
    /// Empty group documentation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.headers.insert(name.into(), description.into());
        self
    }

    /// Documents a cookie.
    #[must_use]
    pub fn cookie(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), description.into());
        self
    }

    /// Documents a response.
    #[must_use]
    pub fn response(mut self, status: StatusCode, payload: DocPayload) -> Self {
        self.responses.insert(status.as_str().to_string(), payload);
        self
    }
}

/// Documentation for a single route.
#[derive(Debug, Clone, Default)]
pub struct DocRoute {
    /// Operation description.
    pub description: String,
    /// Path parameters.
    pub parameters: DocParameters,
    /// Query parameters.
    pub query: DocParameters,
    /// Uploaded files (multipart form fields).
    pub files: DocParameters,
    /// Cookies.
    pub cookies: DocParameters,
    /// Request body.
    pub request: Option<DocPayload>,
    /// Responses.
    pub responses: DocResponses,
    /// Explicit tags; derived from the path when `None`.
    pub tags: Option<Vec<String>>,
}

impl DocRoute {
    /// Empty route documentation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Documents a path parameter.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), description.into());
        self
    }

    /// Documents a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.query.insert(name.into(), description.into());
        self
    }

    /// Documents an uploaded file.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.files.insert(name.into(), description.into());
        self
    }

    /// Documents a cookie.
    #[must_use]
    pub fn cookie(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), description.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn request(mut self, payload: DocPayload) -> Self {
        self.request = Some(payload);
        self
    }

    /// Documents a response.
    #[must_use]
    pub fn response(mut self, status: StatusCode, payload: DocPayload) -> Self {
        self.responses.insert(status.as_str().to_string(), payload);
        self
    }

    /// Sets explicit tags.
    #[must_use]
    pub fn tags(mut self, tags: Option<Vec<String>>) -> Self {
        self.tags = tags;
        self
    }
}

/// A route registration as seen by a documentation viewer.
#[derive(Debug, Clone)]
pub struct DocOperation {
    /// HTTP method.
    pub method: Method,
    /// Router base path.
    pub base_path: String,
    /// Resolved path pattern below the base path.
    pub path: String,
    /// Route documentation.
    pub doc: DocRoute,
}

impl DocOperation {
    /// Creates an operation.
    #[must_use]
    pub fn new(method: Method, base_path: impl Into<String>, path: impl Into<String>, doc: DocRoute) -> Self {
        Self {
            method,
            base_path: base_path.into(),
            path: path.into(),
            doc,
        }
    }

    /// `base_path` followed by `path`.
    #[must_use]
    pub fn full_path(&self) -> String {
        format!("{}{}", self.base_path, self.path)
    }

    /// Explicit tags, or the base path and the first static path segment.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        if let Some(tags) = &self.doc.tags {
            return tags.clone();
        }

        let mut tags = Vec::new();
        if !self.base_path.is_empty() {
            tags.push(self.base_path.clone());
        }

        if let Some(first) = self.path.split('/').find(|segment| !segment.is_empty()) {
            if !first.starts_with('{') && !first.starts_with('*') {
                tags.push(first.to_string());
            }
        }

        tags
    }
}

/// Explicit operation tags.
pub fn doc_tags<I, S>(tags: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(tags.into_iter().map(Into::into).collect())
}
