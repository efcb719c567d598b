//! Radix tree path matcher for Waypoint.
//!
//! The route table maps `(method, path pattern)` pairs to opaque route keys.
//! The dispatch layer owns everything else bound to a key (handlers,
//! contextualizers, error and panic handlers); this crate only answers
//! "which key serves this request, and with which path parameters".
//!
//! # Patterns
//!
//! - **Static** segments: `/users`
//! - **Parameters**: `/users/{id}`
//! - **Wildcards** for the rest of the path: `/files/{path...}` or `/files/*path`
//!
//! Per segment, static beats parameter beats wildcard, so `/users/me` wins over
//! `/users/{id}` for the path `/users/me`.
//!
//! # Example
//!
//! ```rust
//! use waypoint_router::{Lookup, RouteTable};
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.insert(Method::GET, "/users/{id}", "GET /users/{id}");
//!
//! assert!(matches!(table.lookup(&Method::GET, "/users/1"), Lookup::Found(_)));
//! assert!(matches!(table.lookup(&Method::PUT, "/users/1"), Lookup::MethodNotAllowed(_)));
//! assert!(matches!(table.lookup(&Method::GET, "/posts"), Lookup::NotFound));
//! ```

mod methods;
mod node;
mod params;
mod table;

use http::Method;

pub use methods::MethodTable;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use table::RouteTable;

/// A matched route: its key and the extracted path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The route key bound to the matched method and pattern.
    pub key: &'a str,
    /// Extracted path parameters.
    pub params: Params,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(key: &'a str, params: Params) -> Self {
        Self { key, params }
    }
}

/// Result of looking up a request in a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// A route serves this method and path.
    Found(RouteMatch<'a>),
    /// The path exists but not for this method. Carries the allowed methods.
    MethodNotAllowed(Vec<Method>),
    /// No pattern matches the path.
    NotFound,
}
