//! Route table built on the radix tree.

use http::Method;

use crate::node::Node;
use crate::params::Params;
use crate::{Lookup, RouteMatch};

/// Maps `(method, path pattern)` pairs to route keys.
///
/// # Example
///
/// ```rust
/// use waypoint_router::{Lookup, RouteTable};
/// use http::Method;
///
/// let mut table = RouteTable::new();
/// table.insert(Method::GET, "/hello/{place}", "GET /hello/{place}");
///
/// match table.lookup(&Method::GET, "/hello/world") {
///     Lookup::Found(found) => {
///         assert_eq!(found.key, "GET /hello/{place}");
///         assert_eq!(found.params.get("place"), Some("world"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable {
    root: Node,
    route_count: usize,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Binds `method` on `pattern` to `key`.
    ///
    /// Returns the key previously bound to the same method and pattern.
    pub fn insert(&mut self, method: Method, pattern: &str, key: impl AsRef<str>) -> Option<String> {
        let replaced = self.root.insert(pattern, method, key.as_ref());
        if replaced.is_none() {
            self.route_count += 1;
        }
        replaced
    }

    /// Resolves a concrete request path.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let Some((methods, params)) = self.root.match_path(path) else {
            return Lookup::NotFound;
        };
        let mut params = params;
        match methods.get(method) {
            Some(key) => {
                if let Some(names) = methods.names(method) {
                    params.rename(names);
                }
                Lookup::Found(RouteMatch::new(key, params))
            }
            None => Lookup::MethodNotAllowed(methods.allowed_methods()),
        }
    }

    /// Resolves a path without considering the method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        self.root.match_path(path).map(|(_, params)| params)
    }

    /// Number of distinct `(method, pattern)` bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
