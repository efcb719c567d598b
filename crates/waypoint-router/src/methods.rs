//! Per-path method table.
//!
//! A [`MethodTable`] maps HTTP methods to route keys for a single path
//! pattern. Any [`Method`], including extension methods, can be stored.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to route keys for one path.
///
/// Each binding also keeps the parameter names of the pattern it was
/// registered with, so methods sharing a path may name their parameters
/// differently.
///
/// # Example
///
/// ```rust
/// use waypoint_router::MethodTable;
/// use http::Method;
///
/// let mut table = MethodTable::new();
/// table.insert(Method::GET, "GET /users");
/// table.insert(Method::POST, "POST /users");
///
/// assert_eq!(table.get(&Method::GET), Some("GET /users"));
/// assert_eq!(table.get(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodTable {
    entries: SmallVec<[Binding; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    method: Method,
    key: String,
    names: Vec<String>,
}

impl MethodTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `method` to `key`, returning the key it replaced.
    pub fn insert(&mut self, method: Method, key: impl Into<String>) -> Option<String> {
        self.bind(method, key, Vec::new())
    }

    /// Binds `method` to `key` with the parameter names of its pattern,
    /// returning the key it replaced.
    pub fn bind(&mut self, method: Method, key: impl Into<String>, names: Vec<String>) -> Option<String> {
        let key = key.into();
        if let Some(existing) = self.entries.iter_mut().find(|b| b.method == method) {
            existing.names = names;
            return Some(std::mem::replace(&mut existing.key, key));
        }
        self.entries.push(Binding { method, key, names });
        None
    }

    /// Returns the key bound to `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&str> {
        self.find(method).map(|b| b.key.as_str())
    }

    /// Parameter names, in path order, of the pattern bound to `method`.
    #[must_use]
    pub fn names(&self, method: &Method) -> Option<&[String]> {
        self.find(method).map(|b| b.names.as_slice())
    }

    fn find(&self, method: &Method) -> Option<&Binding> {
        self.entries.iter().find(|b| b.method == *method)
    }

    /// Copies every binding of `other` into this table. Later bindings win.
    pub fn merge(&mut self, other: MethodTable) {
        for binding in other.entries {
            self.bind(binding.method, binding.key, binding.names);
        }
    }

    /// `true` when no method is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Methods bound in this table, in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.entries.iter().map(|b| b.method.clone()).collect()
    }
}
