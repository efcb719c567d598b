//! Per-request context.
//!
//! A [`Context`] is a string-keyed map of type-erased [`Value`]s. It is
//! created once per request by a contextualizer (or empty), mutated by group
//! validators and read by the terminal handler.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A type-erased context value with typed accessors.
///
/// Every accessor returns `None` when the stored value is not exactly the
/// requested type; the `*_or` variants substitute a default instead.
#[derive(Clone, Default)]
pub struct Value {
    inner: Option<Arc<dyn Any + Send + Sync>>,
}

impl Value {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Some(Arc::new(value)),
        }
    }

    /// The zero value: holds nothing, every accessor misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Returns the value as `T`.
    #[must_use]
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.inner.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Returns a clone of the value as `T`, or `default`.
    #[must_use]
    pub fn downcast_or<T: Any + Clone>(&self, default: T) -> T {
        self.downcast::<T>().cloned().unwrap_or(default)
    }

    /// Returns the value as a `bool`.
    #[must_use]
    pub fn bool(&self) -> Option<bool> {
        self.downcast::<bool>().copied()
    }

    /// Returns the value as a `bool`, or `default`.
    #[must_use]
    pub fn bool_or(&self, default: bool) -> bool {
        self.bool().unwrap_or(default)
    }

    /// Returns the value as a string slice. Accepts `String` and `&'static str`.
    #[must_use]
    pub fn str(&self) -> Option<&str> {
        self.downcast::<String>()
            .map(String::as_str)
            .or_else(|| self.downcast::<&'static str>().copied())
    }

    /// Returns the value as a string slice, or `default`.
    #[must_use]
    pub fn str_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.str().unwrap_or(default)
    }

    /// Returns the value as an `i32`.
    #[must_use]
    pub fn i32(&self) -> Option<i32> {
        self.downcast::<i32>().copied()
    }

    /// Returns the value as an `i32`, or `default`.
    #[must_use]
    pub fn i32_or(&self, default: i32) -> i32 {
        self.i32().unwrap_or(default)
    }

    /// Returns the value as an `i64`.
    #[must_use]
    pub fn i64(&self) -> Option<i64> {
        self.downcast::<i64>().copied()
    }

    /// Returns the value as an `i64`, or `default`.
    #[must_use]
    pub fn i64_or(&self, default: i64) -> i64 {
        self.i64().unwrap_or(default)
    }

    /// Returns the value as a `u64`.
    #[must_use]
    pub fn u64(&self) -> Option<u64> {
        self.downcast::<u64>().copied()
    }

    /// Returns the value as a `u64`, or `default`.
    #[must_use]
    pub fn u64_or(&self, default: u64) -> u64 {
        self.u64().unwrap_or(default)
    }

    /// Returns the value as an `f32`.
    #[must_use]
    pub fn f32(&self) -> Option<f32> {
        self.downcast::<f32>().copied()
    }

    /// Returns the value as an `f32`, or `default`.
    #[must_use]
    pub fn f32_or(&self, default: f32) -> f32 {
        self.f32().unwrap_or(default)
    }

    /// Returns the value as an `f64`.
    #[must_use]
    pub fn f64(&self) -> Option<f64> {
        self.downcast::<f64>().copied()
    }

    /// Returns the value as an `f64`, or `default`.
    #[must_use]
    pub fn f64_or(&self, default: f64) -> f64 {
        self.f64().unwrap_or(default)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Value(<empty>)");
        }
        if let Some(s) = self.str() {
            return write!(f, "Value({s:?})");
        }
        f.write_str("Value(..)")
    }
}

// Only the scalar types with accessors are serialized; anything else is null.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(v) = self.bool() {
            serializer.serialize_bool(v)
        } else if let Some(v) = self.str() {
            serializer.serialize_str(v)
        } else if let Some(v) = self.i32() {
            serializer.serialize_i32(v)
        } else if let Some(v) = self.i64() {
            serializer.serialize_i64(v)
        } else if let Some(v) = self.u64() {
            serializer.serialize_u64(v)
        } else if let Some(v) = self.f32() {
            serializer.serialize_f32(v)
        } else if let Some(v) = self.f64() {
            serializer.serialize_f64(v)
        } else {
            serializer.serialize_none()
        }
    }
}

/// Request-scoped key/value store.
///
/// # Example
///
/// ```
/// use waypoint_core::Context;
///
/// let mut ctx = Context::new();
/// ctx.put("user", "ada".to_string()).put("admin", true);
///
/// assert_eq!(ctx.get("user").and_then(|v| v.str()), Some("ada"));
/// assert!(ctx.get_or_empty("admin").bool_or(false));
/// assert_eq!(ctx.get_or_empty("missing").i64_or(7), 7);
/// ```
#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value stored under `key`, or the empty value.
    #[must_use]
    pub fn get_or_empty(&self, key: &str) -> Value {
        self.values.get(key).cloned().unwrap_or_default()
    }

    /// Inserts or replaces a value.
    pub fn put<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.values.insert(key.into(), Value::new(value));
        self
    }

    /// Removes a value, returning it if present.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// `true` when `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates over the stored keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over the stored values in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when the context holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sorted: BTreeMap<_, _> = self.values.iter().collect();
        f.debug_map().entries(sorted).finish()
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted: BTreeMap<_, _> = self.values.iter().collect();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (key, value) in sorted {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
