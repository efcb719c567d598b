//! Textual argument parsing.
//!
//! Path parameters, query values, headers and environment variables all
//! arrive as text. [`Arg`] parses them on demand.

use std::str::FromStr;

/// A textual argument with typed conversions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arg(String);

impl Arg {
    /// Wraps a string.
    pub fn new(item: impl Into<String>) -> Self {
        Self(item.into())
    }

    /// The raw text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a boolean: `1`, `t`, `true` / `0`, `f`, `false`, case-insensitive.
    #[must_use]
    pub fn bool(&self) -> Option<bool> {
        match self.0.trim().to_ascii_lowercase().as_str() {
            "1" | "t" | "true" => Some(true),
            "0" | "f" | "false" => Some(false),
            _ => None,
        }
    }

    /// Parses a boolean, or returns `default`.
    #[must_use]
    pub fn bool_or(&self, default: bool) -> bool {
        self.bool().unwrap_or(default)
    }

    /// Parses an `i32`.
    #[must_use]
    pub fn i32(&self) -> Option<i32> {
        self.parse()
    }

    /// Parses an `i32`, or returns `default`.
    #[must_use]
    pub fn i32_or(&self, default: i32) -> i32 {
        self.i32().unwrap_or(default)
    }

    /// Parses an `i64`.
    #[must_use]
    pub fn i64(&self) -> Option<i64> {
        self.parse()
    }

    /// Parses an `i64`, or returns `default`.
    #[must_use]
    pub fn i64_or(&self, default: i64) -> i64 {
        self.i64().unwrap_or(default)
    }

    /// Parses an `f32`.
    #[must_use]
    pub fn f32(&self) -> Option<f32> {
        self.parse()
    }

    /// Parses an `f32`, or returns `default`.
    #[must_use]
    pub fn f32_or(&self, default: f32) -> f32 {
        self.f32().unwrap_or(default)
    }

    /// Parses an `f64`.
    #[must_use]
    pub fn f64(&self) -> Option<f64> {
        self.parse()
    }

    /// Parses an `f64`, or returns `default`.
    #[must_use]
    pub fn f64_or(&self, default: f64) -> f64 {
        self.f64().unwrap_or(default)
    }

    /// Parses any [`FromStr`] type.
    #[must_use]
    pub fn parse<T: FromStr>(&self) -> Option<T> {
        self.0.parse().ok()
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Arg {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
