//! Type-erased response payloads.
//!
//! Handlers return arbitrary serializable values inside an
//! [`Outcome`](crate::Outcome). The [`Body`] trait erases the concrete type
//! while keeping every operation an encoder needs: JSON, XML and
//! downcasting back to the original value.

use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::CoreResult;

/// An erased, serializable payload value.
///
/// Implemented for every `T: Serialize + Send + Sync + 'static`.
pub trait Body: Any + Send + Sync {
    /// Converts the value into a JSON tree.
    fn json_value(&self) -> CoreResult<serde_json::Value>;

    /// Serializes the value as indented JSON using `indent` for each level.
    fn json_bytes(&self, indent: &[u8]) -> CoreResult<Vec<u8>>;

    /// Serializes the value as XML indented with `indent` spaces.
    fn xml_string(&self, indent: usize) -> CoreResult<String>;

    /// Returns the value as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T> Body for T
where
    T: Serialize + Send + Sync + 'static,
{
    fn json_value(&self) -> CoreResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn json_bytes(&self, indent: &[u8]) -> CoreResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(buffer)
    }

    fn xml_string(&self, indent: usize) -> CoreResult<String> {
        let mut out = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut out);
        serializer.indent(' ', indent);
        if self.serialize(serializer).is_ok() {
            return Ok(out);
        }

        // Sequences and scalars have no element name of their own: each
        // item is written under the name of its type.
        let root = xml_element_name(std::any::type_name::<T>());
        let mut out = String::new();
        let mut serializer = quick_xml::se::Serializer::with_root(&mut out, Some(&root))?;
        serializer.indent(' ', indent);
        self.serialize(serializer)?;
        Ok(out)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The payload carried by an [`Outcome`](crate::Outcome).
#[derive(Clone, Default)]
pub enum Payload {
    /// No payload. Every encoder writes a zero-length body.
    #[default]
    Empty,
    /// A serializable value.
    Value(Arc<dyn Body>),
}

impl Payload {
    /// Wraps a serializable value.
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::Value(Arc::new(value))
    }

    /// Returns `true` when there is no payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the erased body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&dyn Body> {
        match self {
            Self::Empty => None,
            Self::Value(body) => Some(body.as_ref()),
        }
    }

    /// Returns the payload as `T` when it holds exactly that type.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.body().and_then(|body| body.as_any().downcast_ref::<T>())
    }
}

/// Element name for a value without one: the element type of a sequence
/// or the type itself, without module path or generic arguments. Strings
/// become `string`.
fn xml_element_name(type_name: &str) -> String {
    let name = type_name.trim_start_matches('&').trim_start_matches("mut ");
    let element = if let Some(rest) = name.strip_prefix('[') {
        rest.rsplit_once(']')
            .map_or(rest, |(inner, _)| inner.split(';').next().unwrap_or(inner))
    } else if let Some((_, rest)) = name.split_once('<') {
        rest.rsplit_once('>').map_or(rest, |(inner, _)| inner)
    } else {
        name
    };

    let element = element.trim().trim_start_matches('&');
    let base = element.split('<').next().unwrap_or(element);
    let base = base.rsplit("::").next().unwrap_or(base);
    match base {
        "str" | "String" => "string".to_string(),
        other if !other.is_empty() && other.chars().all(|c| c.is_alphanumeric() || c == '_') => other.to_string(),
        _ => "value".to_string(),
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Payload::Empty"),
            Self::Value(body) => match body.json_value() {
                Ok(value) => write!(f, "Payload::Value({value})"),
                Err(_) => f.write_str("Payload::Value(<unserializable>)"),
            },
        }
    }
}
