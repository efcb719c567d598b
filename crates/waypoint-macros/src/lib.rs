//! Procedural macros for Waypoint.
//!
//! `#[derive(Reflect)]` describes a type's serialized form so the
//! documentation viewer can build OpenAPI schemas for it. Use it through
//! `waypoint_docs::Reflect` (or the `waypoint` prelude) rather than from this
//! crate directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use waypoint::prelude::*;
//!
//! #[derive(Serialize, Reflect)]
//! #[serde(rename = "user")]
//! struct User {
//!     /// Unique identifier.
//!     #[reflect(xml = "id,attr")]
//!     id: u64,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     nickname: Option<String>,
//!     #[serde(skip)]
//!     password_hash: String,
//! }
//! ```
//!
//! # Attributes
//!
//! Container:
//! - `#[reflect(xml_root = "name")]`: XML root element; defaults to serde `rename`
//! - `#[reflect(crate = "path")]`: path of the `waypoint_docs` crate
//!
//! Field:
//! - `#[reflect(json = "tag")]`, `#[reflect(xml = "tag")]`: naming tags, e.g.
//!   `"id,omitempty"`, `"-"`, `"items>item"`, `"id,attr"`
//! - `#[reflect(description = "...")]`: defaults to the doc comment
//! - `#[reflect(flatten)]`: embedded field
//!
//! serde's `rename`, `rename_all`, `skip`, `skip_serializing`,
//! `skip_serializing_if` and `flatten` are honored when no explicit tag is
//! given.

mod parse;
mod reflect;

use proc_macro::TokenStream;

/// Derives `waypoint_docs::Reflect`.
///
/// Supported on structs with named fields, unit structs, newtypes and
/// fieldless enums (documented as strings).
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    reflect::expand_reflect(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
