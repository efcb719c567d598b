//! Type descriptions for the schema factory.
//!
//! A type opts into documentation by implementing [`Reflect`], usually via
//! `#[derive(Reflect)]`. The returned [`Shape`] mirrors the serialized form
//! of the type: scalars, optional values, sequences, maps and structs.
//!
//! Struct fields are listed lazily through [`StructShape::fields`], so a
//! type that contains itself (directly, through `Box`, or through a `Vec`)
//! still has a finite shape.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A type the schema factory can describe.
pub trait Reflect: 'static {
    /// Describes the serialized form of `Self`.
    fn shape() -> Shape;
}

/// The serialized form of a type.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Text.
    String,
    /// `true` / `false`.
    Boolean,
    /// Any integer width.
    Integer,
    /// Any float width.
    Number,
    /// A kind with no OpenAPI counterpart. Documented as a string.
    Unknown,
    /// May be absent (`Option<T>`).
    Optional(Box<Shape>),
    /// Transparent indirection (`Box<T>`, `Arc<T>`, `&T`).
    Pointer(Box<Shape>),
    /// Ordered collection (`Vec<T>`, arrays, sets).
    Sequence(Box<Shape>),
    /// String-keyed map; carries the value shape.
    Map(Box<Shape>),
    /// A struct with named fields.
    Struct(StructShape),
    /// The [`XmlName`] marker field.
    XmlName,
}

impl Shape {
    /// Strips pointer layers.
    #[must_use]
    pub fn strip_pointers(&self) -> &Shape {
        let mut shape = self;
        while let Shape::Pointer(inner) = shape {
            shape = inner;
        }
        shape
    }

    /// `false` for shapes that may legitimately be absent from a payload:
    /// optional values, sequences and maps.
    #[must_use]
    pub fn can_be_required(&self) -> bool {
        !matches!(
            self.strip_pointers(),
            Shape::Optional(_) | Shape::Sequence(_) | Shape::Map(_)
        )
    }
}

/// Description of a struct type.
#[derive(Debug, Clone)]
pub struct StructShape {
    /// Identity used to memoize generated schemas.
    pub type_id: TypeId,
    /// Type name; empty for anonymous types.
    pub name: &'static str,
    /// Full Rust type name, generic arguments included.
    pub type_name: &'static str,
    /// Module path (`module_path!()`).
    pub module: &'static str,
    /// Root element name for XML payloads.
    pub xml_root: Option<&'static str>,
    /// Lists the fields on demand.
    pub fields: fn() -> Vec<Field>,
}

impl StructShape {
    /// Describes the struct `T`.
    #[must_use]
    pub fn of<T: 'static>(name: &'static str, module: &'static str, fields: fn() -> Vec<Field>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
            type_name: std::any::type_name::<T>(),
            module,
            xml_root: None,
            fields,
        }
    }

    /// Sets the XML root element name.
    #[must_use]
    pub fn xml_root(mut self, root: &'static str) -> Self {
        self.xml_root = Some(root);
        self
    }
}

/// A named struct field.
///
/// `json` and `xml` hold raw naming tags: a name followed by comma-separated
/// options (`"id,omitempty"`, `"item>entry,attr"`).
#[derive(Debug, Clone)]
pub struct Field {
    /// Rust field name.
    pub name: &'static str,
    /// JSON naming tag.
    pub json: Option<&'static str>,
    /// XML naming tag.
    pub xml: Option<&'static str>,
    /// Human readable description.
    pub description: Option<&'static str>,
    /// Embedded field; not documented.
    pub flatten: bool,
    /// Field shape.
    pub shape: Shape,
}

impl Field {
    /// A field named `name` with shape `shape`.
    #[must_use]
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            json: None,
            xml: None,
            description: None,
            flatten: false,
            shape,
        }
    }

    /// Sets the JSON naming tag.
    #[must_use]
    pub fn json(mut self, tag: &'static str) -> Self {
        self.json = Some(tag);
        self
    }

    /// Sets the XML naming tag.
    #[must_use]
    pub fn xml(mut self, tag: &'static str) -> Self {
        self.xml = Some(tag);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Marks the field as embedded.
    #[must_use]
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }
}

/// Marker field naming the XML root element of a struct.
///
/// The field's `xml` tag becomes the element name and the field itself is
/// left out of generated properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlName;

impl Reflect for XmlName {
    fn shape() -> Shape {
        Shape::XmlName
    }
}

macro_rules! reflect_scalar {
    ($shape:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn shape() -> Shape {
                    Shape::$shape
                }
            }
        )*
    };
}

reflect_scalar!(String => String, str, char);
reflect_scalar!(Boolean => bool);
reflect_scalar!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
reflect_scalar!(Number => f32, f64);
reflect_scalar!(Unknown => ());

impl Reflect for &'static str {
    fn shape() -> Shape {
        Shape::String
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }
}

impl<T: Reflect + ?Sized> Reflect for Arc<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }
}

impl<T: Reflect + ?Sized> Reflect for Rc<T> {
    fn shape() -> Shape {
        Shape::Pointer(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for [T] {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<T: Reflect, S: 'static> Reflect for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<K: 'static, V: Reflect, S: 'static> Reflect for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Map(Box::new(V::shape()))
    }
}

impl<K: 'static, V: Reflect> Reflect for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Map(Box::new(V::shape()))
    }
}

impl<K: 'static, V: Reflect, S: 'static> Reflect for indexmap::IndexMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Map(Box::new(V::shape()))
    }
}

impl Reflect for serde_json::Value {
    fn shape() -> Shape {
        Shape::Unknown
    }
}
