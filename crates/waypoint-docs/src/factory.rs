//! Reflective struct to schema conversion.
//!
//! [`SchemaFactory`] turns a [`Shape`] into an OpenAPI [`Schema`]. Structs
//! become named components referenced through `$ref`; everything else is
//! described inline.
//!
//! Components are memoized per `(type, media type)`. A struct's reference is
//! reserved before its fields are visited, so self-referencing and mutually
//! referencing types resolve to the reserved `$ref` instead of recursing.

use std::any::TypeId;

use indexmap::IndexMap;
use tracing::warn;
use waypoint_core::MediaType;

use crate::error::{DocsError, DocsResult};
use crate::openapi::{Components, Schema, Xml};
use crate::openapi_viewer::SWAGGER;
use crate::reflect::{Field, Reflect, Shape, StructShape};

const COMPONENT_PREFIX: &str = "#/components/schemas/";

#[derive(Debug, Clone)]
struct Seen {
    reference: String,
    name: String,
    schema: Option<Schema>,
}

/// Builds and caches OpenAPI schemas for reflected types.
///
/// # Example
///
/// ```rust
/// use waypoint_core::MediaType;
/// use waypoint_docs::{Field, Reflect, SchemaFactory, Shape, StructShape};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Reflect for Point {
///     fn shape() -> Shape {
///         Shape::Struct(StructShape::of::<Point>("Point", "geo", || {
///             vec![Field::new("x", i32::shape()), Field::new("y", i32::shape())]
///         }))
///     }
/// }
///
/// let mut factory = SchemaFactory::new();
/// let schema = factory.schema_for::<Point>(MediaType::Json).unwrap();
/// assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/Json_Geo_Point"));
/// assert!(factory.components().schemas.contains_key("Json_Geo_Point"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaFactory {
    seen: IndexMap<(TypeId, MediaType), Seen>,
}

impl SchemaFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every component materialized so far, keyed by component name.
    #[must_use]
    pub fn components(&self) -> Components {
        let schemas = self
            .seen
            .values()
            .filter_map(|seen| {
                seen.schema
                    .as_ref()
                    .map(|schema| (seen.name.clone(), schema.clone()))
            })
            .collect();

        Components {
            schemas,
            ..Components::default()
        }
    }

    /// Schema for `T` under `media`.
    pub fn schema_for<T: Reflect + ?Sized>(&mut self, media: MediaType) -> DocsResult<Schema> {
        self.make_schema(media, &T::shape())
    }

    /// Schema for a root payload shape.
    ///
    /// Structs yield a `$ref`, sequences an array of their element schema and
    /// scalars an inline schema.
    pub fn make_schema(&mut self, media: MediaType, root: &Shape) -> DocsResult<Schema> {
        self.infer(media, root.strip_pointers())
    }

    fn infer(&mut self, media: MediaType, shape: &Shape) -> DocsResult<Schema> {
        match shape {
            Shape::Pointer(inner) | Shape::Optional(inner) => self.infer(media, inner),
            Shape::Struct(structure) => Ok(Schema::reference(self.collect(media, structure)?)),
            Shape::Sequence(items) => Ok(Schema::array(self.infer(media, items)?)),
            Shape::Map(values) => Ok(Schema::map(self.infer(media, values)?)),
            Shape::Boolean => Ok(Schema::boolean()),
            Shape::Integer => Ok(Schema::integer()),
            Shape::Number => Ok(Schema::number()),
            Shape::String | Shape::Unknown | Shape::XmlName => Ok(Schema::string()),
        }
    }

    /// Returns the component reference for `structure`, building it on first use.
    fn collect(&mut self, media: MediaType, structure: &StructShape) -> DocsResult<String> {
        let key = (structure.type_id, media);
        if let Some(seen) = self.seen.get(&key) {
            return Ok(seen.reference.clone());
        }

        let name = self.unique_name(component_name(media, structure));
        let reference = format!("{COMPONENT_PREFIX}{name}");
        self.seen.insert(
            key,
            Seen {
                reference: reference.clone(),
                name,
                schema: None,
            },
        );

        let fields = (structure.fields)();
        let mut schema = match self.make_struct(media, structure, &fields) {
            Ok(schema) => schema,
            Err(err) => {
                self.seen.shift_remove(&key);
                return Err(err);
            }
        };

        if media == MediaType::Xml {
            schema.xml = Some(Xml {
                name: Some(xml_root_name(structure, &fields)),
                wrapped: true,
                ..Xml::default()
            });
        }

        if let Some(seen) = self.seen.get_mut(&key) {
            seen.schema = Some(schema);
        }

        Ok(reference)
    }

    /// `name`, suffixed with a counter when a different type already holds it.
    fn unique_name(&self, name: String) -> String {
        let taken = |candidate: &str| self.seen.values().any(|seen| seen.name == candidate);
        if !taken(&name) {
            return name;
        }

        let unique = (2..)
            .map(|n| format!("{name}_{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_default();
        warn!(category = SWAGGER, component = %name, renamed = %unique, "Component name already used by another type");
        unique
    }

    fn make_struct(
        &mut self,
        media: MediaType,
        structure: &StructShape,
        fields: &[Field],
    ) -> DocsResult<Schema> {
        let mut schema = Schema::object();

        for field in fields {
            if field.flatten || matches!(field.shape, Shape::XmlName) {
                continue;
            }

            let naming = match media {
                MediaType::Json => json_naming(field),
                MediaType::Xml => xml_naming(structure, field)?,
            };
            let Some(naming) = naming else {
                continue;
            };

            let mut property = self.infer(media, &field.shape)?;
            if let Some(description) = field.description {
                property.description = Some(description.to_string());
            }

            if let Some(wrapper) = naming.wrapper {
                property = Schema::object().property(wrapper, property);
            }

            if media == MediaType::Xml && naming.tagged {
                property.xml = Some(Xml {
                    name: Some(naming.name.clone()),
                    attribute: naming.attribute,
                    ..Xml::default()
                });
            }

            if schema.properties.contains_key(&naming.name) {
                return Err(DocsError::schema(
                    display_name(structure),
                    format!("duplicate property '{}'", naming.name),
                ));
            }

            let required = field.shape.can_be_required() && !naming.omit_empty;
            if required {
                schema.required.push(naming.name.clone());
            }
            schema.properties.insert(naming.name, property);
        }

        Ok(schema)
    }
}

/// How a field appears in the generated schema.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Naming {
    name: String,
    wrapper: Option<String>,
    attribute: bool,
    omit_empty: bool,
    tagged: bool,
}

impl Naming {
    fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wrapper: None,
            attribute: false,
            omit_empty: false,
            tagged: false,
        }
    }
}

/// Splits a raw tag into its name and option list.
fn split_tag(tag: &str) -> (&str, Vec<&str>) {
    let mut parts = tag.split(',');
    let name = parts.next().unwrap_or_default().trim();
    (name, parts.map(str::trim).collect())
}

/// `None` when the field is left out of the JSON schema.
fn json_naming(field: &Field) -> Option<Naming> {
    let Some(tag) = field.json else {
        return Some(Naming::plain(field.name));
    };

    let (name, options) = split_tag(tag);
    if name.is_empty() || name == "-" {
        return None;
    }

    Some(Naming {
        omit_empty: options.contains(&"omitempty"),
        tagged: true,
        ..Naming::plain(name)
    })
}

/// `Ok(None)` when the field is left out of the XML schema.
fn xml_naming(structure: &StructShape, field: &Field) -> DocsResult<Option<Naming>> {
    let Some(tag) = field.xml else {
        return Ok(Some(Naming::plain(field.name)));
    };

    let (name, options) = split_tag(tag);
    if name == "-" {
        return Ok(None);
    }
    if name.is_empty() {
        return Ok(Some(Naming::plain(field.name)));
    }

    let (name, wrapper) = match name.split_once('>') {
        None => (name, None),
        Some((outer, inner)) if !outer.is_empty() && !inner.is_empty() && !inner.contains('>') => {
            (outer, Some(inner.to_string()))
        }
        Some(_) => {
            return Err(DocsError::schema(
                display_name(structure),
                format!("malformed xml tag '{tag}' on field '{}'", field.name),
            ));
        }
    };

    Ok(Some(Naming {
        wrapper,
        attribute: options.contains(&"attr"),
        omit_empty: options.contains(&"omitempty"),
        tagged: true,
        ..Naming::plain(name)
    }))
}

fn display_name(structure: &StructShape) -> &'static str {
    if structure.name.is_empty() {
        "Anon"
    } else {
        structure.name
    }
}

/// `{Media}_{Module}_{Type}`, using the last segment of the module path.
/// Generic arguments are appended to the type name (`PageUser`).
fn component_name(media: MediaType, structure: &StructShape) -> String {
    let module = structure.module.rsplit("::").next().unwrap_or_default();
    format!(
        "{}_{}_{}{}",
        media.title(),
        title_case(module),
        title_case(display_name(structure)),
        generic_suffix(structure.type_name)
    )
}

/// Concatenated, title-cased names of the generic arguments in `type_name`.
fn generic_suffix(type_name: &str) -> String {
    let Some((_, rest)) = type_name.split_once('<') else {
        return String::new();
    };
    let inner = rest.rsplit_once('>').map_or(rest, |(inner, _)| inner);
    split_arguments(inner)
        .into_iter()
        .map(|argument| {
            let argument = argument.trim().trim_start_matches('&');
            let base = argument.split('<').next().unwrap_or(argument);
            let base = base.rsplit("::").next().unwrap_or(base);
            format!("{}{}", title_case(base), generic_suffix(argument))
        })
        .collect()
}

/// Splits a generic argument list on its top-level commas.
fn split_arguments(list: &str) -> Vec<&str> {
    let mut arguments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                arguments.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    arguments.push(&list[start..]);
    arguments
}

/// The marker field's tag, then the declared root, then the type name.
fn xml_root_name(structure: &StructShape, fields: &[Field]) -> String {
    let marker = fields
        .iter()
        .filter(|field| matches!(field.shape, Shape::XmlName))
        .find_map(|field| {
            let (name, _) = split_tag(field.xml?);
            (!name.is_empty() && name != "-").then_some(name)
        });

    marker
        .or(structure.xml_root)
        .unwrap_or_else(|| display_name(structure))
        .to_string()
}

/// Upper-cases the first character and leaves the rest untouched.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
