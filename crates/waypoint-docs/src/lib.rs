//! # Waypoint Docs
//!
//! API documentation for the Waypoint framework.
//!
//! This crate provides:
//! - **Reflection**: the [`Reflect`] trait (and derive) describing Rust types
//! - **Schema factory**: [`SchemaFactory`] turns reflected types into
//!   OpenAPI schemas, naming each struct once per media type
//! - **Route documentation**: [`DocRoute`] and [`DocGroup`] attached at
//!   registration time
//! - **Viewers**: [`OpenApiViewer`] serves Swagger UI and the OpenAPI
//!   definition, [`VoidViewer`] documents nothing
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use waypoint_docs::{DocOperation, DocPayload, DocRoute, DocViewer, OpenApiViewer, Reflect};
//!
//! #[derive(Reflect)]
//! struct Pet {
//!     name: String,
//!     #[reflect(json = "age,omitempty")]
//!     age: Option<u8>,
//! }
//!
//! let viewer = OpenApiViewer::new();
//! let doc = DocRoute::new().response(StatusCode::OK, DocPayload::json::<Vec<Pet>>());
//! viewer.register_route(&DocOperation::new(Method::GET, "", "/pets", doc));
//!
//! let document = viewer.document();
//! assert!(document.components.schemas.keys().any(|name| name.ends_with("_Pet")));
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod doc;
mod error;
mod factory;
mod openapi;
mod openapi_viewer;
mod reflect;
mod swagger;
mod viewer;

pub use doc::{doc_tags, DocGroup, DocOperation, DocParameters, DocPayload, DocResponses, DocRoute};
pub use error::{DocsError, DocsResult};
pub use factory::SchemaFactory;
pub use openapi::{
    Components, Contact, ExternalDocumentation, Header, Info, License, MediaContent, OpenApi, Operation, Parameter,
    ParameterIn, PathItem, RequestBody, Response, Schema, SchemaType, SecurityScheme, Server,
    ServerVariable, Tag, Xml, OPENAPI_VERSION,
};
pub use openapi_viewer::{
    OpenApiViewer, OpenApiViewerOptions, SWAGGER, SWAGGER_JSON, SWAGGER_ROUTE,
};
pub use reflect::{Field, Reflect, Shape, StructShape, XmlName};
pub use swagger::{DocExpansion, SwaggerUi};
pub use viewer::{DocHandlerFn, DocResponse, DocViewer, DocViewerHandler, DocViewerSource, VoidViewer};

/// Derives [`Reflect`] for a struct.
pub use waypoint_macros::Reflect;

pub use waypoint_core::MediaType;
