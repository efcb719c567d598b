//! OpenAPI 3.0 documentation viewer.
//!
//! [`OpenApiViewer`] turns route and group registrations into an OpenAPI
//! document and serves it together with a Swagger UI page:
//!
//! - `GET /swagger/` renders Swagger UI
//! - `GET /swagger/doc.json` returns the OpenAPI definition
//!
//! The definition is serialized once, on the first request, and the same
//! bytes are served afterwards.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http::Method;
use indexmap::IndexMap;
use parking_lot::RwLock;
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::doc::{DocGroup, DocOperation, DocParameters, DocPayload, DocResponses};
use crate::error::DocsResult;
use crate::factory::SchemaFactory;
use crate::openapi::{
    MediaContent, OpenApi, Operation, Parameter, ParameterIn, RequestBody, Response, Schema,
    Server,
};
use crate::swagger::SwaggerUi;
use crate::viewer::{DocResponse, DocViewer, DocViewerHandler};

/// Log category for viewer events.
pub const SWAGGER: &str = "SWAGGER";

/// Route of the Swagger UI page.
pub const SWAGGER_ROUTE: &str = "/swagger/";

/// Route of the OpenAPI definition.
pub const SWAGGER_JSON: &str = "/swagger/doc.json";

/// Configuration applied by [`OpenApiViewer::load`].
#[derive(Debug, Clone)]
pub struct OpenApiViewerOptions {
    /// API version written to `info.version`.
    pub version: String,
    /// API title written to `info.title` when not empty.
    pub title: String,
    /// List an HTTPS server.
    pub enable_tls: bool,
    /// Omit the plain HTTP server.
    pub only_tls: bool,
    /// HTTP port.
    pub port: u16,
    /// HTTPS port.
    pub port_tls: u16,
    /// Existing OpenAPI YAML document to start from.
    pub file_yml: Option<PathBuf>,
}

impl Default for OpenApiViewerOptions {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            title: String::new(),
            enable_tls: false,
            only_tls: false,
            port: 8080,
            port_tls: 8443,
            file_yml: None,
        }
    }
}

impl OpenApiViewerOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Lists an HTTPS server on `port_tls`.
    #[must_use]
    pub fn tls(mut self, port_tls: u16) -> Self {
        self.enable_tls = true;
        self.port_tls = port_tls;
        self
    }

    /// Lists only the HTTPS server.
    #[must_use]
    pub fn only_tls(mut self, only_tls: bool) -> Self {
        self.only_tls = only_tls;
        self
    }

    /// Preloads an OpenAPI YAML document.
    #[must_use]
    pub fn file_yml(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_yml = Some(path.into());
        self
    }

    fn servers(&self) -> Vec<Server> {
        let mut servers = Vec::new();
        if !self.only_tls {
            servers.push(Server::new(
                format!("http://localhost:{}", self.port),
                "HTTP server",
            ));
        }
        if self.enable_tls {
            servers.push(Server::new(
                format!("https://localhost:{}", self.port_tls),
                "HTTPS server",
            ));
        }
        servers
    }
}

#[derive(Debug, Default)]
struct State {
    data: OpenApi,
    factory: SchemaFactory,
    headers: IndexMap<String, DocParameters>,
    cookies: IndexMap<String, DocParameters>,
    responses: IndexMap<String, IndexMap<String, Response>>,
}

#[derive(Debug, Default)]
struct Inner {
    state: RwLock<State>,
    document: OnceLock<Bytes>,
}

impl Inner {
    fn document_bytes(&self) -> Bytes {
        self.document
            .get_or_init(|| {
                let state = self.state.read();
                let document = state.snapshot();
                match serde_json::to_vec(&document) {
                    Ok(bytes) => Bytes::from(bytes),
                    Err(err) => {
                        error!(category = SWAGGER, error = %err, "Failed to serialize OpenAPI document");
                        Bytes::new()
                    }
                }
            })
            .clone()
    }
}

/// Documentation viewer producing an OpenAPI 3.0 document.
///
/// Cloning is cheap; clones share the same document.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use waypoint_docs::{DocOperation, DocRoute, DocViewer, OpenApiViewer, OpenApiViewerOptions};
///
/// let viewer = OpenApiViewer::new().load(OpenApiViewerOptions::new().title("Pets"));
/// viewer.register_route(&DocOperation::new(Method::GET, "", "/pets", DocRoute::new()));
///
/// let document = viewer.document();
/// assert!(document.paths["/pets"].get.is_some());
/// assert_eq!(viewer.handlers().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenApiViewer {
    inner: Arc<Inner>,
}

impl OpenApiViewer {
    /// A viewer with an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `options`: preloads the YAML document when one is named,
    /// resets the server list and sets the API version.
    ///
    /// A YAML document that cannot be read is logged and replaced by an
    /// empty one.
    #[must_use]
    pub fn load(self, options: OpenApiViewerOptions) -> Self {
        let mut data = match &options.file_yml {
            Some(path) => load_yaml(path).unwrap_or_else(|err| {
                error!(category = SWAGGER, path = %path.display(), error = %err, "Failed to load OpenAPI document");
                OpenApi::default()
            }),
            None => OpenApi::default(),
        };

        data.servers = options.servers();
        data.info.version = options.version.clone();
        if !options.title.is_empty() {
            data.info.title = options.title.clone();
        }

        info!(category = SWAGGER, "Swagger interface displayed on {SWAGGER_ROUTE}");
        info!(category = SWAGGER, "Swagger JSON displayed on {SWAGGER_JSON}");

        self.inner.state.write().data = data;
        self
    }

    /// The document as it stands, components included.
    #[must_use]
    pub fn document(&self) -> OpenApi {
        self.inner.state.read().snapshot()
    }

    /// The serialized definition served at [`SWAGGER_JSON`]. Built on first
    /// call and cached.
    #[must_use]
    pub fn document_bytes(&self) -> Bytes {
        self.inner.document_bytes()
    }
}

impl DocViewer for OpenApiViewer {
    fn handlers(&self) -> Vec<DocViewerHandler> {
        let title = self.inner.state.read().data.info.title.clone();
        let page_title = if title.is_empty() {
            "Swagger UI".to_string()
        } else {
            format!("{title} - Swagger UI")
        };
        let html = Bytes::from(SwaggerUi::new(SWAGGER_JSON).title(page_title).html());
        let inner = Arc::clone(&self.inner);

        vec![
            DocViewerHandler {
                method: Method::GET,
                route: SWAGGER_ROUTE.to_string(),
                handler: Arc::new(move || DocResponse::html(html.clone())),
                name: "OAS3".to_string(),
                description: "OpenAPI 3.0 view".to_string(),
            },
            DocViewerHandler {
                method: Method::GET,
                route: SWAGGER_JSON.to_string(),
                handler: Arc::new(move || DocResponse::json(inner.document_bytes())),
                name: "OAS3 JSON".to_string(),
                description: "OpenAPI 3.0 definition".to_string(),
            },
        ]
    }

    fn register_group(&self, group: &str, data: &DocGroup) {
        let mut state = self.inner.state.write();
        let state = &mut *state;

        state
            .headers
            .entry(group.to_string())
            .or_default()
            .extend(data.headers.clone());
        state
            .cookies
            .entry(group.to_string())
            .or_default()
            .extend(data.cookies.clone());

        let responses = make_responses(&mut state.factory, &data.responses);
        state
            .responses
            .entry(group.to_string())
            .or_default()
            .extend(responses);

        debug!(category = SWAGGER, group, "Group registered");
    }

    fn register_route(&self, route: &DocOperation) {
        let path = route.full_path();
        if self.inner.document.get().is_some() {
            warn!(category = SWAGGER, method = %route.method, path, "Route registered after the document was served; it will not appear");
        }

        let mut state = self.inner.state.write();
        let state = &mut *state;

        let operation = Operation {
            tags: route.tags(),
            description: (!route.doc.description.is_empty()).then(|| route.doc.description.clone()),
            parameters: state.parameters(&path, route),
            request_body: request_body(&mut state.factory, route),
            responses: state.responses_for(&path, route),
            ..Operation::default()
        };

        let item = state.data.paths.entry(path.clone()).or_default();
        match item.slot_mut(&route.method) {
            Some(slot) => {
                if slot.is_some() {
                    warn!(category = SWAGGER, method = %route.method, path, "Route documented twice; keeping the latest");
                }
                *slot = Some(operation);
                info!(category = SWAGGER, "Route registered: [{}] {}", route.method, path);
            }
            None => {
                warn!(category = SWAGGER, "Unsupported HTTP method: {}", route.method);
            }
        }
    }
}

impl State {
    fn snapshot(&self) -> OpenApi {
        let mut document = self.data.clone();
        document
            .components
            .schemas
            .extend(self.factory.components().schemas);
        document
    }

    /// Group headers and cookies whose prefix matches `path`, then the
    /// route's own path, query and cookie parameters.
    fn parameters(&self, path: &str, route: &DocOperation) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        for (_, headers) in self.headers.iter().filter(|(prefix, _)| path.starts_with(prefix.as_str())) {
            parameters.extend(make_parameters(headers, ParameterIn::Header));
        }

        for (_, cookies) in self.cookies.iter().filter(|(prefix, _)| path.starts_with(prefix.as_str())) {
            parameters.extend(make_parameters(cookies, ParameterIn::Cookie));
        }

        parameters.extend(make_parameters(&route.doc.parameters, ParameterIn::Path));
        for name in path_parameter_names(&route.path) {
            if !route.doc.parameters.contains_key(&name) {
                parameters.push(Parameter::required(name, ParameterIn::Path, "").with_schema(Schema::string()));
            }
        }

        parameters.extend(make_parameters(&route.doc.query, ParameterIn::Query));
        parameters.extend(make_parameters(&route.doc.cookies, ParameterIn::Cookie));
        parameters
    }

    /// The route's responses, completed by matching group responses.
    fn responses_for(&mut self, path: &str, route: &DocOperation) -> IndexMap<String, Response> {
        let mut responses = make_responses(&mut self.factory, &route.doc.responses);

        for (_, group) in self.responses.iter().filter(|(prefix, _)| path.starts_with(prefix.as_str())) {
            for (status, response) in group {
                responses
                    .entry(status.clone())
                    .or_insert_with(|| response.clone());
            }
        }

        responses
    }
}

fn make_parameters(parameters: &DocParameters, location: ParameterIn) -> impl Iterator<Item = Parameter> + '_ {
    parameters.iter().map(move |(name, description)| {
        Parameter::required(name.clone(), location, description).with_schema(Schema::string())
    })
}

/// Names of `{name}` and `{name...}` placeholders in a path pattern.
fn path_parameter_names(path: &str) -> Vec<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\{([^}.]+)(?:\.\.\.)?\}").expect("valid regex"));

    pattern
        .captures_iter(path)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}

fn request_body(factory: &mut SchemaFactory, route: &DocOperation) -> Option<RequestBody> {
    let mut content = IndexMap::new();

    if let Some(request) = &route.doc.request {
        match factory.make_schema(request.media(), &request.shape()) {
            Ok(schema) => {
                content.insert(request.content_type().to_string(), MediaContent::schema(schema));
            }
            Err(err) => {
                error!(category = SWAGGER, path = %route.full_path(), error = %err, "Failed to document request body");
            }
        }
    }

    if !route.doc.files.is_empty() {
        let multipart = route
            .doc
            .files
            .iter()
            .fold(Schema::object(), |schema, (name, description)| {
                let mut file = Schema::string().with_format("binary");
                if !description.is_empty() {
                    file.description = Some(description.clone());
                }
                schema.property(name.clone(), file)
            });
        content.insert(
            "multipart/form-data".to_string(),
            MediaContent::schema(multipart),
        );
    }

    if content.is_empty() {
        return None;
    }

    let description = route
        .doc
        .request
        .as_ref()
        .map(DocPayload::description_text)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Some(RequestBody {
        description,
        content,
        required: false,
    })
}

/// Converts documented payloads; entries whose schema fails are logged and
/// dropped.
fn make_responses(factory: &mut SchemaFactory, responses: &DocResponses) -> IndexMap<String, Response> {
    let mut result = IndexMap::new();
    for (status, payload) in responses {
        match make_response(factory, payload) {
            Ok(response) => {
                result.insert(status.clone(), response);
            }
            Err(err) => {
                error!(category = SWAGGER, status, error = %err, "Failed to document response");
            }
        }
    }
    result
}

fn make_response(factory: &mut SchemaFactory, payload: &DocPayload) -> DocsResult<Response> {
    let schema = factory.make_schema(payload.media(), &payload.shape())?;
    let mut content = IndexMap::new();
    content.insert(payload.content_type().to_string(), MediaContent::schema(schema));

    Ok(Response {
        description: payload.description_text().to_string(),
        content,
        ..Response::default()
    })
}

fn load_yaml(path: &Path) -> DocsResult<OpenApi> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}
