//! Route registration and request dispatch.
//!
//! The [`Router`] binds handlers to `(method, path)` pairs and runs every
//! request through the same pipeline:
//!
//! 1. **Context**: the route contextualizer, else the global one, else an
//!    empty [`Context`]. A failing contextualizer is logged and the request
//!    continues with an empty context.
//! 2. **Group validation**: every group whose prefix starts the route path
//!    runs its validators in registration order. The first failure goes to
//!    the error chain.
//! 3. **Handler**: the bound handler produces an [`Outcome`].
//! 4. **Write**: failures go through the route error handler, else the global
//!    one, else the outcome is written as-is.
//!
//! A panic anywhere in the pipeline is caught and handed to the route panic
//! handler, else the global one, else a default `500` naming the route.
//!
//! # Example
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use waypoint_core::Outcome;
//! use waypoint_server::{handler, RequestExt, Router};
//!
//! let mut router = Router::new();
//! router.route(
//!     Method::GET,
//!     handler(|req, _ctx| {
//!         let place = req.param("place").map(|p| p.as_str().to_string()).unwrap_or_default();
//!         Outcome::text_ok(StatusCode::OK, format!("hello {place}"))
//!     }),
//!     "/hello/{}",
//!     &["place"],
//! );
//!
//! let req = http::Request::get("/hello/world").body(bytes::Bytes::new()).unwrap();
//! assert_eq!(router.dispatch(req).status(), StatusCode::OK);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, StatusCode};
use http_body_util::Full;
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};
use waypoint_config::WaypointConfig;
use waypoint_core::{Context, Outcome, RequestId};
use waypoint_docs::{DocGroup, DocOperation, DocRoute, DocViewer, DocViewerHandler, DocViewerSource, VoidViewer};
use waypoint_router::{Lookup, Params, RouteTable};

use crate::cors::Cors;
use crate::handler::{
    BoxError, Contextualizer, ErrorHandler, Handler, HandlerOptions, Panic, PanicHandler, Request, Response,
};
use crate::request::{RequestExt, RouteKey, RouteParams};
use crate::response::{plain_text, write_outcome};
use crate::static_files::StaticFiles;

/// Name of the wildcard parameter used by static resource routes.
const RESOURCE_PARAM: &str = "path";

/// A route bound to a key.
#[derive(Debug, Clone)]
struct Binding {
    /// Full pattern, base path included.
    path: String,
    options: HandlerOptions,
}

/// Routes requests to handlers.
///
/// Registration happens through `&mut self`; once the router is shared with
/// a server it is read-only.
pub struct Router {
    config: WaypointConfig,
    table: RouteTable,
    routes: HashMap<String, Binding>,
    context: Option<Contextualizer>,
    error: Option<ErrorHandler>,
    panic: Option<PanicHandler>,
    groups: IndexMap<String, Vec<Handler>>,
    docs: IndexMap<String, DocViewerHandler>,
    resources: HashMap<String, StaticFiles>,
    base_path: String,
    cors: Cors,
    viewer: Arc<dyn DocViewer>,
    doc_groups: Vec<(String, DocGroup)>,
    doc_operations: Vec<DocOperation>,
}

impl Router {
    /// An empty router with documentation disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: WaypointConfig::default(),
            table: RouteTable::new(),
            routes: HashMap::new(),
            context: None,
            error: None,
            panic: None,
            groups: IndexMap::new(),
            docs: IndexMap::new(),
            resources: HashMap::new(),
            base_path: String::new(),
            cors: Cors::empty(),
            viewer: Arc::new(VoidViewer),
            doc_groups: Vec::new(),
            doc_operations: Vec::new(),
        }
    }

    /// Applies runtime flags.
    pub fn config(&mut self, config: WaypointConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Registers `handler` for `method` on `pattern`.
    ///
    /// Each `{}` in `pattern` is replaced, in order, by a parameter named
    /// from `params`: `("/hello/{}", &["place"])` becomes `/hello/{place}`.
    pub fn route(&mut self, method: Method, handler: Handler, pattern: &str, params: &[&str]) -> &mut Self {
        self.route_with_options(method, HandlerOptions::new(handler), pattern, params)
    }

    /// Registers a handler with its own context, error and panic handlers.
    pub fn route_with_options(
        &mut self,
        method: Method,
        options: HandlerOptions,
        pattern: &str,
        params: &[&str],
    ) -> &mut Self {
        let path = substitute_params(pattern, params);
        self.register(method, options, path, DocRoute::new())
    }

    /// Registers a documented handler.
    ///
    /// Placeholders are named after the keys of `doc.parameters`.
    pub fn route_document(&mut self, method: Method, handler: Handler, pattern: &str, doc: DocRoute) -> &mut Self {
        self.route_document_with_options(method, HandlerOptions::new(handler), pattern, doc)
    }

    /// Registers a documented handler with its own context, error and panic
    /// handlers.
    pub fn route_document_with_options(
        &mut self,
        method: Method,
        options: HandlerOptions,
        pattern: &str,
        doc: DocRoute,
    ) -> &mut Self {
        let names: Vec<&str> = doc.parameters.keys().map(String::as_str).collect();
        let path = substitute_params(pattern, &names);
        self.register(method, options, path, doc)
    }

    fn register(&mut self, method: Method, options: HandlerOptions, path: String, doc: DocRoute) -> &mut Self {
        let full = format!("{}{}", self.base_path, path);
        let key = route_key(&method, &full);

        if let Some(previous) = self.table.insert(method.clone(), &full, &key) {
            warn!(route = %previous, "route registered twice, replacing handler");
        }
        debug!(route = %key, "registered route");
        self.routes.insert(key, Binding { path: full, options });

        let operation = DocOperation::new(method, self.base_path.clone(), path, doc);
        self.viewer.register_route(&operation);
        self.doc_operations.push(operation);
        self
    }

    /// Runs `validator` before every route under each of `groups`.
    ///
    /// Groups are path prefixes below the base path.
    pub fn group_contextualizer(&mut self, validator: Handler, groups: &[&str]) -> &mut Self {
        for group in groups {
            let prefix = format!("{}{}", self.base_path, group);
            self.groups.entry(prefix).or_default().push(Arc::clone(&validator));
        }
        self
    }

    /// Like [`Router::group_contextualizer`], also documenting the headers,
    /// cookies and responses shared by the groups.
    pub fn group_contextualizer_document(&mut self, validator: Handler, doc: DocGroup, groups: &[&str]) -> &mut Self {
        for group in groups {
            let prefix = format!("{}{}", self.base_path, group);
            self.viewer.register_group(&prefix, &doc);
            self.doc_groups.push((prefix.clone(), doc.clone()));
            self.groups.entry(prefix).or_default().push(Arc::clone(&validator));
        }
        self
    }

    /// Builds the context of every route without its own contextualizer.
    pub fn contextualizer<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Request) -> Result<Context, BoxError> + Send + Sync + 'static,
    {
        self.context = Some(Arc::new(f));
        self
    }

    /// Handles failures of every route without its own error handler.
    pub fn error_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Request, &Context, Outcome) -> Response + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(f));
        self
    }

    /// Handles panics of every route without its own panic handler.
    pub fn panic_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Request, &Panic) -> Response + Send + Sync + 'static,
    {
        self.panic = Some(Arc::new(f));
        self
    }

    /// Prefixes every route and group registered afterwards.
    pub fn base_path(&mut self, base_path: &str) -> &mut Self {
        let trimmed = base_path.trim_end_matches('/');
        self.base_path = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    /// Sets the CORS policy applied by the listeners.
    pub fn cors(&mut self, cors: Cors) -> &mut Self {
        self.cors = cors;
        self
    }

    /// The CORS policy applied by the listeners.
    #[must_use]
    pub fn cors_policy(&self) -> &Cors {
        &self.cors
    }

    /// Installs a documentation viewer and mounts its endpoints.
    ///
    /// Routes and groups registered before the call are replayed into the
    /// viewer. Endpoints are mounted at their own routes, ignoring the base
    /// path.
    pub fn doc_viewer<V: DocViewer + 'static>(&mut self, viewer: V) -> &mut Self {
        for (prefix, doc) in &self.doc_groups {
            viewer.register_group(prefix, doc);
        }
        for operation in &self.doc_operations {
            viewer.register_route(operation);
        }

        self.docs.clear();
        for endpoint in viewer.handlers() {
            let key = route_key(&endpoint.method, &endpoint.route);
            self.table.insert(endpoint.method.clone(), &endpoint.route, &key);
            info!(route = %key, name = %endpoint.name, "mounted documentation endpoint");
            self.docs.insert(key, endpoint);
        }

        self.viewer = Arc::new(viewer);
        self
    }

    /// The documentation endpoints mounted by the current viewer.
    #[must_use]
    pub fn viewer_sources(&self) -> Vec<DocViewerSource> {
        self.docs.values().map(DocViewerHandler::source).collect()
    }

    /// Serves files under the directory `dir` at `/{dir}/...`.
    ///
    /// The directory is resolved against the working directory and mounted
    /// ignoring the base path.
    pub fn resources_path(&mut self, dir: &str) -> &mut Self {
        let dir = dir.trim_matches('/');
        let files = StaticFiles::new(Path::new(dir));

        let root = format!("/{dir}");
        let nested = format!("/{dir}/*{RESOURCE_PARAM}");
        for method in [Method::GET, Method::HEAD] {
            for pattern in [&root, &nested] {
                let key = route_key(&method, pattern);
                self.table.insert(method.clone(), pattern, &key);
                self.resources.insert(key, files.clone());
            }
        }
        info!(dir, "serving static resources");
        self
    }

    /// Serves one request.
    ///
    /// Always produces a response, including after a panic in a handler.
    #[must_use]
    pub fn dispatch(&self, mut req: Request) -> Response {
        let (key, params) = match self.find(req.method(), req.uri().path()) {
            Ok(found) => found,
            Err(response) => return response,
        };

        let request_id = RequestId::new();
        if self.config.trace_request {
            info!(request_id = %request_id, method = %req.method(), path = %req.uri().path(), route = %key, "request");
        }

        if let Some(endpoint) = self.docs.get(&key) {
            let doc = (endpoint.handler)();
            return content(StatusCode::OK, doc.content_type, doc.body);
        }

        if let Some(files) = self.resources.get(&key) {
            let relative = params.get(RESOURCE_PARAM).unwrap_or_default();
            return files.serve(relative, req.method(), req.headers());
        }

        req.extensions_mut().insert(RouteParams(params));
        req.extensions_mut().insert(RouteKey(key.clone()));
        req.extensions_mut().insert(request_id);

        match catch_unwind(AssertUnwindSafe(|| self.resolve(&req, &key))) {
            Ok(response) => response,
            Err(payload) => self.recover(&req, &Panic::new(key, payload.as_ref())),
        }
    }

    fn find(&self, method: &Method, path: &str) -> Result<(String, Params), Response> {
        match self.table.lookup(method, path) {
            Lookup::Found(found) => Ok((found.key.to_string(), found.params)),
            Lookup::MethodNotAllowed(allowed) => {
                if *method == Method::HEAD && allowed.contains(&Method::GET) {
                    return self.find(&Method::GET, path);
                }
                Err(method_not_allowed(&allowed))
            }
            Lookup::NotFound => Err(plain_text(StatusCode::NOT_FOUND, "404 page not found")),
        }
    }

    fn resolve(&self, req: &Request, key: &str) -> Response {
        let binding = self.routes.get(key);
        let mut ctx = self.build_context(req, binding);

        let path = binding.map_or_else(|| req.uri().path(), |b| b.path.as_str());
        for (prefix, validators) in &self.groups {
            if !path.starts_with(prefix.as_str()) {
                continue;
            }
            for validator in validators {
                let outcome = validator(req, &mut ctx);
                if outcome.is_err() {
                    debug!(route = key, group = %prefix, "group validation failed");
                    return self.fail(req, &ctx, binding, outcome);
                }
            }
        }

        let Some(binding) = binding else {
            error!(route = key, "request handler not found");
            return plain_text(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Request handler not found for '{key}'"),
            );
        };

        let outcome = (binding.options.handler())(req, &mut ctx);
        if outcome.is_err() {
            return self.fail(req, &ctx, Some(binding), outcome);
        }
        write_outcome(&outcome)
    }

    fn build_context(&self, req: &Request, binding: Option<&Binding>) -> Context {
        let contextualizer = binding
            .and_then(|b| b.options.contextualizer())
            .or(self.context.as_ref());

        let Some(contextualizer) = contextualizer else {
            return Context::new();
        };

        match contextualizer(req) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(path = %req.uri().path(), error = %e, "contextualizer failed, using empty context");
                Context::new()
            }
        }
    }

    fn fail(&self, req: &Request, ctx: &Context, binding: Option<&Binding>, outcome: Outcome) -> Response {
        let handler = binding
            .and_then(|b| b.options.error_handler())
            .or(self.error.as_ref());

        match handler {
            Some(handler) => handler(req, ctx, outcome),
            None => write_outcome(&outcome),
        }
    }

    fn recover(&self, req: &Request, panic: &Panic) -> Response {
        let request_id = req.request_id().map(|id| id.to_string()).unwrap_or_default();
        error!(request_id = %request_id, route = %panic.route, message = %panic.message, "handler panicked");

        let handler = self
            .routes
            .get(&panic.route)
            .and_then(|b| b.options.panic_handler())
            .or(self.panic.as_ref());

        let Some(handler) = handler else {
            return default_panic_response(&panic.route);
        };

        catch_unwind(AssertUnwindSafe(|| handler(req, panic))).unwrap_or_else(|_| {
            error!(route = %panic.route, "panic handler panicked");
            default_panic_response(&panic.route)
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("base_path", &self.base_path)
            .field("routes", &self.routes.len())
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("docs", &self.docs.keys().collect::<Vec<_>>())
            .field("cors", &self.cors)
            .finish_non_exhaustive()
    }
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{method} {path}")
}

/// Replaces each `{}` in `pattern` with `{name}`, taking names in order.
fn substitute_params(pattern: &str, names: &[&str]) -> String {
    let mut names = names.iter();
    let mut pieces = pattern.split("{}");
    let mut out = String::with_capacity(pattern.len());
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }

    let mut missing = 0_usize;
    for piece in pieces {
        match names.next() {
            Some(name) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
            None => {
                out.push_str("{}");
                missing += 1;
            }
        }
        out.push_str(piece);
    }

    let unused = names.count();
    if missing > 0 || unused > 0 {
        warn!(pattern, missing, unused, "route placeholders and parameter names do not line up");
    }

    if out.starts_with('/') {
        out
    } else {
        format!("/{out}")
    }
}

fn content(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = plain_text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

fn default_panic_response(route: &str) -> Response {
    plain_text(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Uncontrolled panic during resolution of '{route}'"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler;
    use crate::request::RequestExt;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use waypoint_docs::{DocPayload, OpenApiViewer};

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder().method(method).uri(uri).body(Bytes::new()).unwrap()
    }

    fn body(response: Response) -> String {
        let bytes = block_on(response.into_body().collect()).unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn text(value: &'static str) -> Handler {
        handler(move |_, _| Outcome::text_ok(StatusCode::OK, value))
    }

    #[test]
    fn test_substitute_params() {
        assert_eq!(substitute_params("/hello/{}", &["place"]), "/hello/{place}");
        assert_eq!(substitute_params("/a/{}/b/{}", &["x", "y"]), "/a/{x}/b/{y}");
        assert_eq!(substitute_params("/a/{}", &[]), "/a/{}");
        assert_eq!(substitute_params("users", &[]), "/users");
    }

    #[test]
    fn test_dispatch_with_params() {
        let mut router = Router::new();
        router.route(
            Method::GET,
            handler(|req, _| {
                let place = req.param("place").map(|p| p.as_str().to_string()).unwrap_or_default();
                Outcome::text_ok(StatusCode::OK, format!("hello {place}"))
            }),
            "/hello/{}",
            &["place"],
        );

        let response = router.dispatch(request(Method::GET, "/hello/world"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response), "hello world");
    }

    #[test]
    fn test_methods_sharing_a_path_keep_their_parameter_names() {
        let echo = |name: &'static str| {
            handler(move |req, _| {
                let value = req.param(name).map(|p| p.as_str().to_string());
                Outcome::text_ok(StatusCode::OK, format!("{name}={value:?}"))
            })
        };

        let mut router = Router::new();
        router
            .route(Method::GET, echo("id"), "/users/{}", &["id"])
            .route(Method::DELETE, echo("name"), "/users/{}", &["name"]);

        let response = router.dispatch(request(Method::DELETE, "/users/bob"));
        assert_eq!(body(response), "name=Some(\"bob\")");

        let response = router.dispatch(request(Method::GET, "/users/7"));
        assert_eq!(body(response), "id=Some(\"7\")");
    }

    #[test]
    fn test_each_request_gets_an_id() {
        let mut router = Router::new();
        router.route(
            Method::GET,
            handler(|req, _| match req.request_id() {
                Some(id) => Outcome::text_ok(StatusCode::OK, id.to_string()),
                None => Outcome::reject(StatusCode::INTERNAL_SERVER_ERROR),
            }),
            "/id",
            &[],
        );

        let first = body(router.dispatch(request(Method::GET, "/id")));
        let second = body(router.dispatch(request(Method::GET, "/id")));
        assert_eq!(first.len(), 36);
        assert_ne!(first, second);
    }

    #[test]
    fn test_not_found_and_method_not_allowed() {
        let mut router = Router::new();
        router.route(Method::GET, text("x"), "/x", &[]);

        let response = router.dispatch(request(Method::GET, "/missing"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router.dispatch(request(Method::DELETE, "/x"));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET");
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let mut router = Router::new();
        router.route(Method::GET, text("x"), "/x", &[]);

        let response = router.dispatch(request(Method::HEAD, "/x"));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_duplicate_registration_replaces_handler() {
        let mut router = Router::new();
        router.route(Method::GET, text("first"), "/x", &[]);
        router.route(Method::GET, text("second"), "/x", &[]);

        assert_eq!(body(router.dispatch(request(Method::GET, "/x"))), "second");
    }

    #[test]
    fn test_base_path_prefixes_routes() {
        let mut router = Router::new();
        router.base_path("api/").route(Method::GET, text("x"), "/x", &[]);

        assert_eq!(router.dispatch(request(Method::GET, "/api/x")).status(), StatusCode::OK);
        assert_eq!(router.dispatch(request(Method::GET, "/x")).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_panic_is_recovered() {
        let mut router = Router::new();
        router.route(Method::GET, handler(|_, _| panic!("boom")), "/x", &[]);
        router.route(Method::GET, text("fine"), "/y", &[]);

        let response = router.dispatch(request(Method::GET, "/x"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(response).contains("/x"));

        let response = router.dispatch(request(Method::GET, "/y"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response), "fine");
    }

    #[test]
    fn test_panic_handler_chain() {
        let mut router = Router::new();
        router.panic_handler(|_req, panic| plain_text(StatusCode::SERVICE_UNAVAILABLE, panic.message.clone()));
        router.route(Method::GET, handler(|_, _| panic!("global")), "/global", &[]);
        router.route_with_options(
            Method::GET,
            HandlerOptions::new(handler(|_, _| panic!("local")))
                .panic(|_req, panic| plain_text(StatusCode::BAD_GATEWAY, panic.route.clone())),
            "/local",
            &[],
        );

        let response = router.dispatch(request(Method::GET, "/global"));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body(response), "global");

        let response = router.dispatch(request(Method::GET, "/local"));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body(response), "GET /local");
    }

    #[test]
    fn test_context_chain() {
        let mut router = Router::new();
        router.contextualizer(|_req| {
            let mut ctx = Context::new();
            ctx.put("who", "global");
            Ok(ctx)
        });

        let greet = handler(|_, ctx| Outcome::text_ok(StatusCode::OK, ctx.get_or_empty("who").str_or("none").to_string()));
        router.route(Method::GET, Arc::clone(&greet), "/global", &[]);
        router.route_with_options(
            Method::GET,
            HandlerOptions::new(Arc::clone(&greet)).context(|_req| {
                let mut ctx = Context::new();
                ctx.put("who", "route");
                Ok(ctx)
            }),
            "/route",
            &[],
        );
        router.route_with_options(
            Method::GET,
            HandlerOptions::new(greet).context(|_req| Err("no session".into())),
            "/broken",
            &[],
        );

        assert_eq!(body(router.dispatch(request(Method::GET, "/global"))), "global");
        assert_eq!(body(router.dispatch(request(Method::GET, "/route"))), "route");
        assert_eq!(body(router.dispatch(request(Method::GET, "/broken"))), "none");
    }

    #[test]
    fn test_group_validation_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut router = Router::new();
        router.group_contextualizer(
            handler(|req, _| {
                if req.headers().contains_key("authorization") {
                    Outcome::next()
                } else {
                    Outcome::reject(StatusCode::UNAUTHORIZED)
                }
            }),
            &["/admin"],
        );
        router.route(
            Method::GET,
            handler(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Outcome::accept(StatusCode::NO_CONTENT)
            }),
            "/admin/stats",
            &[],
        );
        router.route(Method::GET, text("open"), "/public", &[]);

        let response = router.dispatch(request(Method::GET, "/admin/stats"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let authorized = http::Request::get("/admin/stats")
            .header("authorization", "Bearer t")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(router.dispatch(authorized).status(), StatusCode::NO_CONTENT);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(router.dispatch(request(Method::GET, "/public")).status(), StatusCode::OK);
    }

    #[test]
    fn test_error_handler_chain() {
        let failing = handler(|_, _| Outcome::text_err(StatusCode::BAD_REQUEST, "bad"));

        let mut router = Router::new();
        router.route(Method::GET, Arc::clone(&failing), "/plain", &[]);
        assert_eq!(router.dispatch(request(Method::GET, "/plain")).status(), StatusCode::BAD_REQUEST);

        router.error_handler(|_req, _ctx, outcome| {
            plain_text(StatusCode::IM_A_TEAPOT, format!("{:?}", outcome.status()))
        });
        router.route_with_options(
            Method::GET,
            HandlerOptions::new(failing).error(|_req, _ctx, _outcome| plain_text(StatusCode::CONFLICT, "route")),
            "/route",
            &[],
        );

        assert_eq!(router.dispatch(request(Method::GET, "/plain")).status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(router.dispatch(request(Method::GET, "/route")).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_missing_handler_is_deterministic() {
        let mut router = Router::new();
        router.table.insert(Method::GET, "/ghost", "GET /ghost");

        let response = router.dispatch(request(Method::GET, "/ghost"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response), "Request handler not found for 'GET /ghost'");
    }

    #[test]
    fn test_doc_viewer_mounts_endpoints() {
        let mut router = Router::new();
        router.base_path("/api");
        router.route_document(
            Method::GET,
            text("hi"),
            "/hello/{}",
            DocRoute::new()
                .parameter("place", "Where")
                .response(StatusCode::OK, DocPayload::text()),
        );
        router.doc_viewer(OpenApiViewer::new());

        let sources = router.viewer_sources();
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().any(|s| s.route == "/swagger/doc.json"));

        let response = router.dispatch(request(Method::GET, "/swagger/doc.json"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(body(response).contains("/api/hello/{place}"));

        assert_eq!(router.dispatch(request(Method::GET, "/api/hello/x")).status(), StatusCode::OK);
    }

    #[test]
    fn test_route_params_in_extensions() {
        let mut router = Router::new();
        router.route(
            Method::GET,
            handler(|req, _| Outcome::text_ok(StatusCode::OK, req.route_key().unwrap_or("?").to_string())),
            "/items/{}",
            &["id"],
        );

        assert_eq!(body(router.dispatch(request(Method::GET, "/items/7"))), "GET /items/{id}");
    }
}
