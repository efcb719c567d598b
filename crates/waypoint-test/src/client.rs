//! In-memory client driving a [`Router`].

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use waypoint_server::Router;

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// Sends requests straight to a router, without sockets.
///
/// Requests go through the router's CORS policy and the full dispatch
/// pipeline, exactly as a listener would run them.
///
/// ```rust
/// use http::{Method, StatusCode};
/// use waypoint_core::Outcome;
/// use waypoint_server::{handler, Router};
/// use waypoint_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let mut router = Router::new();
/// router.route(Method::GET, handler(|_, _| Outcome::text_ok(StatusCode::OK, "pong")), "/ping", &[]);
///
/// let client = TestClient::new(router);
/// let response = client.get("/ping").send().await;
/// response.assert_status(StatusCode::OK).assert_body_contains("pong");
/// # });
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    router: Arc<Router>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// A client for `router`.
    pub fn new(router: Router) -> Self {
        Self::from_shared(Arc::new(router))
    }

    /// A client for an already shared router.
    pub fn from_shared(router: Arc<Router>) -> Self {
        Self {
            router,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The router under test.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest { client: self, builder }
    }

    /// Dispatches a built request.
    pub async fn execute(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let router = &self.router;
        let response = router
            .cors_policy()
            .handle(request.into_request(), |req| router.dispatch(req));
        TestResponse::from_response(response).await
    }
}

/// A request bound to a [`TestClient`].
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the `Authorization` header to a bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a form body.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, returning build and read errors.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use waypoint_core::Outcome;
    use waypoint_server::{handler, input_json, Cors, RequestExt};

    #[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq)]
    struct Greeting {
        name: String,
    }

    fn router() -> Router {
        let mut router = Router::new();
        router
            .route(
                Method::GET,
                handler(|req, _| {
                    let id = req.param("id").and_then(|a| a.i64()).unwrap_or_default();
                    Outcome::json_ok(StatusCode::OK, json!({ "id": id }))
                }),
                "/users/{}",
                &["id"],
            )
            .route(
                Method::POST,
                handler(|req, _| match input_json::<Greeting>(req) {
                    Ok(greeting) => Outcome::json_ok(StatusCode::CREATED, greeting),
                    Err(rejection) => rejection.into(),
                }),
                "/greetings",
                &[],
            )
            .route(
                Method::GET,
                handler(|req, _| {
                    let auth = req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("none")
                        .to_string();
                    Outcome::text_ok(StatusCode::OK, auth)
                }),
                "/whoami",
                &[],
            );
        router
    }

    #[tokio::test]
    async fn test_get_with_params() {
        let client = TestClient::new(router());
        client
            .get("/users/42")
            .send()
            .await
            .assert_status(StatusCode::OK)
            .assert_json_field("id", &json!(42));
    }

    #[tokio::test]
    async fn test_post_json() {
        let client = TestClient::new(router());
        let response = client
            .post("/greetings")
            .json(&Greeting { name: "Ada".to_string() })
            .send()
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Greeting>().unwrap().name, "Ada");

        let response = client.post("/greetings").body("{not json").send().await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_default_headers_and_token() {
        let client = TestClient::new(router()).with_default_header("authorization", "Basic abc");
        client.get("/whoami").send().await.assert_body_contains("Basic abc");
        client
            .get("/whoami")
            .bearer_token("t")
            .send()
            .await
            .assert_body_contains("Bearer t");
    }

    #[tokio::test]
    async fn test_cors_applies() {
        let mut router = router();
        router.cors(Cors::permissive());
        let client = TestClient::new(router);

        let response = client.request(Method::OPTIONS, "/users/1").header("origin", "https://a.example").send().await;
        response
            .assert_status(StatusCode::OK)
            .assert_header("access-control-allow-origin", "https://a.example");
    }

    #[tokio::test]
    async fn test_unknown_routes() {
        let client = TestClient::new(router());
        client.delete("/users/1").send().await.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        client.put("/nowhere").send().await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let client = TestClient::new(router());
        let result = client.get("/whoami").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
