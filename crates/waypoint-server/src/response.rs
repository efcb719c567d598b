//! Writing outcomes as HTTP responses.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use tracing::error;
use waypoint_core::Outcome;

use crate::handler::Response;

/// Writes an outcome: its status, the encoder headers, the outcome's own
/// headers, then the encoded payload.
///
/// The status alone decides what is written; failures and successes share
/// this path. A continue outcome has nothing to write and becomes
/// `204 No Content`. If encoding fails the client gets a plain
/// `500 Internal Server Error` carrying the encoder message.
#[must_use]
pub fn write_outcome(outcome: &Outcome) -> Response {
    let Some(status) = outcome.status() else {
        return empty(StatusCode::NO_CONTENT);
    };

    let body = match outcome.encode() {
        Ok(body) => body,
        Err(e) => {
            error!(status = status.as_u16(), error = %e, "failed to encode response payload");
            return plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.extend(outcome.encoder().headers());
    for (name, value) in outcome.headers() {
        headers.insert(name.clone(), value.clone());
    }
    response
}

/// A `text/plain` response.
#[must_use]
pub fn plain_text(status: StatusCode, body: impl Into<Bytes>) -> Response {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

/// A response with no body.
#[must_use]
pub fn empty(status: StatusCode) -> Response {
    let mut response = Response::default();
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, CACHE_CONTROL};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use waypoint_core::{CoreError, CoreResult, Encoder, Payload};

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    struct Broken;

    impl Encoder for Broken {
        fn encode(&self, _payload: &Payload) -> CoreResult<Bytes> {
            Err(CoreError::custom("broken", "cannot encode"))
        }

        fn headers(&self) -> http::HeaderMap {
            http::HeaderMap::new()
        }
    }

    #[tokio::test]
    async fn test_success_writes_encoder_headers() {
        let response = write_outcome(&Outcome::json_ok(StatusCode::CREATED, vec![1, 2]));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_text(response).await, "[\n 1,\n 2\n]");
    }

    #[tokio::test]
    async fn test_failure_uses_same_writer() {
        let response = write_outcome(&Outcome::text_err(StatusCode::NOT_FOUND, "no such pet"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(response).await, "no such pet");
    }

    #[tokio::test]
    async fn test_empty_payload_has_empty_body() {
        let response = write_outcome(&Outcome::reject(StatusCode::FORBIDDEN));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.is_empty());
    }

    #[test]
    fn test_continue_is_no_content() {
        let response = write_outcome(&Outcome::next());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_outcome_headers_are_written() {
        let outcome = Outcome::accept(StatusCode::OK)
            .with_header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .with_header(HeaderName::from_static("x-trace"), HeaderValue::from_static("1"));
        let response = write_outcome(&outcome);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()["x-trace"], "1");
    }

    #[tokio::test]
    async fn test_encoding_failure_is_500() {
        let outcome = Outcome::ok("anything").with_encoder(Arc::new(Broken));
        let response = write_outcome(&outcome);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("cannot encode"));
    }
}
