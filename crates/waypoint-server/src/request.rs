//! Typed access to matched route data.

use serde::de::DeserializeOwned;
use waypoint_core::{Arg, RequestId};
use waypoint_router::Params;

/// Path parameters extracted by the route table, stored in request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(pub Params);

/// The key of the route serving a request (`"GET /api/users/{id}"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteKey(pub String);

/// Accessors for path parameters, query values and the matched route.
///
/// ```rust
/// use bytes::Bytes;
/// use waypoint_server::{Request, RequestExt};
///
/// let req: Request = http::Request::builder()
///     .uri("/search?q=rust&page=2")
///     .body(Bytes::new())
///     .unwrap();
///
/// assert_eq!(req.query("page").and_then(|a| a.i32()), Some(2));
/// assert!(req.query("missing").is_none());
/// ```
pub trait RequestExt {
    /// A path parameter by name.
    fn param(&self, name: &str) -> Option<Arg>;

    /// A query string value by name. The first occurrence wins.
    fn query(&self, name: &str) -> Option<Arg>;

    /// The whole query string deserialized into `T`.
    fn query_as<T: DeserializeOwned>(&self) -> Option<T>;

    /// The key of the route serving this request.
    fn route_key(&self) -> Option<&str>;

    /// The identifier assigned to this request by the router.
    fn request_id(&self) -> Option<RequestId>;
}

impl<B> RequestExt for http::Request<B> {
    fn param(&self, name: &str) -> Option<Arg> {
        self.extensions()
            .get::<RouteParams>()
            .and_then(|params| params.0.get(name))
            .map(Arg::new)
    }

    fn query(&self, name: &str) -> Option<Arg> {
        let query = self.uri().query()?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
        pairs
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| Arg::new(value))
    }

    fn query_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_urlencoded::from_str(self.uri().query().unwrap_or_default()).ok()
    }

    fn route_key(&self) -> Option<&str> {
        self.extensions().get::<RouteKey>().map(|key| key.0.as_str())
    }

    fn request_id(&self) -> Option<RequestId> {
        self.extensions().get::<RequestId>().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn request(uri: &str) -> http::Request<()> {
        http::Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_param_from_extensions() {
        let mut req = request("/users/42");
        let mut params = Params::new();
        params.push("id", "42");
        req.extensions_mut().insert(RouteParams(params));

        assert_eq!(req.param("id").and_then(|a| a.i64()), Some(42));
        assert!(req.param("name").is_none());
    }

    #[test]
    fn test_param_without_match() {
        assert!(request("/").param("id").is_none());
        assert!(request("/").route_key().is_none());
        assert!(request("/").request_id().is_none());
    }

    #[test]
    fn test_query_decoding() {
        let req = request("/search?q=hello+world&tag=a%26b&tag=second");
        assert_eq!(req.query("q").unwrap().as_str(), "hello world");
        assert_eq!(req.query("tag").unwrap().as_str(), "a&b");
    }

    #[test]
    fn test_query_as() {
        #[derive(Deserialize)]
        struct Page {
            page: u32,
            size: Option<u32>,
        }

        let page: Page = request("/items?page=3").query_as().unwrap();
        assert_eq!(page.page, 3);
        assert!(page.size.is_none());

        assert!(request("/items").query_as::<Page>().is_none());
    }

    #[test]
    fn test_route_key() {
        let mut req = request("/x");
        req.extensions_mut().insert(RouteKey("GET /x".to_string()));
        assert_eq!(req.route_key(), Some("GET /x"));
    }
}
