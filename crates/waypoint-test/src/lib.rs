//! # Waypoint Test
//!
//! In-memory testing for Waypoint routers: no sockets, no port binding.
//! Requests run through the router's CORS policy and the complete dispatch
//! pipeline (contextualizers, group validators, handlers, error and panic
//! handlers).
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_test::TestClient;
//!
//! #[tokio::test]
//! async fn creates_users() {
//!     let client = TestClient::new(app());
//!
//!     client
//!         .post("/users")
//!         .json(&serde_json::json!({ "name": "Ada" }))
//!         .send()
//!         .await
//!         .assert_status(http::StatusCode::CREATED)
//!         .assert_json_field("name", &serde_json::json!("Ada"));
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
