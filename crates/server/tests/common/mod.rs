//! Common test utilities.
//!
//! An in-process router with mock cover sources injected, so API tests run
//! without any network access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use coverscout_core::sources::CoverSourceKind;
use coverscout_core::testing::MockCoverSource;
use coverscout_core::{Config, CoverFinder, CoverSource};
use coverscout_server::api::create_router;
use coverscout_server::state::AppState;

/// Test fixture wrapping the router plus the mocks behind it.
pub struct TestFixture {
    pub router: Router,
    /// Mock title-index branch.
    pub index: Arc<MockCoverSource>,
    /// Mock storefront branch.
    pub storefront: Arc<MockCoverSource>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        let index = Arc::new(MockCoverSource::new(CoverSourceKind::Igdb));
        let storefront = Arc::new(MockCoverSource::new(CoverSourceKind::Steam));

        let finder = Arc::new(CoverFinder::new(
            Arc::clone(&index) as Arc<dyn CoverSource>,
            Arc::clone(&storefront) as Arc<dyn CoverSource>,
            20,
        ));

        let state = Arc::new(AppState::new(Config::default(), finder, None));
        let router = create_router(state);

        Self {
            router,
            index,
            storefront,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let request = match body {
            Some(json) => {
                request_builder = request_builder.header("Content-Type", "application/json");
                request_builder
                    .body(Body::from(json.to_string()))
                    .expect("Failed to build request")
            }
            None => request_builder
                .body(Body::empty())
                .expect("Failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
