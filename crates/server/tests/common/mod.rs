//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock collaborators injected, enabling end-to-end API tests without
//! a database or a geocoding service.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use prodiscovery_core::{
    testing::{MockAvailability, MockCategoryStore, MockGeocoder, MockListingRepository},
    AvailabilityMatcher, CategoryQueryResolver, CategoryTextStore, Config, GeocodingProvider,
    LocationResolver, ProListingRepository, SearchOrchestrator,
};
use prodiscovery_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use prodiscovery_core::testing::fixtures;

/// Address known to the mock geocoder.
pub const ADDRESS: &str = "Av. 18 de Julio 1000";

/// Test fixture for API testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Listings (MockListingRepository)
/// - Category text search (MockCategoryStore)
/// - Availability (MockAvailability)
/// - Geocoding (MockGeocoder), which knows [`ADDRESS`]
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.listings.set_listings(vec![fixtures::pro("A", &[])]).await;
///
///     let response = fixture.get("/api/v1/pros/search").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub listings: Arc<MockListingRepository>,
    pub categories: Arc<MockCategoryStore>,
    pub availability: Arc<MockAvailability>,
    pub geocoder: Arc<MockGeocoder>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let listings = Arc::new(MockListingRepository::new());
        let categories = Arc::new(MockCategoryStore::new());
        let availability = Arc::new(MockAvailability::new());
        let geocoder = Arc::new(MockGeocoder::new());
        geocoder.add_address(ADDRESS, -34.9, -56.2).await;

        let config = Config::default();

        let orchestrator = SearchOrchestrator::new(
            Arc::clone(&listings) as Arc<dyn ProListingRepository>,
            CategoryQueryResolver::new(Arc::clone(&categories) as Arc<dyn CategoryTextStore>),
            Arc::clone(&availability) as Arc<dyn AvailabilityMatcher>,
            Some(LocationResolver::new(
                Arc::clone(&geocoder) as Arc<dyn GeocodingProvider>,
                config.discovery.supported_country.clone(),
            )),
            config.discovery.default_country.clone(),
        );

        let state = Arc::new(AppState::new(config, orchestrator));
        let router = create_router(state);

        Self {
            router,
            listings,
            categories,
            availability,
            geocoder,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

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
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

/// Ids of the `pros` array in a search response.
pub fn pro_ids(body: &Value) -> Vec<String> {
    body["pros"]
        .as_array()
        .expect("pros array")
        .iter()
        .map(|pro| pro["id"].as_str().expect("pro id").to_string())
        .collect()
}
