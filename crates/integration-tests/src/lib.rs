//! Integration tests for ShapeShop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shapeshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart API driven through the full router
//! - `file_cart` - Directory-backed cart persistence
//!
//! The router is exercised in-process with `tower::ServiceExt::oneshot`;
//! [`TestContext`] carries the session cookie between requests the way a
//! browser would.

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use shapeshop_storefront::catalog::Catalog;
use shapeshop_storefront::config::StorefrontConfig;
use shapeshop_storefront::routes;
use shapeshop_storefront::state::AppState;
use tower::ServiceExt;

/// Catalog used by the HTTP tests.
pub const TEST_CATALOG: &str = r#"[
    {"id": 1, "handle": "desk-lamp", "title": "Desk Lamp", "price": "25.00",
     "customization_price": "5.00", "stock": 5, "customizable": true},
    {"id": 2, "handle": "cable-clip", "title": "Cable Clip", "price": "3.50",
     "stock": 2},
    {"id": 3, "handle": "name-plate", "title": "Name Plate", "price": "18.00",
     "customization_price": "4.00", "customizable": true}
]"#;

/// Storefront configuration for tests.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        catalog_path: PathBuf::from("catalog.json"),
        session_expiry_secs: 3600,
    }
}

/// An in-process storefront plus one visitor's session cookie.
pub struct TestContext {
    app: Router,
    cookie: Option<String>,
}

impl TestContext {
    /// Build the storefront over [`TEST_CATALOG`].
    ///
    /// # Panics
    ///
    /// Panics if the test catalog is invalid.
    #[must_use]
    pub fn new() -> Self {
        let catalog = Catalog::from_json(TEST_CATALOG).expect("test catalog is valid");
        let state = AppState::new(test_config(), catalog);
        Self {
            app: routes::app(state),
            cookie: None,
        }
    }

    /// A second visitor on the same server, with no session yet.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    /// Send a GET request.
    pub async fn get(&mut self, path: &str) -> (StatusCode, Value) {
        self.send(Request::get(path), Body::empty()).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&mut self, path: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        self.send(request, Body::from(body.to_string())).await
    }

    async fn send(
        &mut self,
        mut builder: axum::http::request::Builder,
        body: Body,
    ) -> (StatusCode, Value) {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(body).expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let value = set_cookie.to_str().expect("ascii cookie");
            let pair = value.split(';').next().unwrap_or(value);
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let json = serde_json::from_str(&text).unwrap_or(Value::String(text));
        (status, json)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
