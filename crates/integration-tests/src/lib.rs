//! Integration tests for the Shop Console.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-console-integration-tests
//! ```
//!
//! Tests drive the console router in-process with `tower::ServiceExt::oneshot`.
//! Shopify is replaced by [`FakeShop`], a small axum server on a random local
//! port that serves `collections.json` and accepts smart collection creates.

#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes, to_bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use shop_console_admin::routes;
use shop_console_admin::{AppState, ConsoleConfig, ShopifyConfig};
use tower::ServiceExt;
use zip::write::SimpleFileOptions;

/// Access token the fake shop accepts.
pub const FAKE_TOKEN: &str = "shpat_integration";

/// Bodies of smart collection creates received by the fake shop.
pub type Received = Arc<Mutex<Vec<Value>>>;

/// A running fake Shopify store.
pub struct FakeShop {
    pub addr: SocketAddr,
    pub received: Received,
}

impl FakeShop {
    /// Start the fake store on a random local port.
    pub async fn start() -> Self {
        let received = Received::default();
        let app = Router::new()
            .route("/collections.json", get(collections))
            .route("/locked/collections.json", get(locked))
            .route(
                "/admin/api/2023-10/smart_collections.json",
                post(create_smart_collection),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, received }
    }

    /// Base URL of the public storefront.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Smart collection bodies received so far.
    #[must_use]
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

async fn collections(uri: axum::http::Uri) -> (StatusCode, Json<Value>) {
    if uri.query() != Some("limit=250") {
        return (StatusCode::BAD_REQUEST, Json(json!({"errors": "bad query"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "collections": [
                {"id": 1, "title": "Summer Sale", "handle": "summer-sale", "body_html": ""},
                {"id": 2, "title": "Winter", "handle": "winter", "body_html": ""}
            ]
        })),
    )
}

async fn locked() -> StatusCode {
    StatusCode::UNAUTHORIZED
}

async fn create_smart_collection(
    State(received): State<Received>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("x-shopify-access-token").and_then(|v| v.to_str().ok()) != Some(FAKE_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errors": "[API] Invalid API key or access token"})),
        );
    }
    received.lock().unwrap().push(body.clone());

    let collection = &body["smart_collection"];
    if collection["title"].as_str().is_none_or(str::is_empty) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"errors": {"title": ["can't be blank"]}})),
        );
    }
    if collection["handle"] == "teapot" {
        return (StatusCode::IM_A_TEAPOT, Json(json!({})));
    }
    (StatusCode::CREATED, Json(json!({"smart_collection": collection})))
}

/// Console configuration pointed at plain-HTTP fakes with no import delay.
#[must_use]
pub fn test_config() -> ConsoleConfig {
    ConsoleConfig {
        shopify: ShopifyConfig {
            admin_scheme: "http".to_string(),
            import_delay: Duration::ZERO,
            ..ShopifyConfig::default()
        },
        ..ConsoleConfig::default()
    }
}

/// The console application under test.
#[must_use]
pub fn console() -> Router {
    routes::app(AppState::new(test_config()))
}

/// A response reduced to its parts.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

/// Send one request through `app`.
pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}

/// A JSON POST request.
#[must_use]
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

const BOUNDARY: &str = "shop-console-test-boundary";

/// A `multipart/form-data` POST request.
#[must_use]
pub fn post_multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        write!(body, "--{BOUNDARY}\r\n").unwrap();
        match part {
            Part::Text(name, value) => {
                write!(
                    body,
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .unwrap();
            }
            Part::File(name, filename, bytes) => {
                write!(
                    body,
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .unwrap();
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    write!(body, "--{BOUNDARY}--\r\n").unwrap();

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A ZIP archive holding `entries` as `(name, contents)`.
#[must_use]
pub fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, contents) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
