//! HTTP route handlers for the console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Health check
//!
//! # Collection proxies
//! POST /extract-collections          - List a storefront's public collections
//! POST /import-collections           - Create smart collections in a shop
//! GET  /import-collections/progress  - Progress of the current import
//!
//! # Tag automation
//! POST /tag-automation               - Merge collection tags into a master CSV
//! ```

pub mod collections;
pub mod tagging;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::state::AppState;

/// All console routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(collections::router())
        .merge(tagging::router())
}

/// The console application with its request layers, ready to serve.
///
/// Sentry layers are added by the binary so tests can use this directly.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);
    let cors = config.cors_allowed_origin.as_deref().and_then(cors_layer);

    let router = routes()
        .layer(body_limit)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        );

    match cors {
        Some(cors) => router.layer(cors).with_state(state),
        None => router.with_state(state),
    }
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let Ok(origin) = origin.parse::<HeaderValue>() else {
        tracing::warn!(origin, "Ignoring invalid CORS origin");
        return None;
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .expose_headers([
                header::CONTENT_DISPOSITION,
                tagging::RUN_ID_HEADER,
                tagging::UPDATED_ROWS_HEADER,
            ]),
    )
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Fallback for proxy endpoints called with anything but POST.
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
