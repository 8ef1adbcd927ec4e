//! Unified error handling for the console service.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Application-level error type for the console service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify request failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Endpoint called with the wrong HTTP method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(ShopifyError::InvalidUrl(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Console request error"
            );
        }

        // The store's own message helps the operator; internal details don't
        let message = match &self {
            Self::Shopify(e) => e.to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
