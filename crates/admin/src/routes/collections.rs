//! Collection extraction and import proxies.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use shop_console_core::ImportProgress;
use tracing::instrument;

use super::method_not_allowed;
use crate::error::AppError;
use crate::services::ImportTarget;
use crate::state::AppState;

const URL_REQUIRED: &str = "URL is required";
const IMPORT_FIELDS_REQUIRED: &str = "Missing required fields or invalid JSON.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/extract-collections",
            post(extract_collections).fallback(method_not_allowed),
        )
        .route(
            "/import-collections",
            post(import_collections).fallback(method_not_allowed),
        )
        .route("/import-collections/progress", get(import_progress))
}

/// Extraction request body.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: Option<String>,
}

/// Import request body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub shop_url: Option<String>,
    pub access_token: Option<String>,
    pub collections: Option<Value>,
}

impl std::fmt::Debug for ImportRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportRequest")
            .field("shop_url", &self.shop_url)
            .field("access_token", &"[REDACTED]")
            .field("collections", &self.collections.as_ref().map(|_| ".."))
            .finish()
    }
}

impl ImportRequest {
    /// Split the request into a target and its collections.
    ///
    /// Every field must be present and non-empty, and `collections` must be
    /// an array of objects.
    fn into_parts(self) -> Option<(ImportTarget, Vec<Map<String, Value>>)> {
        let shop_url = self.shop_url.filter(|s| !s.trim().is_empty())?;
        let access_token = self.access_token.filter(|s| !s.is_empty())?;
        let Value::Array(items) = self.collections? else {
            return None;
        };
        let collections = items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        Some((
            ImportTarget::new(&shop_url, SecretString::from(access_token)),
            collections,
        ))
    }
}

/// List a storefront's public collections.
///
/// POST /extract-collections
#[instrument(skip(state, body))]
async fn extract_collections(
    State(state): State<AppState>,
    body: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let url = body
        .ok()
        .and_then(|Json(req)| req.url)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(URL_REQUIRED.to_string()))?;

    let collections = state.storefront().extract_collections(&url).await?;
    Ok(Json(json!({ "collections": collections })))
}

/// Create smart collections in a shop, one request at a time.
///
/// POST /import-collections
#[instrument(skip(state, body))]
async fn import_collections(
    State(state): State<AppState>,
    body: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let (target, collections) = body
        .ok()
        .and_then(|Json(req)| req.into_parts())
        .ok_or_else(|| AppError::BadRequest(IMPORT_FIELDS_REQUIRED.to_string()))?;

    let results = state.import_queue().run(&target, collections).await;
    Ok(Json(json!({
        "message": "Import process completed",
        "results": results,
    })))
}

/// Progress of the current or most recent import.
///
/// GET /import-collections/progress
async fn import_progress(State(state): State<AppState>) -> Json<ImportProgress> {
    Json(state.import_queue().progress())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(value: Value) -> ImportRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_import_request_uses_camel_case() {
        let (target, collections) = request(json!({
            "shopUrl": "https://demo.myshopify.com/",
            "accessToken": "shpat_x",
            "collections": [{"handle": "a"}]
        }))
        .into_parts()
        .unwrap();
        assert_eq!(target.shop(), "demo.myshopify.com");
        assert_eq!(collections.len(), 1);
    }

    #[test]
    fn test_import_request_rejects_missing_fields() {
        assert!(request(json!({"shopUrl": "x", "collections": []})).into_parts().is_none());
        assert!(
            request(json!({"shopUrl": "", "accessToken": "t", "collections": []}))
                .into_parts()
                .is_none()
        );
        assert!(
            request(json!({"shopUrl": "x", "accessToken": "t", "collections": {"a": 1}}))
                .into_parts()
                .is_none()
        );
        assert!(
            request(json!({"shopUrl": "x", "accessToken": "t", "collections": [1]}))
                .into_parts()
                .is_none()
        );
    }

    #[test]
    fn test_import_request_accepts_empty_batch() {
        let (_, collections) = request(json!({"shopUrl": "x", "accessToken": "t", "collections": []}))
            .into_parts()
            .unwrap();
        assert!(collections.is_empty());
    }

    #[test]
    fn test_import_request_debug_redacts_token() {
        let req = request(json!({"shopUrl": "x", "accessToken": "shpat_secret"}));
        assert!(!format!("{req:?}").contains("shpat_secret"));
    }
}
