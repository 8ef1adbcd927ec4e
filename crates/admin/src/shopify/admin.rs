//! Admin REST API calls made on behalf of the operator.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use super::ShopifyError;
use crate::config::ShopifyConfig;

/// Fields Shopify assigns itself and rejects on create.
const SERVER_ASSIGNED_FIELDS: [&str; 2] = ["id", "admin_graphql_api_id"];

/// Reduce operator input to a bare shop domain.
///
/// Strips a leading `http://` or `https://` and one trailing slash.
#[must_use]
pub fn normalize_shop_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme
        .strip_suffix('/')
        .unwrap_or(without_scheme)
        .to_string()
}

/// Remove the fields of an exported collection that a create call rejects.
pub fn sanitize_payload(payload: &mut Map<String, Value>) {
    for field in SERVER_ASSIGNED_FIELDS {
        payload.remove(field);
    }
}

/// Client for the Shopify Admin REST API.
#[derive(Debug, Clone)]
pub struct AdminRestClient {
    client: Client,
    scheme: String,
    api_version: String,
}

impl AdminRestClient {
    /// Create a new Admin REST client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        Self {
            client: Client::new(),
            scheme: config.admin_scheme.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// The smart collections endpoint of a shop.
    #[must_use]
    pub fn smart_collections_endpoint(&self, shop: &str) -> String {
        format!(
            "{}://{shop}/admin/api/{}/smart_collections.json",
            self.scheme, self.api_version
        )
    }

    /// Create one smart collection.
    ///
    /// `payload` is sent as the `smart_collection` object after
    /// [`sanitize_payload`].
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Upstream` carrying the JSON-encoded `errors`
    /// field of the response, or the status reason when there is none.
    /// Returns `ShopifyError::Http` if the request could not be sent.
    #[instrument(skip(self, access_token, payload), fields(shop = %shop))]
    pub async fn create_smart_collection(
        &self,
        shop: &str,
        access_token: &SecretString,
        mut payload: Map<String, Value>,
    ) -> Result<(), ShopifyError> {
        sanitize_payload(&mut payload);
        let body = json!({ "smart_collection": payload });

        let response = self
            .client
            .post(self.smart_collections_endpoint(shop))
            .header("X-Shopify-Access-Token", access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Smart collection created");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(ShopifyError::Upstream {
            status: status.as_u16(),
            message: failure_message(&text, status),
        })
    }
}

/// Describe a failed create call the way the import report shows it.
fn failure_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("errors").cloned())
        .filter(|errors| !errors.is_null())
        .map_or_else(
            || {
                status
                    .canonical_reason()
                    .map_or_else(|| status.as_u16().to_string(), str::to_string)
            },
            |errors| errors.to_string(),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_normalize_shop_domain() {
        assert_eq!(normalize_shop_domain("https://demo.myshopify.com/"), "demo.myshopify.com");
        assert_eq!(normalize_shop_domain("http://demo.myshopify.com"), "demo.myshopify.com");
        assert_eq!(normalize_shop_domain("demo.myshopify.com"), "demo.myshopify.com");
    }

    #[test]
    fn test_sanitize_payload_removes_server_fields() {
        let mut payload = json!({
            "id": 42,
            "admin_graphql_api_id": "gid://shopify/Collection/42",
            "handle": "summer",
            "title": "Summer"
        })
        .as_object()
        .cloned()
        .unwrap();
        sanitize_payload(&mut payload);
        assert_eq!(payload.len(), 2);
        assert!(payload.contains_key("handle"));
        assert!(!payload.contains_key("id"));
    }

    #[test]
    fn test_endpoint_uses_scheme_and_version() {
        let client = AdminRestClient::new(&ShopifyConfig::default());
        assert_eq!(
            client.smart_collections_endpoint("demo.myshopify.com"),
            "https://demo.myshopify.com/admin/api/2023-10/smart_collections.json"
        );
    }

    #[test]
    fn test_failure_message_prefers_errors_field() {
        let message = failure_message(
            r#"{"errors":{"handle":["has already been taken"]}}"#,
            StatusCode::UNPROCESSABLE_ENTITY,
        );
        assert_eq!(message, r#"{"handle":["has already been taken"]}"#);
    }

    #[test]
    fn test_failure_message_falls_back_to_reason() {
        assert_eq!(failure_message("", StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(
            failure_message(r#"{"message":"nope"}"#, StatusCode::UNAUTHORIZED),
            "Unauthorized"
        );
    }
}
