//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! ## Server
//! - `CONSOLE_HOST` - Bind address (default: 127.0.0.1)
//! - `CONSOLE_PORT` - Listen port (default: 3002)
//! - `CORS_ALLOWED_ORIGIN` - Origin allowed to call the API from a browser
//! - `MAX_UPLOAD_MB` - Request body limit for uploads (default: 50)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//!
//! ## Shopify
//! - `SHOPIFY_API_VERSION` - Admin REST API version (default: 2023-10)
//! - `SHOPIFY_ADMIN_SCHEME` - `https` or `http` for Admin API calls (default: https)
//! - `IMPORT_DELAY_MS` - Delay between import requests (default: 500)
//!
//! ## Sentry
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Environment name reported to Sentry
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2023-10";
const DEFAULT_IMPORT_DELAY_MS: u64 = 500;
const DEFAULT_MAX_UPLOAD_MB: usize = 50;
const BYTES_PER_MB: usize = 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Console application configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origin allowed by CORS, if browser access is enabled
    pub cors_allowed_origin: Option<String>,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
    /// Log output format
    pub log_format: LogFormat,
    /// Shopify API configuration
    pub shopify: ShopifyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify API settings.
///
/// Shop domains and access tokens are supplied per request, so nothing here
/// is secret.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Admin REST API version used for imports (e.g., 2023-10)
    pub api_version: String,
    /// Scheme used to reach the Admin API (`https` outside of tests)
    pub admin_scheme: String,
    /// Delay between consecutive import requests
    pub import_delay: Duration,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            admin_scheme: "https".to_string(),
            import_delay: Duration::from_millis(DEFAULT_IMPORT_DELAY_MS),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3002,
            cors_allowed_origin: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * BYTES_PER_MB,
            log_format: LogFormat::default(),
            shopify: ShopifyConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .or_default("CONSOLE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONSOLE_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("CONSOLE_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONSOLE_PORT".to_string(), e.to_string()))?;
        let max_upload_mb = env
            .or_default("MAX_UPLOAD_MB", &DEFAULT_MAX_UPLOAD_MB.to_string())
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar("MAX_UPLOAD_MB".to_string(), e.to_string()))?;
        let log_format = match env.or_default("LOG_FORMAT", "text").as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected 'text' or 'json', got '{other}'"),
                ));
            }
        };

        let shopify = ShopifyConfig::from_env(&env)?;
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            cors_allowed_origin: env.optional("CORS_ALLOWED_ORIGIN"),
            max_upload_bytes: max_upload_mb.saturating_mul(BYTES_PER_MB),
            log_format,
            shopify,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_scheme = env.or_default("SHOPIFY_ADMIN_SCHEME", "https");
        if admin_scheme != "https" && admin_scheme != "http" {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_ADMIN_SCHEME".to_string(),
                format!("expected 'https' or 'http', got '{admin_scheme}'"),
            ));
        }
        let delay_ms = env
            .or_default("IMPORT_DELAY_MS", &DEFAULT_IMPORT_DELAY_MS.to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar("IMPORT_DELAY_MS".to_string(), e.to_string()))?;

        Ok(Self {
            api_version: env.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            admin_scheme,
            import_delay: Duration::from_millis(delay_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment variable lookup.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}
