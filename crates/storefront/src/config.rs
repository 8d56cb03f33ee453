//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ESHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `ESHOP_PORT` - Listen port (default: 3000)
//! - `ESHOP_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `ESHOP_API_BASE_URL` - Origin of the upstream REST API
//!   (default: <https://dev-project-ecommerce.upgrad.dev>)
//! - `ESHOP_API_TIMEOUT_SECS` - Upstream request timeout (default: 10)
//! - `ESHOP_AUTH_RECHECK_SECS` - How long a verified session is trusted before
//!   the token is re-checked against the API (default: 300)
//! - `ESHOP_AUTH_RATE_PER_SECOND` - Seconds per replenished login/signup attempt (default: 6)
//! - `ESHOP_AUTH_RATE_BURST` - Login/signup burst size (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default upstream REST API origin.
pub const DEFAULT_API_BASE_URL: &str = "https://dev-project-ecommerce.upgrad.dev";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Upstream REST API configuration
    pub api: ApiConfig,
    /// Session verification and rate limiting
    pub auth: AuthConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Upstream REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origin all `/api/...` paths are resolved against
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Session verification and login throttling.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Interval after which a stored token is re-verified with the API
    pub recheck_interval: Duration,
    /// Seconds between replenished login/signup attempts per client IP
    pub rate_per_second: u64,
    /// Login/signup burst size per client IP
    pub rate_burst: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            recheck_interval: Duration::from_secs(300),
            rate_per_second: 6,
            rate_burst: 5,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parse_or("ESHOP_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("ESHOP_PORT", 3000_u16)?;
        let base_url = env.or_default("ESHOP_BASE_URL", "http://localhost:3000");

        let api = ApiConfig {
            base_url: env.url_or("ESHOP_API_BASE_URL", DEFAULT_API_BASE_URL)?,
            timeout: Duration::from_secs(env.parse_or("ESHOP_API_TIMEOUT_SECS", 10_u64)?),
        };

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            recheck_interval: Duration::from_secs(env.parse_or(
                "ESHOP_AUTH_RECHECK_SECS",
                defaults.recheck_interval.as_secs(),
            )?),
            rate_per_second: env
                .parse_or("ESHOP_AUTH_RATE_PER_SECOND", defaults.rate_per_second)?
                .max(1),
            rate_burst: env
                .parse_or("ESHOP_AUTH_RATE_BURST", defaults.rate_burst)?
                .max(1),
        };

        Ok(Self {
            host,
            port,
            base_url,
            api,
            auth,
            sentry_dsn: env.optional("SENTRY_DSN").map(SecretString::from),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source wrapper with typed accessors.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse an absolute http(s) URL.
    fn url_or(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let raw = self.or_default(key, default);
        let url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(url)
    }
}
