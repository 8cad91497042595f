//! Plooma configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PLOOMA_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PLOOMA_BASE_URL` - Public URL of the site; an `https` URL turns on secure cookies
//!
//! ## Optional
//! - `PLOOMA_HOST` - Bind address (default: 127.0.0.1)
//! - `PLOOMA_PORT` - Listen port (default: 3000)
//! - `PLOOMA_ALLOW_ADMIN_SIGNUP` - Offer the admin role on the sign-up form (default: true)
//! - `PLOOMA_LOG_FORMAT` - `text` or `json` (default: text)
//! - `PLOOMA_TRUST_PROXY_HEADERS` - Key rate limits on the right-most
//!   `X-Forwarded-For` hop instead of the peer address (default: false)
//! - `PLOOMA_AUTH_RATE_BURST` - Sign-in and sign-up attempts allowed per
//!   client before throttling (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Plooma application configuration.
#[derive(Debug, Clone)]
pub struct PloomaConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Whether the sign-up form offers the admin role
    pub allow_admin_signup: bool,
    pub log_format: LogFormat,
    /// Whether the server sits behind a proxy that sets `X-Forwarded-For`
    pub trust_proxy_headers: bool,
    /// Burst size of each auth rate limit bucket
    pub auth_rate_burst: NonZeroU32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl PloomaConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("PLOOMA_DATABASE_URL")?;
        let host = parse_env("PLOOMA_HOST", "127.0.0.1")?;
        let port = parse_env("PLOOMA_PORT", "3000")?;
        let base_url = validate_base_url("PLOOMA_BASE_URL", &get_required_env("PLOOMA_BASE_URL")?)?;
        let allow_admin_signup = parse_bool("PLOOMA_ALLOW_ADMIN_SIGNUP", true)?;
        let log_format = parse_env("PLOOMA_LOG_FORMAT", "text")?;
        let trust_proxy_headers = parse_bool("PLOOMA_TRUST_PROXY_HEADERS", false)?;
        let auth_rate_burst = parse_env("PLOOMA_AUTH_RATE_BURST", "5")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            allow_admin_signup,
            log_format,
            trust_proxy_headers,
            auth_rate_burst,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match get_optional_env(key) {
        None => Ok(default),
        Some(value) => parse_bool_value(&value)
            .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), value.clone())),
    }
}

fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Require an absolute http(s) URL and strip the trailing slash.
fn validate_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Config for tests that never touch the environment.
    pub(crate) fn test_config() -> PloomaConfig {
        PloomaConfig {
            database_url: SecretString::from("postgres://localhost/plooma_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            allow_admin_signup: true,
            log_format: LogFormat::Text,
            trust_proxy_headers: false,
            auth_rate_burst: NonZeroU32::new(5).unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_https() {
        let mut config = test_config();
        assert!(!config.is_https());
        config.base_url = "https://plooma.example".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_validate_base_url_strips_trailing_slash() {
        let url = validate_base_url("X", "https://plooma.example/").unwrap();
        assert_eq!(url, "https://plooma.example");
    }

    #[test]
    fn test_validate_base_url_rejects_garbage() {
        assert!(matches!(
            validate_base_url("X", "not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(validate_base_url("X", "ftp://plooma.example").is_err());
    }

    #[test]
    fn test_parse_bool_value() {
        assert_eq!(parse_bool_value("TRUE"), Some(true));
        assert_eq!(parse_bool_value("off"), Some(false));
        assert_eq!(parse_bool_value("maybe"), None);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_auth_rate_burst_must_be_positive() {
        assert!("0".parse::<NonZeroU32>().is_err());
        assert_eq!("50".parse::<NonZeroU32>().unwrap().get(), 50);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug_output = format!("{:?}", test_config());
        assert!(!debug_output.contains("plooma_test"));
    }
}
