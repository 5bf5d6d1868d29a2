//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_API_URL` - Shop backend base URL (catalog, attributes, want-lists)
//! - `SHOP_API_TOKEN` - Shop backend access token
//! - `ARCHIVE_API_URL` - Curated archive backend base URL (artist listings)
//! - `ARCHIVE_API_TOKEN` - Curated archive backend access token
//! - `PAGE_CACHE_URL` - Rendered-page cache purge endpoint base URL
//! - `REVALIDATE_SECRET` - Shared secret for the invalidation webhook
//!   (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SPINDLE_HOST` - Bind address (default: 127.0.0.1)
//! - `SPINDLE_PORT` - Listen port (default: 3000)
//! - `PAGE_CACHE_TOKEN` - Bearer token for the purge endpoint
//! - `REVALIDATE_ATTRIBUTE_SCOPE` - none|handle|all (default: none);
//!   whether the invalidation webhook also evicts the attribute cache
//! - `ARCHIVE_ARTIST_PRIMARY_ONLY` - true|false (default: true); constrain
//!   artist pages to primary-artist products
//! - `COMMERCE_TIMEOUT_SECS` - Outbound HTTP timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::catalog::revalidate::AttributeEvictionScope;

const MIN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shop backend (format/tag catalog, attribute batches, want-lists)
    pub shop: BackendConfig,
    /// Curated archive backend (artist listings)
    pub archive: BackendConfig,
    /// Rendered-page cache purge endpoint
    pub page_cache: PageCacheConfig,
    /// Invalidation webhook settings
    pub revalidate: RevalidateConfig,
    /// Constrain artist pages to primary-artist products
    pub artist_primary_only: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// One commerce backend endpoint.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL, with a trailing slash so joins append path segments
    pub base_url: Url,
    /// Bearer access token
    pub access_token: SecretString,
    /// Outbound request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Rendered-page cache purge endpoint.
#[derive(Clone)]
pub struct PageCacheConfig {
    pub base_url: Url,
    /// Bearer token, if the purge endpoint requires one
    pub access_token: Option<SecretString>,
    pub timeout: Duration,
}

impl std::fmt::Debug for PageCacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCacheConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Invalidation webhook settings.
#[derive(Clone)]
pub struct RevalidateConfig {
    /// Shared secret presented in the `x-revalidate-secret` header
    pub secret: SecretString,
    /// Whether invalidation also evicts the attribute cache
    pub attribute_scope: AttributeEvictionScope,
}

impl std::fmt::Debug for RevalidateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevalidateConfig")
            .field("secret", &"[REDACTED]")
            .field("attribute_scope", &self.attribute_scope)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SPINDLE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SPINDLE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SPINDLE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SPINDLE_PORT".to_string(), e.to_string()))?;

        let timeout_secs = get_env_or_default("COMMERCE_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("COMMERCE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let timeout = Duration::from_secs(timeout_secs);

        let shop = BackendConfig {
            base_url: get_base_url("SHOP_API_URL")?,
            access_token: get_validated_secret("SHOP_API_TOKEN")?,
            timeout,
        };
        let archive = BackendConfig {
            base_url: get_base_url("ARCHIVE_API_URL")?,
            access_token: get_validated_secret("ARCHIVE_API_TOKEN")?,
            timeout,
        };
        let page_cache = PageCacheConfig {
            base_url: get_base_url("PAGE_CACHE_URL")?,
            access_token: get_optional_env("PAGE_CACHE_TOKEN").map(SecretString::from),
            timeout,
        };

        let secret = get_validated_secret("REVALIDATE_SECRET")?;
        validate_secret_length(&secret, "REVALIDATE_SECRET")?;
        let attribute_scope = get_env_or_default("REVALIDATE_ATTRIBUTE_SCOPE", "none")
            .parse::<AttributeEvictionScope>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("REVALIDATE_ATTRIBUTE_SCOPE".to_string(), e)
            })?;
        let revalidate = RevalidateConfig {
            secret,
            attribute_scope,
        };

        let artist_primary_only = get_env_or_default("ARCHIVE_ARTIST_PRIMARY_ONLY", "true")
            .parse::<bool>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ARCHIVE_ARTIST_PRIMARY_ONLY".to_string(), e.to_string())
            })?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            shop,
            archive,
            page_cache,
            revalidate,
            artist_primary_only,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a backend base URL, normalizing to a trailing slash so that
/// `Url::join` appends instead of replacing the last path segment.
fn get_base_url(key: &str) -> Result<Url, ConfigError> {
    let mut raw = get_required_env(key)?;
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real tokens and webhook secrets have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
