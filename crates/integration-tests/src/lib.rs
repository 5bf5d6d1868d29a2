//! Integration tests for Spindle.
//!
//! The catalog layer talks to its backends through the seam traits in
//! `spindle_storefront::commerce`; this crate provides in-memory fakes for
//! each seam plus a canned configuration, so the tests in `tests/` exercise
//! the real components end to end without any network.
//!
//! # Test Categories
//!
//! - `attribute_cache` - cache split/batch/retry behavior and concurrency
//! - `archive` - archive resolution, pagination, degradation
//! - `revalidation` - webhook auth and eviction scopes
//! - `wantlist` - post-checkout reconciliation

pub mod fakes;

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use spindle_storefront::catalog::AttributeEvictionScope;
use spindle_storefront::config::{
    BackendConfig, PageCacheConfig, RevalidateConfig, StorefrontConfig,
};

/// The webhook secret every test harness uses.
pub const TEST_SECRET: &str = "kT9!vB2@xQ7#mW4$pL8%zR3^dF6&hJ1*";

/// A complete configuration with fake-friendly values; no env access.
///
/// # Panics
///
/// Panics on malformed hardcoded URLs, which would be a bug in this helper.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> StorefrontConfig {
    let timeout = Duration::from_secs(1);
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        shop: BackendConfig {
            base_url: Url::parse("http://shop.test/api/").unwrap(),
            access_token: SecretString::from("shop-token"),
            timeout,
        },
        archive: BackendConfig {
            base_url: Url::parse("http://archive.test/api/").unwrap(),
            access_token: SecretString::from("archive-token"),
            timeout,
        },
        page_cache: PageCacheConfig {
            base_url: Url::parse("http://cache.test/").unwrap(),
            access_token: None,
            timeout,
        },
        revalidate: RevalidateConfig {
            secret: SecretString::from(TEST_SECRET),
            attribute_scope: AttributeEvictionScope::None,
        },
        artist_primary_only: true,
        sentry_dsn: None,
    }
}
