//! Outbound clients for the commerce backends.
//!
//! # Architecture
//!
//! - The backends are the source of truth - NO local sync, direct API calls
//! - Two catalog sources: the shop backend (format/tag listings, attribute
//!   batch lookups, want-lists) and the curated archive backend (artist
//!   listings)
//! - Every seam is a trait so the catalog layer can be exercised against
//!   in-memory fakes
//!
//! Nothing in this module caches; caching lives in [`crate::catalog`].

mod attributes;
mod catalog;
mod pages;
mod wantlist;

pub mod types;

pub use attributes::HttpAttributeSource;
pub use catalog::HttpCatalogSource;
pub use pages::HttpPageCache;
pub use wantlist::HttpWantlistStore;

use std::collections::HashMap;

use async_trait::async_trait;
use spindle_core::{AccountId, Handle};
use thiserror::Error;

use types::{AttributeClass, AttributeValue, CatalogQuery, ProductPage, WantlistEntry};

/// Errors that can occur when talking to a commerce backend.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The addressed entity does not exist on the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// A backend catalog source that can answer paginated product searches.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Execute a single catalog search and return one page of products.
    async fn product_page(&self, query: &CatalogQuery) -> Result<ProductPage, CommerceError>;
}

/// A backend that answers batch attribute lookups for one attribute class.
///
/// Absent handles in the returned map mean "backend has no value", not an
/// error.
#[async_trait]
pub trait AttributeSource: Send + Sync {
    async fn fetch(
        &self,
        class: AttributeClass,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, AttributeValue>, CommerceError>;
}

/// The external want-list store owned by the account subsystem.
///
/// This layer only reads and deletes entries, never creates them.
#[async_trait]
pub trait WantlistStore: Send + Sync {
    async fn list(&self, account: &AccountId) -> Result<Vec<WantlistEntry>, CommerceError>;

    async fn remove(
        &self,
        account: &AccountId,
        entry: &WantlistEntry,
    ) -> Result<(), CommerceError>;
}

/// The external rendered-page cache, invalidated selectively by path.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Evict a single rendered path.
    async fn purge(&self, path: &str) -> Result<(), CommerceError>;

    /// Evict every rendered path under the site root.
    async fn purge_all(&self) -> Result<(), CommerceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commerce_error_display() {
        let err = CommerceError::NotFound("blue-train-lp".to_string());
        assert_eq!(err.to_string(), "Not found: blue-train-lp");

        let err = CommerceError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CommerceError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
