//! Secret-authenticated rendered-page invalidation.
//!
//! Backend-side catalog changes arrive here asynchronously; the gateway
//! evicts the specific rendered paths affected rather than flushing the
//! whole cache. Archive-dimension pages (artist / format / tag) are
//! deliberately NOT evicted on product changes: a product change cannot
//! cheaply be mapped back to every archive page that might list it, so
//! those pages ride out their normal time-based expiry.

use std::str::FromStr;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use spindle_core::Handle;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, instrument};

use crate::commerce::{CommerceError, PageCache};

use super::attributes::AttributeCache;

/// Site root path, evicted on every change notification.
const ROOT_PATH: &str = "/";
/// Top-level shop listing path.
const SHOP_PATH: &str = "/shop";

/// Change notification scope, as carried on the webhook body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationScope {
    Product,
    Inventory,
    All,
}

/// An inbound change notification.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidationEvent {
    #[serde(rename = "type")]
    pub scope: InvalidationScope,
    #[serde(default)]
    pub handle: Option<Handle>,
}

/// Whether a change notification also evicts the attribute cache.
///
/// Attribute values are keyed by handle, not by path, and change at a slower
/// cadence than page content; whether page invalidation should touch them is
/// an open interpretation question, so it is configuration rather than a
/// silent assumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeEvictionScope {
    /// Never touch the attribute cache.
    #[default]
    None,
    /// Evict the named handle's entries; a scope-`all` event clears
    /// everything.
    Handle,
    /// Clear the whole attribute cache on any event.
    All,
}

impl FromStr for AttributeEvictionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "handle" => Ok(Self::Handle),
            "all" => Ok(Self::All),
            other => Err(format!("unknown attribute eviction scope: {other}")),
        }
    }
}

/// Errors surfaced by the gateway.
#[derive(Debug, Error)]
pub enum InvalidationError {
    /// Presented secret did not match; nothing was evicted.
    #[error("invalid revalidation secret")]
    Unauthorized,

    /// A purge instruction to the rendered-page cache failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

/// The invalidation gateway.
#[derive(Clone)]
pub struct InvalidationGateway {
    pages: Arc<dyn PageCache>,
    attributes: AttributeCache,
    secret: SecretString,
    attribute_scope: AttributeEvictionScope,
}

impl InvalidationGateway {
    #[must_use]
    pub fn new(
        pages: Arc<dyn PageCache>,
        attributes: AttributeCache,
        secret: SecretString,
        attribute_scope: AttributeEvictionScope,
    ) -> Self {
        Self {
            pages,
            attributes,
            secret,
            attribute_scope,
        }
    }

    /// Authenticate and apply a change notification.
    ///
    /// Returns the literal list of evicted paths, which may be empty.
    ///
    /// # Errors
    ///
    /// `Unauthorized` on a secret mismatch (no side effects), or the
    /// underlying purge failure.
    #[instrument(skip(self, presented_secret), fields(scope = ?event.scope))]
    pub async fn invalidate(
        &self,
        presented_secret: &str,
        event: &InvalidationEvent,
    ) -> Result<Vec<String>, InvalidationError> {
        self.authorize(presented_secret)?;

        let evicted = match event.scope {
            InvalidationScope::All => {
                self.pages.purge_all().await?;
                vec![ROOT_PATH.to_string()]
            }
            InvalidationScope::Product | InvalidationScope::Inventory => {
                let paths = Self::paths_for_product_change(event.handle.as_ref());
                for path in &paths {
                    self.pages.purge(path).await?;
                }
                paths
            }
        };

        self.evict_attributes(event);

        info!(evicted = evicted.len(), "rendered-page cache invalidated");
        Ok(evicted)
    }

    /// Paths evicted for a product or inventory change: the site root, the
    /// shop listing, and the product detail page when a handle is known.
    fn paths_for_product_change(handle: Option<&Handle>) -> Vec<String> {
        let mut paths = vec![ROOT_PATH.to_string(), SHOP_PATH.to_string()];
        if let Some(handle) = handle {
            paths.push(format!("/products/{handle}"));
        }
        paths
    }

    fn evict_attributes(&self, event: &InvalidationEvent) {
        match self.attribute_scope {
            AttributeEvictionScope::None => {}
            AttributeEvictionScope::Handle => match (event.scope, &event.handle) {
                (InvalidationScope::All, _) => self.attributes.invalidate_all(),
                (_, Some(handle)) => self.attributes.invalidate(handle),
                (_, None) => {}
            },
            AttributeEvictionScope::All => self.attributes.invalidate_all(),
        }
    }

    /// Timing-safe secret comparison.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the presented secret does not match.
    pub fn authorize(&self, presented: &str) -> Result<(), InvalidationError> {
        let expected = self.secret.expose_secret().as_bytes();
        if presented.as_bytes().ct_eq(expected).unwrap_u8() == 1 {
            Ok(())
        } else {
            Err(InvalidationError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_deserializes_lowercase() {
        let event: InvalidationEvent =
            serde_json::from_str(r#"{"type":"inventory","handle":"blue-train-lp"}"#)
                .expect("deserialize");
        assert_eq!(event.scope, InvalidationScope::Inventory);
        assert_eq!(event.handle, Some(Handle::new("blue-train-lp")));

        let event: InvalidationEvent = serde_json::from_str(r#"{"type":"all"}"#).expect("deserialize");
        assert_eq!(event.scope, InvalidationScope::All);
        assert_eq!(event.handle, None);
    }

    #[test]
    fn test_paths_for_product_change_with_handle() {
        let handle = Handle::new("blue-train-lp");
        let paths = InvalidationGateway::paths_for_product_change(Some(&handle));
        assert_eq!(paths, vec!["/", "/shop", "/products/blue-train-lp"]);
    }

    #[test]
    fn test_paths_for_product_change_without_handle() {
        let paths = InvalidationGateway::paths_for_product_change(None);
        assert_eq!(paths, vec!["/", "/shop"]);
    }

    #[test]
    fn test_attribute_eviction_scope_parse() {
        assert_eq!(
            "none".parse::<AttributeEvictionScope>().ok(),
            Some(AttributeEvictionScope::None)
        );
        assert_eq!(
            "handle".parse::<AttributeEvictionScope>().ok(),
            Some(AttributeEvictionScope::Handle)
        );
        assert_eq!(
            "all".parse::<AttributeEvictionScope>().ok(),
            Some(AttributeEvictionScope::All)
        );
        assert!("everything".parse::<AttributeEvictionScope>().is_err());
    }
}
