//! Domain types for the commerce backends.
//!
//! These types double as the JSON wire shapes the backends speak; the
//! backends are serde-compatible with them directly, so there is no separate
//! conversion layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use spindle_core::{Handle, ProductId, VariantId};

// =============================================================================
// Money
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

// =============================================================================
// Products
// =============================================================================

/// A catalog product as returned by a backend search.
///
/// Only the fields the listing layer needs; auxiliary attributes (stock,
/// formats, display artist name) are fetched out-of-band per handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable handle addressing the product across caches and backends.
    pub handle: Handle,
    /// Release title.
    pub title: String,
    /// Price of the cheapest variant, if the backend exposes one.
    pub price: Option<Money>,
    /// Primary listing image URL.
    pub image_url: Option<String>,
}

/// One page of products plus pagination metadata, as a backend reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_count: u64,
    pub has_next_page: bool,
}

// =============================================================================
// Catalog queries
// =============================================================================

/// A single backend catalog search, fully resolved.
///
/// The archive resolver builds one of these per request; the backend executes
/// it as-is. `filter` uses the backend's `field:"value"` search syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    /// Search filter expression, e.g. `tag:"ambient"`.
    pub filter: String,
    /// Constrain artist listings to the curated subset (products catalogued
    /// under the artist as primary, not merely tagged with them).
    pub primary_only: bool,
    /// Backend sort field.
    pub sort: &'static str,
    /// Reverse the sort direction.
    pub reverse: bool,
    /// 1-indexed page number.
    pub page: u32,
    /// Page size; fixed per archive type, never client-controlled.
    pub per_page: u32,
}

// =============================================================================
// Attributes
// =============================================================================

/// One category of auxiliary, slower-changing product data fetched
/// separately from the core catalog record.
///
/// Each class has an independent cache namespace and an independent batch
/// endpoint on the shop backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeClass {
    /// Boolean in-stock flag.
    Stock,
    /// Ordered list of physical formats (e.g. `["LP", "CD"]`).
    Formats,
    /// Display artist name.
    ArtistName,
}

impl AttributeClass {
    /// Batch endpoint path on the shop backend.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Stock => "products/stock",
            Self::Formats => "products/formats",
            Self::ArtistName => "products/artist-name",
        }
    }
}

impl std::fmt::Display for AttributeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stock => "stock",
            Self::Formats => "formats",
            Self::ArtistName => "artist-name",
        };
        write!(f, "{name}")
    }
}

/// An attribute value for one product handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// In-stock flag (`AttributeClass::Stock`).
    Stock(bool),
    /// Physical format list (`AttributeClass::Formats`).
    Formats(Vec<String>),
    /// Display artist name (`AttributeClass::ArtistName`).
    ArtistName(String),
}

/// Wire shape of a batch attribute request.
#[derive(Debug, Serialize)]
pub struct AttributeBatchRequest<'a> {
    pub handles: &'a [Handle],
}

/// Wire shape of a batch attribute response.
///
/// Handles absent from `values` are "backend has no value".
#[derive(Debug, Deserialize)]
pub struct AttributeBatchResponse<V> {
    pub values: HashMap<Handle, V>,
}

// =============================================================================
// Want-list
// =============================================================================

/// A want-list entry owned by the account subsystem.
///
/// `variant_id` is optional; absence means "any variant of the product".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantlistEntry {
    /// Store-side entry id, used for the per-entry delete call.
    pub id: String,
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_class_endpoints() {
        assert_eq!(AttributeClass::Stock.endpoint(), "products/stock");
        assert_eq!(AttributeClass::Formats.endpoint(), "products/formats");
        assert_eq!(
            AttributeClass::ArtistName.endpoint(),
            "products/artist-name"
        );
    }

    #[test]
    fn test_attribute_value_untagged_serde() {
        let value: AttributeValue = serde_json::from_str("true").expect("stock");
        assert_eq!(value, AttributeValue::Stock(true));

        let value: AttributeValue = serde_json::from_str(r#"["LP","CD"]"#).expect("formats");
        assert_eq!(
            value,
            AttributeValue::Formats(vec!["LP".to_string(), "CD".to_string()])
        );

        let value: AttributeValue = serde_json::from_str(r#""Alice Coltrane""#).expect("name");
        assert_eq!(value, AttributeValue::ArtistName("Alice Coltrane".to_string()));
    }

    #[test]
    fn test_wantlist_entry_optional_variant() {
        let json = r#"{"id":"w1","product_id":"p1"}"#;
        let entry: WantlistEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry.variant_id, None);

        let json = r#"{"id":"w2","product_id":"p1","variant_id":"v1"}"#;
        let entry: WantlistEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry.variant_id, Some(VariantId::new("v1")));
    }
}
