//! The catalog aggregation and invalidation layer.
//!
//! This is the part of the storefront that does real work: everything else
//! is rendering glue over the commerce backends. Four pieces:
//!
//! - [`attributes`] - per-handle attribute cache over batch fetches
//! - [`archive`] - archive listing resolution (artist / format / tag)
//! - [`revalidate`] - secret-authenticated rendered-page invalidation
//! - [`wantlist`] - post-checkout want-list reconciliation

pub mod archive;
pub mod attributes;
pub mod revalidate;
pub mod wantlist;

pub use archive::{ArchiveDimension, ArchivePage, ArchiveQuery, ArchiveResolver, SortKey};
pub use attributes::AttributeCache;
pub use revalidate::{
    AttributeEvictionScope, InvalidationEvent, InvalidationGateway, InvalidationScope,
};
pub use wantlist::{OrderLine, WantlistReconciler};
