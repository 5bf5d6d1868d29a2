//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{
    ArchiveResolver, AttributeCache, InvalidationGateway, WantlistReconciler,
};
use crate::commerce::{
    CommerceError, HttpAttributeSource, HttpCatalogSource, HttpPageCache, HttpWantlistStore,
    PageCache, WantlistStore,
};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Every component is
/// constructed exactly once here and injected; there are no module-level
/// singletons.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    archive: ArchiveResolver,
    attributes: AttributeCache,
    gateway: InvalidationGateway,
    reconciler: WantlistReconciler,
}

impl AppState {
    /// Create the application state with HTTP-backed components.
    ///
    /// # Errors
    ///
    /// Returns an error if any backend client fails to build (malformed
    /// token, unjoinable endpoint URL).
    pub fn new(config: StorefrontConfig) -> Result<Self, CommerceError> {
        let shop_catalog = Arc::new(HttpCatalogSource::new(&config.shop)?);
        let archive_catalog = Arc::new(HttpCatalogSource::new(&config.archive)?);
        let attribute_source = Arc::new(HttpAttributeSource::new(&config.shop)?);
        let wantlist: Arc<dyn WantlistStore> = Arc::new(HttpWantlistStore::new(&config.shop)?);
        let pages: Arc<dyn PageCache> = Arc::new(HttpPageCache::new(&config.page_cache)?);

        let attributes = AttributeCache::new(attribute_source);
        let archive = ArchiveResolver::new(
            shop_catalog,
            archive_catalog,
            config.artist_primary_only,
        );
        let gateway = InvalidationGateway::new(
            pages,
            attributes.clone(),
            config.revalidate.secret.clone(),
            config.revalidate.attribute_scope,
        );
        let reconciler = WantlistReconciler::new(wantlist);

        Ok(Self::from_parts(
            config, archive, attributes, gateway, reconciler,
        ))
    }

    /// Assemble state from prebuilt components (tests inject fakes here).
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        archive: ArchiveResolver,
        attributes: AttributeCache,
        gateway: InvalidationGateway,
        reconciler: WantlistReconciler,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                archive,
                attributes,
                gateway,
                reconciler,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the archive query resolver.
    #[must_use]
    pub fn archive(&self) -> &ArchiveResolver {
        &self.inner.archive
    }

    /// Get a reference to the attribute cache.
    #[must_use]
    pub fn attributes(&self) -> &AttributeCache {
        &self.inner.attributes
    }

    /// Get a reference to the invalidation gateway.
    #[must_use]
    pub fn gateway(&self) -> &InvalidationGateway {
        &self.inner.gateway
    }

    /// Get a reference to the want-list reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &WantlistReconciler {
        &self.inner.reconciler
    }
}
