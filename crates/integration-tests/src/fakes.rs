//! In-memory fakes for the commerce seam traits.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use spindle_core::{AccountId, Handle};

use spindle_storefront::commerce::types::{
    AttributeClass, AttributeValue, CatalogQuery, Product, ProductPage, WantlistEntry,
};
use spindle_storefront::commerce::{
    AttributeSource, CatalogSource, CommerceError, PageCache, WantlistStore,
};

fn backend_down() -> CommerceError {
    CommerceError::Api {
        status: 503,
        message: "backend down".to_string(),
    }
}

/// Build a minimal product for listing assertions.
#[must_use]
pub fn product(handle: &str, title: &str) -> Product {
    Product {
        handle: Handle::new(handle),
        title: title.to_string(),
        price: None,
        image_url: None,
    }
}

// =============================================================================
// Catalog
// =============================================================================

enum CatalogBehavior {
    Respond(ProductPage),
    NotFound,
    Fail,
}

/// Catalog fake that serves a fixed page and records every query it sees.
pub struct FakeCatalog {
    behavior: CatalogBehavior,
    queries: Mutex<Vec<CatalogQuery>>,
}

impl FakeCatalog {
    #[must_use]
    pub fn serving(page: ProductPage) -> Self {
        Self {
            behavior: CatalogBehavior::Respond(page),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Backend that has never heard of the requested entity.
    #[must_use]
    pub fn unknown_slug() -> Self {
        Self {
            behavior: CatalogBehavior::NotFound,
            queries: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            behavior: CatalogBehavior::Fail,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every query this fake has executed, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn queries(&self) -> Vec<CatalogQuery> {
        self.queries.lock().expect("lock").clone()
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn product_page(&self, query: &CatalogQuery) -> Result<ProductPage, CommerceError> {
        self.queries.lock().expect("lock").push(query.clone());
        match &self.behavior {
            CatalogBehavior::Respond(page) => Ok(page.clone()),
            CatalogBehavior::NotFound => Err(CommerceError::NotFound(query.filter.clone())),
            CatalogBehavior::Fail => Err(backend_down()),
        }
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Attribute fake serving a fixed per-handle map, recording each batch.
///
/// An optional artificial delay widens race windows for concurrency tests.
pub struct FakeAttributes {
    values: HashMap<Handle, AttributeValue>,
    batches: Mutex<Vec<(AttributeClass, Vec<Handle>)>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    fail: bool,
}

impl FakeAttributes {
    #[must_use]
    pub fn serving(values: HashMap<Handle, AttributeValue>) -> Self {
        Self {
            values,
            batches: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            values: HashMap::new(),
            batches: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
            fail: true,
        }
    }

    /// Delay each fetch, so concurrent callers overlap deterministically.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of batch fetches issued.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every batch this fake has served, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn batches(&self) -> Vec<(AttributeClass, Vec<Handle>)> {
        self.batches.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AttributeSource for FakeAttributes {
    async fn fetch(
        &self,
        class: AttributeClass,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, AttributeValue>, CommerceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .expect("lock")
            .push((class, handles.to_vec()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(backend_down());
        }

        Ok(handles
            .iter()
            .filter_map(|h| self.values.get(h).map(|v| (h.clone(), v.clone())))
            .collect())
    }
}

// =============================================================================
// Want-list
// =============================================================================

/// Want-list fake over a mutable entry list, with injectable delete failures.
pub struct FakeWantlist {
    entries: Mutex<Vec<WantlistEntry>>,
    failing_ids: HashSet<String>,
    list_calls: AtomicUsize,
}

impl FakeWantlist {
    #[must_use]
    pub fn with_entries(entries: Vec<WantlistEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            failing_ids: HashSet::new(),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Make deletes of the given entry ids fail.
    #[must_use]
    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.failing_ids = ids.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Entries still on the want-list.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn remaining(&self) -> Vec<WantlistEntry> {
        self.entries.lock().expect("lock").clone()
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WantlistStore for FakeWantlist {
    async fn list(&self, _account: &AccountId) -> Result<Vec<WantlistEntry>, CommerceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().expect("lock").clone())
    }

    async fn remove(
        &self,
        _account: &AccountId,
        entry: &WantlistEntry,
    ) -> Result<(), CommerceError> {
        if self.failing_ids.contains(&entry.id) {
            return Err(backend_down());
        }
        self.entries.lock().expect("lock").retain(|e| e.id != entry.id);
        Ok(())
    }
}

// =============================================================================
// Rendered-page cache
// =============================================================================

/// Page-cache fake recording purge instructions.
#[derive(Default)]
pub struct FakePageCache {
    purged: Mutex<Vec<String>>,
    purge_all_calls: AtomicUsize,
}

impl FakePageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths purged, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn purged(&self) -> Vec<String> {
        self.purged.lock().expect("lock").clone()
    }

    #[must_use]
    pub fn purge_all_calls(&self) -> usize {
        self.purge_all_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageCache for FakePageCache {
    async fn purge(&self, path: &str) -> Result<(), CommerceError> {
        self.purged.lock().expect("lock").push(path.to_string());
        Ok(())
    }

    async fn purge_all(&self) -> Result<(), CommerceError> {
        self.purge_all_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
