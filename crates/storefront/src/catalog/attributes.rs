//! Per-handle attribute cache over batch fetches.
//!
//! Rendering a listing of 48 products must not fan out into 48 stock checks;
//! the cache exists to split a handle set into cached and uncached subsets
//! and issue exactly one batch request for the uncached remainder.
//!
//! Entries live for the process lifetime; once a handle is populated for a
//! class it is never re-fetched until explicitly invalidated. A successful
//! batch response writes an entry for every requested handle, recording
//! handles the backend did not answer for as known-absent, so a repeat call
//! never re-asks for them either.

use std::collections::HashMap;
use std::sync::Arc;

use moka::sync::Cache;
use spindle_core::Handle;
use tracing::{debug, warn};

use crate::commerce::AttributeSource;
use crate::commerce::types::{AttributeClass, AttributeValue};

/// Entries per class namespace.
const CACHE_CAPACITY: u64 = 10_000;

/// A cached attribute slot.
///
/// `Missing` records "asked, backend had nothing" and is distinct from a
/// handle that has never been asked about (absent from the cache entirely).
#[derive(Debug, Clone, PartialEq, Eq)]
enum CachedAttribute {
    Value(AttributeValue),
    Missing,
}

/// Process-wide attribute cache, one namespace per attribute class.
///
/// Constructed once and injected via [`crate::state::AppState`]; there is no
/// module-level singleton. Cloning is cheap and shares the same cache.
#[derive(Clone)]
pub struct AttributeCache {
    source: Arc<dyn AttributeSource>,
    stock: Cache<Handle, CachedAttribute>,
    formats: Cache<Handle, CachedAttribute>,
    artist_names: Cache<Handle, CachedAttribute>,
}

impl AttributeCache {
    /// Create a cache over the given batch fetch source.
    #[must_use]
    pub fn new(source: Arc<dyn AttributeSource>) -> Self {
        // No TTL: entries are valid until invalidation clears them.
        let build = || Cache::builder().max_capacity(CACHE_CAPACITY).build();
        Self {
            source,
            stock: build(),
            formats: build(),
            artist_names: build(),
        }
    }

    fn namespace(&self, class: AttributeClass) -> &Cache<Handle, CachedAttribute> {
        match class {
            AttributeClass::Stock => &self.stock,
            AttributeClass::Formats => &self.formats,
            AttributeClass::ArtistName => &self.artist_names,
        }
    }

    /// Resolve attribute values for a set of handles.
    ///
    /// Cached handles are served locally; the uncached remainder goes to the
    /// backend in a single batch request. On fetch failure the uncached
    /// handles are simply absent from the result and nothing is cached, so
    /// the next call retries naturally. Handles the backend has no value for
    /// are absent from the result but recorded, so they are not re-fetched.
    ///
    /// Concurrent overlapping calls may duplicate backend work for a handle
    /// that is still cold; duplicate fills write the same immutable value and
    /// are idempotent, so callers never observe a torn entry.
    pub async fn get(
        &self,
        class: AttributeClass,
        handles: &[Handle],
    ) -> HashMap<Handle, AttributeValue> {
        let cache = self.namespace(class);

        let mut resolved = HashMap::new();
        let mut uncached: Vec<Handle> = Vec::new();
        for handle in handles {
            if uncached.contains(handle) || resolved.contains_key(handle) {
                continue;
            }
            match cache.get(handle) {
                Some(CachedAttribute::Value(value)) => {
                    resolved.insert(handle.clone(), value);
                }
                // Known-absent: the backend was already asked and had nothing.
                Some(CachedAttribute::Missing) => {}
                None => uncached.push(handle.clone()),
            }
        }

        if uncached.is_empty() {
            return resolved;
        }

        debug!(%class, uncached = uncached.len(), "batch-fetching attributes");

        match self.source.fetch(class, &uncached).await {
            Ok(mut fetched) => {
                for handle in uncached {
                    match fetched.remove(&handle) {
                        Some(value) => {
                            cache.insert(handle.clone(), CachedAttribute::Value(value.clone()));
                            resolved.insert(handle, value);
                        }
                        None => cache.insert(handle, CachedAttribute::Missing),
                    }
                }
            }
            Err(e) => {
                // Degrade: the caller renders without these values and a
                // later call retries, because nothing was cached.
                warn!(%class, error = %e, "attribute batch fetch failed");
            }
        }

        resolved
    }

    /// Resolve in-stock flags for a set of handles.
    pub async fn stock(&self, handles: &[Handle]) -> HashMap<Handle, bool> {
        self.get(AttributeClass::Stock, handles)
            .await
            .into_iter()
            .filter_map(|(handle, value)| match value {
                AttributeValue::Stock(in_stock) => Some((handle, in_stock)),
                _ => None,
            })
            .collect()
    }

    /// Resolve physical format lists for a set of handles.
    pub async fn formats(&self, handles: &[Handle]) -> HashMap<Handle, Vec<String>> {
        self.get(AttributeClass::Formats, handles)
            .await
            .into_iter()
            .filter_map(|(handle, value)| match value {
                AttributeValue::Formats(formats) => Some((handle, formats)),
                _ => None,
            })
            .collect()
    }

    /// Resolve display artist names for a set of handles.
    pub async fn artist_names(&self, handles: &[Handle]) -> HashMap<Handle, String> {
        self.get(AttributeClass::ArtistName, handles)
            .await
            .into_iter()
            .filter_map(|(handle, value)| match value {
                AttributeValue::ArtistName(name) => Some((handle, name)),
                _ => None,
            })
            .collect()
    }

    /// Drop a handle's entries across every class namespace.
    pub fn invalidate(&self, handle: &Handle) {
        self.stock.invalidate(handle);
        self.formats.invalidate(handle);
        self.artist_names.invalidate(handle);
    }

    /// Drop every cached entry in every class namespace.
    pub fn invalidate_all(&self) {
        self.stock.invalidate_all();
        self.formats.invalidate_all();
        self.artist_names.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::commerce::CommerceError;

    use super::*;

    /// Fake source that serves a fixed map and records each batch it sees.
    struct RecordingSource {
        values: HashMap<Handle, AttributeValue>,
        batches: Mutex<Vec<Vec<Handle>>>,
        fail: bool,
    }

    impl RecordingSource {
        fn new(values: HashMap<Handle, AttributeValue>) -> Self {
            Self {
                values,
                batches: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                values: HashMap::new(),
                batches: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn batches(&self) -> Vec<Vec<Handle>> {
            self.batches.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl AttributeSource for RecordingSource {
        async fn fetch(
            &self,
            _class: AttributeClass,
            handles: &[Handle],
        ) -> Result<HashMap<Handle, AttributeValue>, CommerceError> {
            self.batches.lock().expect("lock").push(handles.to_vec());
            if self.fail {
                return Err(CommerceError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(handles
                .iter()
                .filter_map(|h| self.values.get(h).map(|v| (h.clone(), v.clone())))
                .collect())
        }
    }

    fn stock_values(pairs: &[(&str, bool)]) -> HashMap<Handle, AttributeValue> {
        pairs
            .iter()
            .map(|(h, v)| (Handle::new(*h), AttributeValue::Stock(*v)))
            .collect()
    }

    fn handles(names: &[&str]) -> Vec<Handle> {
        names.iter().map(|n| Handle::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_second_call_fetches_only_the_difference() {
        let source = Arc::new(RecordingSource::new(stock_values(&[
            ("a", true),
            ("b", false),
            ("c", true),
        ])));
        let cache = AttributeCache::new(source.clone());

        let first = cache.stock(&handles(&["a", "b"])).await;
        assert_eq!(first.len(), 2);

        let second = cache.stock(&handles(&["a", "b", "c"])).await;
        assert_eq!(second.len(), 3);

        let batches = source.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0], handles(&["a", "b"]));
        // Only c was still cold on the second call.
        assert_eq!(batches[1], handles(&["c"]));
    }

    #[tokio::test]
    async fn test_absent_handles_are_not_refetched() {
        let source = Arc::new(RecordingSource::new(stock_values(&[("a", true)])));
        let cache = AttributeCache::new(source.clone());

        let first = cache.stock(&handles(&["a", "ghost"])).await;
        assert_eq!(first.len(), 1);
        assert_eq!(first.get(&Handle::new("a")), Some(&true));

        // "ghost" was recorded as known-absent; no second fetch happens.
        let second = cache.stock(&handles(&["a", "ghost"])).await;
        assert_eq!(second.len(), 1);
        assert_eq!(source.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_caches_nothing_and_retries() {
        let source = Arc::new(RecordingSource::failing());
        let cache = AttributeCache::new(source.clone());

        let result = cache.stock(&handles(&["a"])).await;
        assert!(result.is_empty());

        // Nothing was cached, so the same call goes back to the backend.
        let result = cache.stock(&handles(&["a"])).await;
        assert!(result.is_empty());
        assert_eq!(source.batches().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_handles_collapse_into_one_request() {
        let source = Arc::new(RecordingSource::new(stock_values(&[("a", true)])));
        let cache = AttributeCache::new(source.clone());

        let result = cache.stock(&handles(&["a", "a", "a"])).await;
        assert_eq!(result.len(), 1);

        let batches = source.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], handles(&["a"]));
    }

    #[tokio::test]
    async fn test_invalidate_clears_every_namespace() {
        let source = Arc::new(RecordingSource::new(stock_values(&[("a", true)])));
        let cache = AttributeCache::new(source.clone());

        cache.stock(&handles(&["a"])).await;
        cache.invalidate(&Handle::new("a"));
        cache.stock(&handles(&["a"])).await;

        // The handle was re-fetched after invalidation.
        assert_eq!(source.batches().len(), 2);
    }

    #[tokio::test]
    async fn test_classes_are_independent_namespaces() {
        let source = Arc::new(RecordingSource::new(stock_values(&[("a", true)])));
        let cache = AttributeCache::new(source.clone());

        cache.stock(&handles(&["a"])).await;
        // Formats for the same handle is a separate namespace: a new fetch.
        cache.formats(&handles(&["a"])).await;

        assert_eq!(source.batches().len(), 2);
    }
}
