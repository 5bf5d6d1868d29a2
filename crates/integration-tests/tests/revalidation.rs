//! Invalidation gateway behavior, plus the webhook route end to end.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use spindle_core::Handle;
use spindle_integration_tests::fakes::{
    FakeAttributes, FakeCatalog, FakePageCache, FakeWantlist,
};
use spindle_integration_tests::{TEST_SECRET, test_config};
use spindle_storefront::catalog::{
    ArchiveResolver, AttributeCache, AttributeEvictionScope, InvalidationEvent,
    InvalidationGateway, InvalidationScope, WantlistReconciler,
};
use spindle_storefront::commerce::types::AttributeValue;
use spindle_storefront::routes;
use spindle_storefront::state::AppState;

fn gateway_with(
    pages: &Arc<FakePageCache>,
    scope: AttributeEvictionScope,
) -> (InvalidationGateway, AttributeCache, Arc<FakeAttributes>) {
    let mut values = HashMap::new();
    values.insert(Handle::new("blue-train-lp"), AttributeValue::Stock(true));
    let source = Arc::new(FakeAttributes::serving(values));
    let attributes = AttributeCache::new(source.clone());
    let gateway = InvalidationGateway::new(
        pages.clone(),
        attributes.clone(),
        SecretString::from(TEST_SECRET),
        scope,
    );
    (gateway, attributes, source)
}

fn product_event(handle: Option<&str>) -> InvalidationEvent {
    InvalidationEvent {
        scope: InvalidationScope::Product,
        handle: handle.map(Handle::new),
    }
}

#[tokio::test]
async fn product_scope_evicts_exactly_root_shop_and_product_path() {
    let pages = Arc::new(FakePageCache::new());
    let (gateway, _, _) = gateway_with(&pages, AttributeEvictionScope::None);

    let evicted = gateway
        .invalidate(TEST_SECRET, &product_event(Some("blue-train-lp")))
        .await
        .expect("authorized");

    assert_eq!(evicted, vec!["/", "/shop", "/products/blue-train-lp"]);
    assert_eq!(pages.purged(), evicted);
    // No archive-dimension path is ever evicted for a product change.
    assert!(!pages.purged().iter().any(|p| p.contains("archive")));
    assert_eq!(pages.purge_all_calls(), 0);
}

#[tokio::test]
async fn handleless_inventory_event_falls_back_to_coarse_paths() {
    let pages = Arc::new(FakePageCache::new());
    let (gateway, _, _) = gateway_with(&pages, AttributeEvictionScope::None);

    let event = InvalidationEvent {
        scope: InvalidationScope::Inventory,
        handle: None,
    };
    let evicted = gateway.invalidate(TEST_SECRET, &event).await.expect("authorized");

    assert_eq!(evicted, vec!["/", "/shop"]);
}

#[tokio::test]
async fn all_scope_purges_the_whole_tree() {
    let pages = Arc::new(FakePageCache::new());
    let (gateway, _, _) = gateway_with(&pages, AttributeEvictionScope::None);

    let event = InvalidationEvent {
        scope: InvalidationScope::All,
        handle: None,
    };
    let evicted = gateway.invalidate(TEST_SECRET, &event).await.expect("authorized");

    assert_eq!(evicted, vec!["/"]);
    assert_eq!(pages.purge_all_calls(), 1);
    assert!(pages.purged().is_empty());
}

#[tokio::test]
async fn wrong_secret_evicts_nothing() {
    let pages = Arc::new(FakePageCache::new());
    let (gateway, _, _) = gateway_with(&pages, AttributeEvictionScope::None);

    let result = gateway
        .invalidate("not-the-secret", &product_event(Some("blue-train-lp")))
        .await;

    assert!(result.is_err());
    assert!(pages.purged().is_empty());
    assert_eq!(pages.purge_all_calls(), 0);
}

#[tokio::test]
async fn attribute_cache_is_untouched_by_default() {
    let pages = Arc::new(FakePageCache::new());
    let (gateway, attributes, source) = gateway_with(&pages, AttributeEvictionScope::None);

    let handle = Handle::new("blue-train-lp");
    attributes.stock(std::slice::from_ref(&handle)).await;
    gateway
        .invalidate(TEST_SECRET, &product_event(Some("blue-train-lp")))
        .await
        .expect("authorized");
    attributes.stock(std::slice::from_ref(&handle)).await;

    // Still one backend call: the entry survived page invalidation.
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn handle_scope_evicts_the_named_handles_attributes() {
    let pages = Arc::new(FakePageCache::new());
    let (gateway, attributes, source) = gateway_with(&pages, AttributeEvictionScope::Handle);

    let handle = Handle::new("blue-train-lp");
    attributes.stock(std::slice::from_ref(&handle)).await;
    gateway
        .invalidate(TEST_SECRET, &product_event(Some("blue-train-lp")))
        .await
        .expect("authorized");
    attributes.stock(std::slice::from_ref(&handle)).await;

    assert_eq!(source.call_count(), 2);
}

// =============================================================================
// Route-level tests
// =============================================================================

fn test_app(pages: Arc<FakePageCache>) -> axum::Router {
    let (gateway, attributes, _) = gateway_with(&pages, AttributeEvictionScope::None);
    let resolver = ArchiveResolver::new(
        Arc::new(FakeCatalog::failing()),
        Arc::new(FakeCatalog::failing()),
        true,
    );
    let reconciler = WantlistReconciler::new(Arc::new(FakeWantlist::with_entries(vec![])));
    let state = AppState::from_parts(test_config(), resolver, attributes, gateway, reconciler);
    routes::routes().with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn revalidate_route_acknowledges_with_paths_and_timestamp() {
    let pages = Arc::new(FakePageCache::new());
    let app = test_app(pages.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/revalidate")
        .header("content-type", "application/json")
        .header("x-revalidate-secret", TEST_SECRET)
        .body(Body::from(
            r#"{"type":"product","handle":"blue-train-lp"}"#,
        ))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["revalidated"],
        serde_json::json!(["/", "/shop", "/products/blue-train-lp"])
    );
    assert!(body["timestamp"].is_i64());
    assert_eq!(pages.purged().len(), 3);
}

#[tokio::test]
async fn revalidate_route_rejects_a_bad_secret_with_json_error() {
    let pages = Arc::new(FakePageCache::new());
    let app = test_app(pages.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/revalidate")
        .header("content-type", "application/json")
        .header("x-revalidate-secret", "guessed")
        .body(Body::from(r#"{"type":"all"}"#))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert!(pages.purged().is_empty());
    assert_eq!(pages.purge_all_calls(), 0);
}

#[tokio::test]
async fn revalidate_route_rejects_a_missing_secret_header() {
    let pages = Arc::new(FakePageCache::new());
    let app = test_app(pages);

    let request = Request::builder()
        .method("POST")
        .uri("/api/revalidate")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"type":"all"}"#))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_archive_dimension_is_a_404() {
    let pages = Arc::new(FakePageCache::new());
    let app = test_app(pages);

    let request = Request::builder()
        .method("GET")
        .uri("/api/archive/genre/jazz")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
