//! Want-list reconciliation against a fake store.

use std::sync::Arc;

use spindle_core::{AccountId, ProductId, VariantId};
use spindle_integration_tests::fakes::FakeWantlist;
use spindle_storefront::catalog::{OrderLine, WantlistReconciler};
use spindle_storefront::commerce::types::WantlistEntry;

fn entry(id: &str, product: &str, variant: Option<&str>) -> WantlistEntry {
    WantlistEntry {
        id: id.to_string(),
        product_id: ProductId::new(product),
        variant_id: variant.map(VariantId::new),
    }
}

fn line(product: &str, variant: Option<&str>) -> OrderLine {
    OrderLine {
        product_id: ProductId::new(product),
        variant_id: variant.map(VariantId::new),
    }
}

fn account() -> AccountId {
    AccountId::new("acct-1")
}

#[tokio::test]
async fn purchase_removes_exact_and_any_variant_entries_only() {
    let store = Arc::new(FakeWantlist::with_entries(vec![
        entry("w1", "P1", Some("V1")),
        entry("w2", "P1", None),
        entry("w3", "P1", Some("V2")),
    ]));
    let reconciler = WantlistReconciler::new(store.clone());

    let removed = reconciler
        .reconcile(&account(), &[line("P1", Some("V1"))])
        .await;

    // V1 and the "any variant" entry go; the V2 entry stays.
    assert_eq!(removed, 2);
    let remaining = store.remaining();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "w3");
}

#[tokio::test]
async fn unrelated_products_are_untouched() {
    let store = Arc::new(FakeWantlist::with_entries(vec![
        entry("w1", "P1", None),
        entry("w2", "P2", None),
    ]));
    let reconciler = WantlistReconciler::new(store.clone());

    let removed = reconciler.reconcile(&account(), &[line("P9", None)]).await;

    assert_eq!(removed, 0);
    assert_eq!(store.remaining().len(), 2);
}

#[tokio::test]
async fn empty_wantlist_is_a_noop() {
    let store = Arc::new(FakeWantlist::with_entries(vec![]));
    let reconciler = WantlistReconciler::new(store.clone());

    let removed = reconciler
        .reconcile(&account(), &[line("P1", Some("V1"))])
        .await;

    assert_eq!(removed, 0);
    assert_eq!(store.list_calls(), 1);
}

#[tokio::test]
async fn reconciliation_is_idempotent() {
    let store = Arc::new(FakeWantlist::with_entries(vec![entry("w1", "P1", None)]));
    let reconciler = WantlistReconciler::new(store.clone());
    let lines = [line("P1", Some("V1"))];

    assert_eq!(reconciler.reconcile(&account(), &lines).await, 1);
    // A second run finds nothing left to match.
    assert_eq!(reconciler.reconcile(&account(), &lines).await, 0);
    assert!(store.remaining().is_empty());
}

#[tokio::test]
async fn one_failed_deletion_does_not_block_the_others() {
    let store = Arc::new(
        FakeWantlist::with_entries(vec![
            entry("w1", "P1", None),
            entry("w2", "P2", None),
            entry("w3", "P3", None),
        ])
        .failing_on(&["w2"]),
    );
    let reconciler = WantlistReconciler::new(store.clone());

    let removed = reconciler
        .reconcile(
            &account(),
            &[line("P1", None), line("P2", None), line("P3", None)],
        )
        .await;

    // w2's delete failed and was swallowed; w1 and w3 still went through.
    assert_eq!(removed, 2);
    let remaining = store.remaining();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "w2");
}
