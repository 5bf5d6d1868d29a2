//! Post-checkout want-list reconciliation.
//!
//! After an order is confirmed, entries matching the purchased lines are
//! removed from the account's want-list so the customer is not re-notified
//! about items they already own. Runs as a post-commit task, independent of
//! the read path; a failure here never fails order confirmation.

use std::sync::Arc;

use serde::Deserialize;
use spindle_core::{AccountId, ProductId, VariantId};
use tracing::{debug, warn};

use crate::commerce::WantlistStore;
use crate::commerce::types::WantlistEntry;

/// One purchased line of a confirmed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
}

/// Removes purchased items from the want-list.
#[derive(Clone)]
pub struct WantlistReconciler {
    store: Arc<dyn WantlistStore>,
}

impl WantlistReconciler {
    #[must_use]
    pub fn new(store: Arc<dyn WantlistStore>) -> Self {
        Self { store }
    }

    /// Reconcile an account's want-list against a confirmed order.
    ///
    /// Each matching entry is deleted individually; one failed deletion is
    /// logged and skipped without blocking the others. Re-running against an
    /// already-cleaned want-list is a no-op. Returns the number of entries
    /// removed.
    pub async fn reconcile(&self, account: &AccountId, lines: &[OrderLine]) -> usize {
        let entries = match self.store.list(account).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(%account, error = %e, "failed to load want-list, skipping reconciliation");
                return 0;
            }
        };

        if entries.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for entry in &entries {
            if !lines.iter().any(|line| line_matches(entry, line)) {
                continue;
            }
            match self.store.remove(account, entry).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(
                        %account,
                        entry = %entry.id,
                        error = %e,
                        "failed to remove want-list entry"
                    );
                }
            }
        }

        if removed > 0 {
            debug!(%account, removed, "want-list reconciled");
        }
        removed
    }

    /// Queue reconciliation as a post-commit task.
    ///
    /// Called after the order transaction has already succeeded; the task
    /// owns its inputs and reports only through logs.
    pub fn spawn(&self, account: AccountId, lines: Vec<OrderLine>) {
        let reconciler = self.clone();
        tokio::spawn(async move {
            reconciler.reconcile(&account, &lines).await;
        });
    }
}

/// An order line clears a want-list entry when the product ids match and,
/// if both sides name a variant, the variant ids match too. A missing
/// variant on either side means "any variant".
fn line_matches(entry: &WantlistEntry, line: &OrderLine) -> bool {
    if entry.product_id != line.product_id {
        return false;
    }
    match (&entry.variant_id, &line.variant_id) {
        (Some(wanted), Some(bought)) => wanted == bought,
        _ => true,
    }
}
