//! Order-confirmation webhook.
//!
//! The order transaction has already committed on the backend by the time
//! this fires; the handler only queues the post-commit side effect (want-
//! list reconciliation) and acknowledges. A reconciliation failure is never
//! surfaced to the order flow.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{Value, json};
use spindle_core::AccountId;
use tracing::instrument;

use crate::catalog::OrderLine;
use crate::error::AppError;
use crate::state::AppState;

use super::revalidate::presented_secret;

/// A confirmed order: the account and the full set of purchased lines.
#[derive(Debug, Deserialize)]
pub struct OrderConfirmation {
    pub account: AccountId,
    pub lines: Vec<OrderLine>,
}

/// Queue want-list reconciliation for a confirmed order.
#[instrument(skip(state, headers, order), fields(account = %order.account))]
pub async fn confirmed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(order): Json<OrderConfirmation>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let secret = presented_secret(&headers)?;
    state.gateway().authorize(secret)?;

    state.reconciler().spawn(order.account, order.lines);

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "queued" }))))
}
