//! Rendered-page cache invalidation webhook.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use crate::catalog::InvalidationEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared webhook secret.
pub const REVALIDATE_SECRET_HEADER: &str = "x-revalidate-secret";

/// Acknowledgement listing what was evicted.
#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub revalidated: Vec<String>,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

/// Extract the webhook secret header, if present and valid UTF-8.
pub(crate) fn presented_secret(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(REVALIDATE_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing revalidation secret".to_string()))
}

/// Apply a change notification from a commerce backend.
#[instrument(skip(state, headers, event))]
pub async fn revalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<InvalidationEvent>,
) -> Result<Json<RevalidateResponse>, AppError> {
    let secret = presented_secret(&headers)?;
    let revalidated = state.gateway().invalidate(secret, &event).await?;

    Ok(Json(RevalidateResponse {
        revalidated,
        timestamp: Utc::now().timestamp_millis(),
    }))
}
