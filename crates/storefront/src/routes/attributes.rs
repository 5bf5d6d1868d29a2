//! Batch attribute lookup route handlers.
//!
//! Each endpoint accepts a handle list and returns whatever values are
//! known; handles with no value (backend had nothing, or the batch fetch
//! failed) are simply absent from the response. These never error: a
//! degraded lookup renders as a missing badge, not a failed page.

use std::collections::HashMap;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use spindle_core::Handle;
use tracing::instrument;

use crate::state::AppState;

/// A batch lookup request.
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub handles: Vec<Handle>,
}

/// A batch lookup response.
#[derive(Debug, Serialize)]
pub struct LookupResponse<V> {
    pub values: HashMap<Handle, V>,
}

/// Resolve in-stock flags for a set of handles.
#[instrument(skip(state, request), fields(handles = request.handles.len()))]
pub async fn stock(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Json<LookupResponse<bool>> {
    let values = state.attributes().stock(&request.handles).await;
    Json(LookupResponse { values })
}

/// Resolve physical format lists for a set of handles.
#[instrument(skip(state, request), fields(handles = request.handles.len()))]
pub async fn formats(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Json<LookupResponse<Vec<String>>> {
    let values = state.attributes().formats(&request.handles).await;
    Json(LookupResponse { values })
}

/// Resolve display artist names for a set of handles.
#[instrument(skip(state, request), fields(handles = request.handles.len()))]
pub async fn artist_name(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Json<LookupResponse<String>> {
    let values = state.attributes().artist_names(&request.handles).await;
    Json(LookupResponse { values })
}
