//! Archive listing route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{ArchiveDimension, ArchivePage, ArchiveQuery, SortKey};
use crate::error::AppError;
use crate::state::AppState;

/// Pagination and sort query parameters. Page size is fixed server-side.
#[derive(Debug, Deserialize)]
pub struct ArchiveParams {
    pub page: Option<u32>,
    pub sort: Option<String>,
}

/// Serve one archive page as JSON.
///
/// An unknown dimension segment is a 404; everything past that degrades to
/// an empty page rather than an error (see [`crate::catalog::archive`]).
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((dimension, slug)): Path<(String, String)>,
    Query(params): Query<ArchiveParams>,
) -> Result<Json<ArchivePage>, AppError> {
    let dimension: ArchiveDimension = dimension
        .parse()
        .map_err(|_| AppError::NotFound(format!("no such archive: {dimension}")))?;

    let query = ArchiveQuery {
        dimension,
        slug,
        page: params.page.unwrap_or(1),
        sort: SortKey::parse(params.sort.as_deref()),
    };

    Ok(Json(state.archive().resolve(&query).await))
}
