//! HTTP route handlers for the catalog layer.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Archive listings
//! GET  /api/archive/{dimension}/{slug}  - One archive page (artist/format/tag)
//!
//! # Attribute lookups (batch, by handle)
//! POST /api/stock                       - In-stock flags
//! POST /api/formats                     - Physical format lists
//! POST /api/artist-name                 - Display artist names
//!
//! # Webhooks (x-revalidate-secret header)
//! POST /api/revalidate                  - Rendered-page cache invalidation
//! POST /api/orders/confirmed            - Queue want-list reconciliation
//! ```

pub mod archive;
pub mod attributes;
pub mod orders;
pub mod revalidate;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the archive and attribute lookup router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/archive/{dimension}/{slug}", get(archive::show))
        .route("/stock", post(attributes::stock))
        .route("/formats", post(attributes::formats))
        .route("/artist-name", post(attributes::artist_name))
        .route("/revalidate", post(revalidate::revalidate))
        .route("/orders/confirmed", post(orders::confirmed))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}
