//! Spindle Storefront library.
//!
//! The catalog aggregation and invalidation layer behind the Spindle record
//! shop: archive listing resolution, per-handle attribute caching, rendered-
//! page invalidation, and post-checkout want-list reconciliation. Exposed as
//! a library so the integration-tests crate can exercise it against fakes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod commerce;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
