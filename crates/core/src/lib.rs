//! Spindle Core - Shared types library.
//!
//! This crate provides common types used across all Spindle components:
//! - `storefront` - Public-facing record shop and its catalog layer
//! - `integration-tests` - Cross-crate test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
