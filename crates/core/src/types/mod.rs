//! Newtype wrappers shared across Spindle crates.

pub mod handle;

pub use handle::{AccountId, Handle, ProductId, VariantId};
