//! Flawless Core - Shared types and the cart model.
//!
//! This crate provides the types used across all Flawless components:
//! - `storefront` - Cart store, catalog, orders, identity and checkout services
//! - `cli` - Command-line storefront client and catalog import
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! backends, no network clients. Persistence of the cart lives in the
//! storefront crate, which drives the [`cart::Cart`] model defined here.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`cart`] - The cart model: merge-on-add lines, totals, snapshot codec

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartCandidate, CartLine, SnapshotError};
pub use types::*;

#[doc(hidden)]
pub mod __private {
    pub use uuid::Uuid;
}
