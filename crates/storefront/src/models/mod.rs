//! Domain models for storefront.

pub mod user;

pub use user::{UserProfile, UserRecord};
