//! The session cart.
//!
//! - [`storage`] - Device-local key-value storage the cart persists to
//! - [`store`] - The cart store: mutations, persistence, change notification

pub mod storage;
pub mod store;

pub use storage::{CART_STORAGE_KEY, FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, SubscriptionId};
