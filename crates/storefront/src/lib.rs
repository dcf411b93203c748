//! Flawless Storefront library.
//!
//! The session cart and the services around it: catalog, orders, customer
//! identity, checkout with WhatsApp hand-off, and batch product import.
//! [`state::Storefront`] wires them together for one device.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod orders;
pub mod services;
pub mod state;

pub use error::{Result, StorefrontError};
pub use state::Storefront;
