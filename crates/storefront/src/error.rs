//! Unified error handling.
//!
//! Provides a unified `StorefrontError` type for callers that drive several
//! services. Every variant maps to a short message that is safe to show to
//! the customer; the `Display` form carries the detail for logs.

use thiserror::Error;

use crate::cart::StorageError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::orders::OrderError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::import::ImportError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Document store failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Product import failed.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// The operation needs a signed-in customer.
    #[error("Not signed in")]
    NotSignedIn,
}

impl StorefrontError {
    /// The message shown to the customer.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::Catalog(CatalogError::NotFound(_)) => "Product not found.",
            Self::Order(OrderError::NotFound(_)) => "Order not found.",
            Self::NotSignedIn => "Please sign in to continue.",
            Self::Import(_) => "Failed to import products. Please check the file and try again.",
            Self::Config(_)
            | Self::Storage(_)
            | Self::Repository(_)
            | Self::Catalog(_)
            | Self::Order(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
