//! Integration tests for Flawless.
//!
//! Each test runs a full [`Storefront`] against its own temporary data
//! directory, so tests are independent and need no running services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p flawless-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart survives restarts, bad snapshots are dropped
//! - `checkout_flow` - Import, sign up, fill the cart, place an order
//! - `accounts` - Sign-up, sign-in and session restore across restarts

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tempfile::TempDir;

use flawless_storefront::config::{BrandConfig, StorefrontConfig};
use flawless_storefront::services::auth::SignUp;
use flawless_storefront::{Result, Storefront};

/// A storefront rooted in a temporary directory.
///
/// The directory is removed when the context is dropped.
pub struct TestContext {
    dir: TempDir,
}

impl TestContext {
    /// Create an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Data directory used by [`Self::open`].
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// Configuration pointing at this context's data directory.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            data_dir: self.data_dir(),
            brand: BrandConfig::default(),
        }
    }

    /// Open a storefront. Call again to simulate an app restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storefront cannot be opened.
    pub async fn open(&self) -> Result<Storefront> {
        Storefront::open(self.config()).await
    }

    /// Write `contents` to a file under the context root and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A sign-up request for a test customer.
#[must_use]
pub fn sign_up_request(email: &str) -> SignUp {
    SignUp {
        email: email.to_owned(),
        password: SecretString::from("correct horse"),
        display_name: "Ama Mensah".to_owned(),
        phone_number: "+233241234567".to_owned(),
    }
}

/// Product sheet used by the checkout tests.
pub const PRODUCTS_CSV: &str = "\
Product Name,Price,Description,Category,Image URL
Kente Shirt,20,Hand-woven,Shirts,https://img.example/shirt.jpg
Bucket Hat,15,,Hats,https://img.example/hat.jpg
";
