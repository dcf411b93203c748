//! Storefront services wired together.

use std::sync::Arc;

use tracing::info;

use crate::cart::{CartStore, FileStore};
use crate::catalog::FileCatalog;
use crate::config::StorefrontConfig;
use crate::db::users::UserRepository;
use crate::error::{Result, StorefrontError};
use crate::models::user::UserProfile;
use crate::orders::FileOrderStore;
use crate::services::auth::{IdentityProvider, LocalIdentityProvider};
use crate::services::checkout::Checkout;

/// The storefront's services for one device.
///
/// Built once at start-up and passed to whatever needs it. Cheaply cloneable
/// via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    cart: CartStore<FileStore>,
    catalog: FileCatalog,
    orders: FileOrderStore,
    identity: LocalIdentityProvider<FileStore>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.inner.config)
            .field("cart", &self.inner.cart)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Open every service under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or a
    /// persisted session cannot be read.
    pub async fn open(config: StorefrontConfig) -> Result<Self> {
        let device = FileStore::open(config.device_dir())?;
        let cart = CartStore::open(device.clone());
        let catalog = FileCatalog::open(&config.data_dir).await?;
        let orders = FileOrderStore::open(&config.data_dir).await?;
        let users = UserRepository::open(&config.data_dir).await?;
        let identity = LocalIdentityProvider::open(users, device).await?;

        info!(
            data_dir = %config.data_dir.display(),
            signed_in = identity.current_user().is_some(),
            "Storefront opened"
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                cart,
                catalog,
                orders,
                identity,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore<FileStore> {
        &self.inner.cart
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &FileCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn orders(&self) -> &FileOrderStore {
        &self.inner.orders
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn identity(&self) -> &LocalIdentityProvider<FileStore> {
        &self.inner.identity
    }

    /// The signed-in customer, or `NotSignedIn`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotSignedIn` if nobody is signed in.
    pub fn require_user(&self) -> Result<UserProfile> {
        self.identity()
            .current_user()
            .ok_or(StorefrontError::NotSignedIn)
    }

    /// Checkout over this storefront's cart and order store.
    #[must_use]
    pub fn checkout(&self) -> Checkout<'_, FileStore, FileOrderStore> {
        Checkout::new(&self.inner.cart, &self.inner.orders, &self.inner.config.brand)
    }
}
