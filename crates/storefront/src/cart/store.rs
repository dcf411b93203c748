//! The cart store.
//!
//! [`CartStore`] owns the session's [`Cart`] and is the only way to change it.
//! Every mutation runs under one lock that covers the whole
//! update → persist → notify sequence, so observers see mutations one at a
//! time and in the order they were made, even when callers live on several
//! threads.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::{debug, error, instrument, warn};

use flawless_core::{Cart, CartCandidate, ProductId, SnapshotError};

use super::storage::{CART_STORAGE_KEY, KeyValueStore};

/// Handle returned by [`CartStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&Cart) + Send + Sync>;

struct Inner {
    cart: Cart,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

/// The session's cart with write-through persistence and change notification.
///
/// Construct once at application start with [`CartStore::open`] and pass it
/// to whatever needs the cart.
pub struct CartStore<S: KeyValueStore> {
    storage: S,
    inner: Mutex<Inner>,
}

impl<S: KeyValueStore> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("CartStore")
            .field("cart", &inner.cart)
            .field("observers", &inner.observers.len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the store, restoring the last persisted cart.
    ///
    /// A missing, empty or unreadable snapshot starts an empty cart; this
    /// never fails.
    pub fn open(storage: S) -> Self {
        let cart = restore(&storage);
        debug!(lines = cart.len(), "Cart store opened");

        Self {
            storage,
            inner: Mutex::new(Inner {
                cart,
                observers: Vec::new(),
                next_subscription: 0,
            }),
        }
    }

    /// Add one unit of a product, merging with an existing line.
    ///
    /// Returns the line's quantity after the add.
    #[instrument(skip(self, candidate), fields(product_id = %candidate.id))]
    pub fn add_item(&self, candidate: CartCandidate) -> u32 {
        self.mutate(|cart| {
            let units = cart.unit_count();
            let quantity = cart.add(candidate);
            if cart.unit_count() == units {
                warn!("Cart total would overflow, item not added");
            }
            quantity
        })
    }

    /// Take the lines of a placed order out of the cart.
    ///
    /// Each ordered line's quantity is subtracted from the matching cart
    /// line, dropping lines that reach zero. Items added while the order was
    /// being written stay in the cart. Persists and notifies once.
    #[instrument(skip(self, ordered), fields(lines = ordered.len()))]
    pub fn remove_ordered(&self, ordered: &Cart) {
        self.mutate(|cart| cart.subtract(ordered));
    }

    /// Remove a product's line entirely. Absent ids are a no-op.
    ///
    /// Returns `true` if a line was removed.
    #[instrument(skip(self))]
    pub fn remove_item(&self, id: &ProductId) -> bool {
        self.mutate(|cart| cart.remove(id))
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        self.mutate(Cart::clear);
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total_price(&self) -> Decimal {
        self.lock().cart.total_price()
    }

    /// Total units across all lines (the navigation badge).
    pub fn unit_count(&self) -> u64 {
        self.lock().cart.unit_count()
    }

    /// Number of distinct products (the order summary count).
    pub fn distinct_count(&self) -> usize {
        self.lock().cart.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().cart.is_empty()
    }

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.lock().cart.clone()
    }

    /// Register an observer called with the new cart after every mutation.
    ///
    /// Observers run in subscription order while the store is locked, so
    /// they must not call back into the store.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Cart) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(existing, _)| *existing != id);
        inner.observers.len() != before
    }

    /// The backing storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn mutate<R>(&self, op: impl FnOnce(&mut Cart) -> R) -> R {
        let mut inner = self.lock();
        let result = op(&mut inner.cart);

        self.persist(&inner.cart);
        for (_, observer) in &inner.observers {
            observer(&inner.cart);
        }

        result
    }

    fn persist(&self, cart: &Cart) {
        let snapshot = match cart.to_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.set(CART_STORAGE_KEY, &snapshot) {
            error!(error = %e, "Failed to persist cart");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read the persisted cart, falling back to an empty one.
fn restore(storage: &impl KeyValueStore) -> Cart {
    let snapshot = match storage.get(CART_STORAGE_KEY) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Could not read saved cart, starting empty");
            return Cart::new();
        }
    };

    match Cart::from_snapshot(&snapshot) {
        Ok(cart) => cart,
        Err(SnapshotError::Empty) => Cart::new(),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable cart snapshot");
            Cart::new()
        }
    }
}
