//! The cart model.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLine`]s with at most one
//! line per product. Adding a product that is already in the cart bumps its
//! quantity and keeps the name, price and image captured on the first add, so
//! totals shown during a session do not move when the catalog changes.
//!
//! This module is pure: persistence and change notification are layered on top
//! by the storefront's cart store, which uses [`Cart::to_snapshot`] and
//! [`Cart::from_snapshot`] to write and restore the device-local copy.
//!
//! # Snapshot format
//!
//! A JSON array of lines:
//!
//! ```json
//! [{"id":"p1","name":"Shirt","unitPrice":20.0,"imageRef":"/a.jpg","quantity":2}]
//! ```
//!
//! Older snapshots that use `price` and `image` are read as well.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Errors that make a persisted snapshot unusable.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The stored value is empty or whitespace.
    #[error("snapshot is empty")]
    Empty,

    /// The stored value is not a JSON array of cart lines.
    #[error("snapshot is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A line has an empty product id.
    #[error("line {0} has an empty product id")]
    MissingId(usize),

    /// Two lines share a product id.
    #[error("duplicate line for product {0}")]
    DuplicateLine(ProductId),

    /// A line has a zero quantity.
    #[error("line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),

    /// A line has a negative unit price.
    #[error("line for product {0} has a negative price")]
    NegativePrice(ProductId),

    /// The line total or the cart total does not fit in a `Decimal`.
    #[error("cart total overflows at product {0}")]
    TotalOverflow(ProductId),
}

/// A product offered to the cart.
///
/// Built from a catalog product at the moment the customer taps "add to cart".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCandidate {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Image locator, may be empty.
    pub image_ref: String,
}

impl CartCandidate {
    /// Create a new candidate.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_ref: image_ref.into(),
        }
    }
}

/// One distinct product held in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product identifier, unique within the cart.
    pub id: ProductId,
    /// Display name captured on first add.
    pub name: String,
    /// Unit price captured on first add.
    #[serde(with = "rust_decimal::serde::float", alias = "price")]
    pub unit_price: Decimal,
    /// Image locator captured on first add.
    #[serde(default, alias = "image")]
    pub image_ref: String,
    /// Number of units, always at least one.
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price * quantity` for this line.
    ///
    /// Lines held by a [`Cart`] always have a representable total; a line
    /// built by hand saturates instead of panicking.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    fn checked_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

impl From<CartCandidate> for CartLine {
    fn from(candidate: CartCandidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            unit_price: candidate.unit_price,
            image_ref: candidate.image_ref,
            quantity: 1,
        }
    }
}

/// An insertion-ordered collection of cart lines, one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from existing lines, checking the cart invariants.
    ///
    /// # Errors
    ///
    /// Returns a `SnapshotError` if a line has an empty id, a zero quantity or
    /// a negative price, if two lines share an id, or if the total overflows.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, SnapshotError> {
        let mut total = Decimal::ZERO;
        for (index, line) in lines.iter().enumerate() {
            if line.id.is_empty() {
                return Err(SnapshotError::MissingId(index));
            }
            if line.quantity == 0 {
                return Err(SnapshotError::ZeroQuantity(line.id.clone()));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(SnapshotError::NegativePrice(line.id.clone()));
            }
            if lines.iter().take(index).any(|earlier| earlier.id == line.id) {
                return Err(SnapshotError::DuplicateLine(line.id.clone()));
            }
            total = line
                .checked_total()
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(|| SnapshotError::TotalOverflow(line.id.clone()))?;
        }

        Ok(Self { lines })
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart its quantity goes up by one and
    /// the existing name, price and image are kept. Otherwise a new line with
    /// quantity one is appended. Returns the line's new quantity.
    ///
    /// An add that would push the quantity or the cart total past what can
    /// be represented is refused: the cart is unchanged and the current
    /// quantity (0 for a product not in the cart) is returned.
    pub fn add(&mut self, candidate: CartCandidate) -> u32 {
        let index = self.lines.iter().position(|line| line.id == candidate.id);
        let (unit_price, current) = index
            .and_then(|i| self.lines.get(i))
            .map_or((candidate.unit_price, 0), |line| (line.unit_price, line.quantity));

        let Some(next) = current.checked_add(1) else {
            return current;
        };
        let fits = unit_price.checked_mul(Decimal::from(next)).is_some()
            && self
                .checked_total_price()
                .and_then(|total| total.checked_add(unit_price))
                .is_some();
        if !fits {
            return current;
        }

        match index.and_then(|i| self.lines.get_mut(i)) {
            Some(line) => line.quantity = next,
            None => self.lines.push(CartLine::from(candidate)),
        }
        next
    }

    /// Remove a product's line entirely, whatever its quantity.
    ///
    /// Returns `true` if a line was removed; absent ids are a no-op.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.id != id);
        self.lines.len() != before
    }

    /// Subtract `other`'s quantities from this cart, line by line.
    ///
    /// Lines that reach zero are removed. Products only in `other` are
    /// ignored. Returns `true` if anything changed.
    pub fn subtract(&mut self, other: &Self) -> bool {
        let before = self.clone();
        for taken in other {
            if let Some(line) = self.lines.iter_mut().find(|line| line.id == taken.id) {
                line.quantity = line.quantity.saturating_sub(taken.quantity);
            }
        }
        self.lines.retain(|line| line.quantity > 0);
        *self != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |total, line| total.saturating_add(line.line_total()))
    }

    fn checked_total_price(&self) -> Option<Decimal> {
        self.lines.iter().try_fold(Decimal::ZERO, |total, line| {
            total.checked_add(line.checked_total()?)
        })
    }

    /// Total number of units across all lines (the navigation badge count).
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of distinct products (the order summary item count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines in first-add order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines in first-add order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Serialize the cart to its snapshot form.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` if a price cannot be represented as a
    /// JSON number.
    pub fn to_snapshot(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.lines)?)
    }

    /// Restore a cart from its snapshot form.
    ///
    /// # Errors
    ///
    /// Returns a `SnapshotError` if the snapshot is empty, is not valid JSON,
    /// or violates the cart invariants.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, SnapshotError> {
        if snapshot.trim().is_empty() {
            return Err(SnapshotError::Empty);
        }

        let lines: Vec<CartLine> = serde_json::from_str(snapshot)?;
        Self::from_lines(lines)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
