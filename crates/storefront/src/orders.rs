//! Order records.
//!
//! An order is written once at checkout with status `pending` and never
//! modified by the storefront. Fulfilment happens over WhatsApp.

use std::future::Future;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use flawless_core::{Cart, CartLine, OrderId, OrderStatus, ProductId, UserId};

use crate::db::{DocumentCollection, RepositoryError};

/// Collection name for orders.
pub const ORDERS_COLLECTION: &str = "orders";

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order with this id.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// Underlying document store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Contact details copied onto the order from the customer's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// One purchased product, copied from a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

impl OrderLine {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            name: line.name.clone(),
            price: line.unit_price,
            quantity: line.quantity,
            image: line.image_ref.clone(),
        }
    }
}

/// An order ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub customer: CustomerInfo,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub delivery_address: String,
    pub additional_notes: String,
}

impl NewOrder {
    /// Build an order from the current cart contents.
    #[must_use]
    pub fn from_cart(
        user_id: UserId,
        customer: CustomerInfo,
        cart: &Cart,
        delivery_address: impl Into<String>,
        additional_notes: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            customer,
            items: cart.iter().map(OrderLine::from).collect(),
            total: cart.total_price(),
            delivery_address: delivery_address.into(),
            additional_notes: additional_notes.into(),
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer: CustomerInfo,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub delivery_address: String,
    pub additional_notes: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Stored order document, flattened the way the order desk reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDocument {
    user_id: UserId,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    items: Vec<OrderLine>,
    total: Decimal,
    delivery_address: String,
    #[serde(default)]
    additional_notes: String,
    #[serde(default)]
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl OrderDocument {
    fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            user_id: self.user_id,
            customer: CustomerInfo {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            items: self.items,
            total: self.total,
            delivery_address: self.delivery_address,
            additional_notes: self.additional_notes,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Order persistence.
pub trait OrderStore: Send + Sync {
    /// Store a new order with status `pending`.
    fn create_order(&self, order: NewOrder)
    -> impl Future<Output = Result<Order, OrderError>> + Send;

    /// One order by id.
    fn get_order(&self, id: &OrderId) -> impl Future<Output = Result<Order, OrderError>> + Send;

    /// A customer's orders, oldest first.
    fn list_orders_for_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Order>, OrderError>> + Send;
}

/// [`OrderStore`] backed by the `orders` document collection.
#[derive(Debug, Clone)]
pub struct FileOrderStore {
    orders: DocumentCollection<OrderDocument>,
}

impl FileOrderStore {
    /// Open the order store under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the collection cannot be created.
    pub async fn open(data_dir: &Path) -> Result<Self, OrderError> {
        Ok(Self {
            orders: DocumentCollection::open(data_dir, ORDERS_COLLECTION).await?,
        })
    }
}

impl OrderStore for FileOrderStore {
    #[instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len()))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderError> {
        let doc = OrderDocument {
            user_id: order.user_id,
            customer_name: order.customer.name,
            customer_email: order.customer.email,
            customer_phone: order.customer.phone,
            items: order.items,
            total: order.total,
            delivery_address: order.delivery_address,
            additional_notes: order.additional_notes,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        let id = OrderId::new(self.orders.insert(&doc).await?);
        info!(order_id = %id, total = %doc.total, "Order stored");
        Ok(doc.into_order(id))
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, OrderError> {
        match self.orders.get(id.as_str()).await {
            Ok(Some(doc)) => Ok(doc.into_order(id.clone())),
            Ok(None) | Err(RepositoryError::InvalidId(_)) => Err(OrderError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .orders
            .list()
            .await?
            .into_iter()
            .filter(|(_, doc)| doc.user_id == *user_id)
            .map(|(id, doc)| doc.into_order(OrderId::new(id)))
            .collect();
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use flawless_core::CartCandidate;

    use super::*;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(CartCandidate::new("p1", "Shirt", Decimal::new(20, 0), "/a.jpg"));
        cart.add(CartCandidate::new("p1", "Shirt", Decimal::new(20, 0), "/a.jpg"));
        cart.add(CartCandidate::new("p2", "Hat", Decimal::new(15, 0), "/b.jpg"));
        cart
    }

    fn new_order(user: &str) -> NewOrder {
        NewOrder::from_cart(
            UserId::new(user),
            CustomerInfo {
                name: Some("Ama".to_owned()),
                email: Some("ama@example.com".to_owned()),
                phone: None,
            },
            &cart(),
            "12 Oxford St, Osu",
            "",
        )
    }

    #[test]
    fn test_from_cart_copies_lines_and_total() {
        let order = new_order("u1");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].line_total(), Decimal::new(40, 0));
        assert_eq!(order.total, Decimal::new(55, 0));
    }

    #[tokio::test]
    async fn test_create_order_is_pending() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOrderStore::open(dir.path()).await.unwrap();

        let order = store.create_order(new_order("u1")).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let fetched = store.get_order(&order.id).await.unwrap();
        assert_eq!(fetched, order);
    }

    #[tokio::test]
    async fn test_document_uses_flat_customer_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOrderStore::open(dir.path()).await.unwrap();

        let order = store.create_order(new_order("u1")).await.unwrap();
        let raw = tokio::fs::read_to_string(
            dir.path()
                .join(ORDERS_COLLECTION)
                .join(format!("{}.json", order.id)),
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["customerName"], "Ama");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["deliveryAddress"], "12 Oxford St, Osu");
        assert!(value["customerPhone"].is_null());
    }

    #[tokio::test]
    async fn test_list_orders_for_user_filters() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOrderStore::open(dir.path()).await.unwrap();

        store.create_order(new_order("u1")).await.unwrap();
        store.create_order(new_order("u2")).await.unwrap();
        store.create_order(new_order("u1")).await.unwrap();

        let mine = store.list_orders_for_user(&UserId::new("u1")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.user_id == UserId::new("u1")));
    }

    #[tokio::test]
    async fn test_get_unknown_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOrderStore::open(dir.path()).await.unwrap();

        let err = store.get_order(&OrderId::new("nope")).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }
}
