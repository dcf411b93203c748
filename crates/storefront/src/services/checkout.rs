//! Checkout: turn the cart into an order and hand it off over WhatsApp.
//!
//! Placing an order writes a `pending` order record, builds a `wa.me` link
//! carrying a readable summary, then takes the ordered lines out of the cart. Payment and
//! confirmation happen in the WhatsApp conversation.

use std::fmt::Write as _;

use thiserror::Error;
use tracing::{info, instrument};

use flawless_core::{Cart, CurrencyCode, Price};

use crate::cart::{CartStore, KeyValueStore};
use crate::config::BrandConfig;
use crate::models::user::UserProfile;
use crate::orders::{CustomerInfo, NewOrder, Order, OrderError, OrderStore};

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Delivery address missing or blank.
    #[error("delivery address is required")]
    MissingAddress,

    /// The order record could not be written. The cart is unchanged.
    #[error("failed to store order: {0}")]
    Order(#[from] OrderError),
}

impl CheckoutError {
    /// The message shown to the customer.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty.",
            Self::MissingAddress => "Please enter a delivery address.",
            Self::Order(_) => "Failed to place order. Please try again.",
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    /// The stored order.
    pub order: Order,
    /// The order summary sent to the shop.
    pub message: String,
    /// `wa.me` link that opens the conversation with the summary pre-filled.
    pub handoff_url: String,
}

/// Checkout service.
pub struct Checkout<'a, S: KeyValueStore, O: OrderStore> {
    cart: &'a CartStore<S>,
    orders: &'a O,
    brand: &'a BrandConfig,
}

impl<'a, S: KeyValueStore, O: OrderStore> Checkout<'a, S, O> {
    /// Create a checkout over the session's cart.
    #[must_use]
    pub const fn new(cart: &'a CartStore<S>, orders: &'a O, brand: &'a BrandConfig) -> Self {
        Self {
            cart,
            orders,
            brand,
        }
    }

    /// Place an order for everything in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` or `CheckoutError::MissingAddress`
    /// before anything is written, and `CheckoutError::Order` if the order
    /// record cannot be stored. The cart is only changed on success, and then
    /// only by the lines that were ordered.
    #[instrument(skip(self, customer, address, notes), fields(uid = %customer.uid))]
    pub async fn place_order(
        &self,
        customer: &UserProfile,
        address: &str,
        notes: &str,
    ) -> Result<OrderReceipt, CheckoutError> {
        let cart = self.cart.snapshot();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let address = address.trim();
        if address.is_empty() {
            return Err(CheckoutError::MissingAddress);
        }
        let notes = notes.trim();

        let info = CustomerInfo {
            name: customer.display_name.clone(),
            email: Some(customer.email.to_string()),
            phone: customer.phone_number.clone(),
        };
        let order = self
            .orders
            .create_order(NewOrder::from_cart(
                customer.uid.clone(),
                info.clone(),
                &cart,
                address,
                notes,
            ))
            .await?;

        let message = compose_order_message(
            &self.brand.name,
            self.brand.currency,
            &cart,
            &info,
            address,
            notes,
        );
        let handoff_url = whatsapp_link(&self.brand.whatsapp_number, &message);

        self.cart.remove_ordered(&cart);
        info!(order_id = %order.id, total = %order.total, "Order placed");

        Ok(OrderReceipt {
            order,
            message,
            handoff_url,
        })
    }
}

/// Build the order summary sent to the shop's WhatsApp.
#[must_use]
pub fn compose_order_message(
    brand: &str,
    currency: CurrencyCode,
    cart: &Cart,
    customer: &CustomerInfo,
    address: &str,
    notes: &str,
) -> String {
    let price = |amount| Price::new(amount, currency);
    let mut msg = format!("🛍️ *NEW ORDER from {brand}*\n\n📦 *Order Details:*\n");

    for line in cart {
        let _ = writeln!(
            msg,
            "• {} x{} - {}",
            line.name,
            line.quantity,
            price(line.line_total())
        );
    }

    let _ = write!(
        msg,
        "\n💰 *Total:* {total}\n\n\
         👤 *Customer Info:*\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\n\
         📍 *Delivery Address:*\n{address}\n\n\
         📝 *Notes:*\n{notes}\n\n\
         ---\n\
         Order placed via {brand} Website",
        total = price(cart.total_price()),
        name = or_placeholder(customer.name.as_deref(), "N/A"),
        email = or_placeholder(customer.email.as_deref(), "N/A"),
        phone = or_placeholder(customer.phone.as_deref(), "N/A"),
        address = or_placeholder(Some(address), "Not provided"),
        notes = or_placeholder(Some(notes), "None"),
    );

    msg
}

/// `wa.me` link to `phone` with `message` pre-filled.
#[must_use]
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let number = phone.replace('+', "");
    format!("https://wa.me/{number}?text={}", urlencoding::encode(message))
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}
