//! Cart commands.

use flawless_core::ProductId;
use flawless_storefront::Storefront;
use flawless_storefront::catalog::Catalog;

use super::money;

/// Print every cart line and the totals.
#[allow(clippy::print_stdout)]
pub fn show(storefront: &Storefront) {
    let cart = storefront.cart().snapshot();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in &cart {
        println!(
            "{:>3} x {:<30} {:>14}  ({})",
            line.quantity,
            line.name,
            money(storefront, line.line_total()),
            line.id
        );
    }
    println!();
    println!(
        "{} items, total {}",
        cart.unit_count(),
        money(storefront, cart.total_price())
    );
}

/// Add one unit of a catalog product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the catalog cannot be read.
#[allow(clippy::print_stdout)]
pub async fn add(storefront: &Storefront, product_id: &str) -> flawless_storefront::Result<()> {
    let product = storefront
        .catalog()
        .get_product(&ProductId::new(product_id))
        .await?;
    let quantity = storefront.cart().add_item(product.to_cart_candidate());

    println!("Added {} (now x{quantity})", product.name);
    Ok(())
}

/// Remove a whole cart line.
#[allow(clippy::print_stdout)]
pub fn remove(storefront: &Storefront, product_id: &str) {
    if storefront.cart().remove_item(&ProductId::new(product_id)) {
        println!("Removed {product_id}");
    } else {
        println!("{product_id} is not in the cart");
    }
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear(storefront: &Storefront) {
    storefront.cart().clear();
    println!("Cart cleared");
}
