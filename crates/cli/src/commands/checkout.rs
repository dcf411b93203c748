//! Checkout and order history.

use flawless_storefront::Storefront;
use flawless_storefront::orders::OrderStore;

use super::money;

/// Place an order for the cart and print the WhatsApp link.
///
/// # Errors
///
/// Returns an error if nobody is signed in, the cart is empty, the address
/// is blank, or the order cannot be stored.
#[allow(clippy::print_stdout)]
pub async fn run(storefront: &Storefront, address: &str, notes: &str) -> flawless_storefront::Result<()> {
    let user = storefront.require_user()?;
    let receipt = storefront.checkout().place_order(&user, address, notes).await?;

    println!("{}", receipt.message);
    println!();
    println!(
        "Order {} placed ({}).",
        receipt.order.id,
        money(storefront, receipt.order.total)
    );
    println!("Open this link to send it to the shop:");
    println!("{}", receipt.handoff_url);
    Ok(())
}

/// List the signed-in customer's orders.
///
/// # Errors
///
/// Returns an error if nobody is signed in or the orders cannot be read.
#[allow(clippy::print_stdout)]
pub async fn list_orders(storefront: &Storefront) -> flawless_storefront::Result<()> {
    let user = storefront.require_user()?;
    let orders = storefront.orders().list_orders_for_user(&user.uid).await?;

    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }
    for order in &orders {
        println!(
            "{}  {}  {:<9} {:>14}  {} items",
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.id,
            order.status,
            money(storefront, order.total),
            order.items.iter().map(|line| u64::from(line.quantity)).sum::<u64>()
        );
    }
    Ok(())
}
