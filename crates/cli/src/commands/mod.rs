//! Subcommand implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod import;

use rust_decimal::Decimal;

use flawless_core::Price;
use flawless_storefront::Storefront;

/// An amount in the shop's currency, e.g. `GHS 40.00`.
fn money(storefront: &Storefront, amount: Decimal) -> String {
    Price::new(amount, storefront.config().brand.currency).to_string()
}
