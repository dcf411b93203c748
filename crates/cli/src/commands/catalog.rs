//! Catalog commands.

use flawless_core::ProductId;
use flawless_storefront::Storefront;
use flawless_storefront::catalog::Catalog;

use super::money;

/// List products, or only the featured ones.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[allow(clippy::print_stdout)]
pub async fn list(storefront: &Storefront, featured: Option<usize>) -> flawless_storefront::Result<()> {
    let catalog = storefront.catalog();
    let products = match featured {
        Some(limit) => catalog.featured_products(limit).await?,
        None => catalog.list_products().await?,
    };

    if products.is_empty() {
        println!("No products yet.");
        return Ok(());
    }
    for product in &products {
        println!(
            "{}  {:<30} {:>14}  {}",
            product.id,
            product.name,
            money(storefront, product.price),
            product.category
        );
    }
    Ok(())
}

/// Show one product in full.
///
/// # Errors
///
/// Returns an error if the product does not exist.
#[allow(clippy::print_stdout)]
pub async fn show(storefront: &Storefront, id: &str) -> flawless_storefront::Result<()> {
    let product = storefront
        .catalog()
        .get_product(&ProductId::new(id))
        .await?;

    println!("{}", product.name);
    println!("  id:       {}", product.id);
    println!("  price:    {}", money(storefront, product.price));
    println!("  category: {}", product.category);
    if !product.image.is_empty() {
        println!("  image:    {}", product.image);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    Ok(())
}
