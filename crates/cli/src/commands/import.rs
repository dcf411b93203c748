//! Batch product import.

use std::path::Path;

use flawless_storefront::Storefront;
use flawless_storefront::services::import::import_products;

/// Import every row of a product CSV.
///
/// # Errors
///
/// Returns an error if the file is not readable CSV or a product write fails.
#[allow(clippy::print_stdout)]
pub async fn run(storefront: &Storefront, file: &Path) -> flawless_storefront::Result<()> {
    let summary = import_products(storefront.catalog(), file).await?;
    println!(
        "Imported {} of {} products from {}",
        summary.products_created,
        summary.rows_read,
        file.display()
    );
    Ok(())
}
