//! Batch product import from a spreadsheet export.
//!
//! The shop's product form exports a CSV with these columns (any order,
//! extra columns ignored):
//!
//! | column         | default             |
//! |----------------|---------------------|
//! | `Product Name` | `Unnamed Product`   |
//! | `Price`        | `0`                 |
//! | `Description`  | empty               |
//! | `Category`     | `Uncategorized`     |
//! | `Image URL`    | empty               |
//!
//! Every row becomes a new product. Rows are written one at a time and the
//! import stops at the first failed write; re-running it creates duplicates.

use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::catalog::{Catalog, CatalogError, NewProduct};

const COL_NAME: &str = "Product Name";
const COL_PRICE: &str = "Price";
const COL_DESCRIPTION: &str = "Description";
const COL_CATEGORY: &str = "Category";
const COL_IMAGE: &str = "Image URL";

const DEFAULT_NAME: &str = "Unnamed Product";
const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Errors from a product import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file could not be read as CSV.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Writing a product failed. Earlier rows were already created.
    #[error("failed to create product from row {row}: {source}")]
    Catalog {
        row: usize,
        #[source]
        source: CatalogError,
    },
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Data rows read from the file.
    pub rows_read: usize,
    /// Products written to the catalog.
    pub products_created: usize,
}

/// Column positions, resolved from the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    price: Option<usize>,
    description: Option<usize>,
    category: Option<usize>,
    image: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = Self::default();
        for (i, header) in headers.iter().enumerate() {
            let slot = match header.trim() {
                COL_NAME => &mut map.name,
                COL_PRICE => &mut map.price,
                COL_DESCRIPTION => &mut map.description,
                COL_CATEGORY => &mut map.category,
                COL_IMAGE => &mut map.image,
                _ => continue,
            };
            slot.get_or_insert(i);
        }
        map
    }

    fn parse_record(&self, record: &csv::StringRecord) -> NewProduct {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        NewProduct {
            name: field(self.name).unwrap_or(DEFAULT_NAME).to_owned(),
            price: field(self.price).map_or(Decimal::ZERO, parse_price),
            description: field(self.description).unwrap_or_default().to_owned(),
            category: field(self.category).unwrap_or(DEFAULT_CATEGORY).to_owned(),
            image: field(self.image).unwrap_or_default().to_owned(),
        }
    }
}

/// Read products from CSV data.
///
/// # Errors
///
/// Returns `ImportError::Csv` if the data is not valid CSV.
pub fn read_products<R: Read>(reader: R) -> Result<Vec<NewProduct>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?);
    if columns.name.is_none() {
        warn!("CSV has no '{COL_NAME}' column, every product will be unnamed");
    }

    csv_reader
        .records()
        .map(|record| Ok(columns.parse_record(&record?)))
        .collect()
}

/// Import every row of the CSV file at `path` into `catalog`.
///
/// # Errors
///
/// Returns `ImportError::Csv` if the file cannot be read, or
/// `ImportError::Catalog` at the first product that cannot be written.
#[instrument(skip(catalog, path), fields(path = %path.display()))]
pub async fn import_products<C: Catalog>(
    catalog: &C,
    path: &Path,
) -> Result<ImportSummary, ImportError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let products = read_products(file)?;
    import_all(catalog, products).await
}

/// Write already-parsed products to `catalog`, in order.
///
/// # Errors
///
/// Returns `ImportError::Catalog` at the first product that cannot be written.
pub async fn import_all<C: Catalog>(
    catalog: &C,
    products: Vec<NewProduct>,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary {
        rows_read: products.len(),
        products_created: 0,
    };
    info!(count = summary.rows_read, "Uploading products");

    for (i, product) in products.into_iter().enumerate() {
        catalog
            .create_product(product)
            .await
            .map_err(|source| ImportError::Catalog { row: i + 1, source })?;
        summary.products_created += 1;
    }

    info!(created = summary.products_created, "Upload complete");
    Ok(summary)
}

/// Parse the leading number of a price cell.
///
/// Trailing text is ignored (`"25 cedis"` is 25), anything without a
/// leading number is 0, and negative amounts are clamped to 0.
fn parse_price(raw: &str) -> Decimal {
    let s = raw.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for b in s.bytes() {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return Decimal::ZERO;
    }

    let digits = s[..end].trim_end_matches('.');
    let parsed = if digits.starts_with('.') {
        format!("0{digits}").parse::<Decimal>()
    } else {
        digits.parse::<Decimal>()
    };

    match parsed {
        Ok(price) if negative && !price.is_zero() => {
            warn!(raw, "Negative price, using 0");
            Decimal::ZERO
        }
        Ok(price) => price,
        Err(_) => Decimal::ZERO,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use flawless_core::ProductId;

    use super::*;
    use crate::catalog::{FileCatalog, Product};
    use crate::db::RepositoryError;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("120"), Decimal::new(120, 0));
        assert_eq!(parse_price(" 35.50"), Decimal::new(3550, 2));
        assert_eq!(parse_price("25 cedis"), Decimal::new(25, 0));
        assert_eq!(parse_price("1,200"), Decimal::new(1, 0));
        assert_eq!(parse_price(".5"), Decimal::new(5, 1));
        assert_eq!(parse_price("7."), Decimal::new(7, 0));
        assert_eq!(parse_price("GHS 25"), Decimal::ZERO);
        assert_eq!(parse_price("abc"), Decimal::ZERO);
        assert_eq!(parse_price("-5"), Decimal::ZERO);
    }

    #[test]
    fn test_read_products_with_defaults() {
        let data = "\
Product Name,Price,Description,Category,Image URL
Silk Dress,250,Evening wear,Dresses,https://img.example/dress.jpg
,oops,,,
";
        let products = read_products(data.as_bytes()).unwrap();
        assert_eq!(products.len(), 2);

        assert_eq!(products[0].name, "Silk Dress");
        assert_eq!(products[0].price, Decimal::new(250, 0));
        assert_eq!(products[0].category, "Dresses");

        assert_eq!(products[1].name, "Unnamed Product");
        assert_eq!(products[1].price, Decimal::ZERO);
        assert_eq!(products[1].description, "");
        assert_eq!(products[1].category, "Uncategorized");
        assert_eq!(products[1].image, "");
    }

    #[test]
    fn test_read_products_column_order_and_extras() {
        let data = "\
Timestamp,Price,Product Name,Notes
2025-01-01,15,Beret,ignored
";
        let products = read_products(data.as_bytes()).unwrap();
        assert_eq!(products[0].name, "Beret");
        assert_eq!(products[0].price, Decimal::new(15, 0));
        assert_eq!(products[0].category, "Uncategorized");
    }

    #[test]
    fn test_read_products_short_rows() {
        let data = "Product Name,Price,Category\nScarf\n";
        let products = read_products(data.as_bytes()).unwrap();
        assert_eq!(products[0].name, "Scarf");
        assert_eq!(products[0].price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_import_products_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("products.csv");
        std::fs::write(
            &csv_path,
            "Product Name,Price\nTote,40\nCap,12.5\nSocks,5\n",
        )
        .unwrap();

        let catalog = FileCatalog::open(&dir.path().join("data")).await.unwrap();
        let summary = import_products(&catalog, &csv_path).await.unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                rows_read: 3,
                products_created: 3
            }
        );
        let mut names: Vec<_> = catalog
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Cap", "Socks", "Tote"]);
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FileCatalog::open(dir.path()).await.unwrap();

        let err = import_products(&catalog, &dir.path().join("nope.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Csv(_)));
    }

    /// Catalog that accepts `capacity` products, then fails every write.
    struct FillsUp {
        capacity: usize,
        created: AtomicUsize,
    }

    impl Catalog for FillsUp {
        async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
            Ok(Vec::new())
        }

        async fn featured_products(&self, _limit: usize) -> Result<Vec<Product>, CatalogError> {
            Ok(Vec::new())
        }

        async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
            Err(CatalogError::NotFound(id.clone()))
        }

        async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
            if self.created.load(Ordering::SeqCst) >= self.capacity {
                return Err(RepositoryError::DataCorruption("products: disk full".to_owned()).into());
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Product {
                id: ProductId::generate(),
                name: product.name,
                price: product.price,
                description: product.description,
                category: product.category,
                image: product.image,
                created_at: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_import_stops_at_first_failed_write() {
        let catalog = FillsUp {
            capacity: 2,
            created: AtomicUsize::new(0),
        };
        let products =
            read_products("Product Name,Price\nA,1\nB,2\nC,3\nD,4\n".as_bytes()).unwrap();

        let err = import_all(&catalog, products).await.unwrap_err();

        assert!(matches!(
            err,
            ImportError::Catalog {
                row: 3,
                source: CatalogError::Repository(_)
            }
        ));
        assert_eq!(catalog.created.load(Ordering::SeqCst), 2);
    }
}
