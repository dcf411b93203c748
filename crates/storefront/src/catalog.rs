//! Product catalog.
//!
//! Products are documents in the `products` collection. The storefront only
//! reads them; [`Catalog::create_product`] exists for the batch importer.

use std::future::Future;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use flawless_core::{CartCandidate, ProductId};

use crate::db::{DocumentCollection, RepositoryError};

/// Collection name for products.
pub const PRODUCTS_COLLECTION: &str = "products";

/// Number of products shown on the home page.
pub const FEATURED_LIMIT: usize = 8;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with this id.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Underlying document store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A product as listed in the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Document key in the `products` collection.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in the shop's currency.
    pub price: Decimal,
    /// Free-text description, may be empty.
    pub description: String,
    /// Shop section, `Uncategorized` when imported without one.
    pub category: String,
    /// Image URL or path, may be empty.
    pub image: String,
    /// When the product was stored.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The cart's view of this product.
    #[must_use]
    pub fn to_cart_candidate(&self) -> CartCandidate {
        CartCandidate::new(
            self.id.clone(),
            self.name.clone(),
            self.price,
            self.image.clone(),
        )
    }

    fn from_document(id: String, doc: ProductDocument) -> Self {
        Self {
            id: ProductId::new(id),
            name: doc.name,
            price: doc.price,
            description: doc.description,
            category: doc.category,
            image: doc.image,
            created_at: doc.created_at,
        }
    }
}

/// Fields for a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Unit price in the shop's currency.
    pub price: Decimal,
    /// Free-text description.
    pub description: String,
    /// Shop section.
    pub category: String,
    /// Image URL or path.
    pub image: String,
}

/// Stored product document. The id is the document key, not a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    name: String,
    price: Decimal,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    image: String,
    created_at: DateTime<Utc>,
}

/// Read and write access to the product catalog.
pub trait Catalog: Send + Sync {
    /// Every product, in stable id order.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// The first `limit` products, as shown on the home page.
    fn featured_products(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// One product by id.
    fn get_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Store a new product under a generated id.
    fn create_product(
        &self,
        product: NewProduct,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;
}

/// [`Catalog`] backed by the `products` document collection.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    products: DocumentCollection<ProductDocument>,
}

impl FileCatalog {
    /// Open the catalog under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the collection cannot be created.
    pub async fn open(data_dir: &Path) -> Result<Self, CatalogError> {
        Ok(Self {
            products: DocumentCollection::open(data_dir, PRODUCTS_COLLECTION).await?,
        })
    }
}

impl Catalog for FileCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let products = self
            .products
            .list()
            .await?
            .into_iter()
            .map(|(id, doc)| Product::from_document(id, doc))
            .collect();
        Ok(products)
    }

    async fn featured_products(&self, limit: usize) -> Result<Vec<Product>, CatalogError> {
        let mut products = self.list_products().await?;
        products.truncate(limit);
        Ok(products)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        match self.products.get(id.as_str()).await {
            Ok(Some(doc)) => Ok(Product::from_document(id.as_str().to_owned(), doc)),
            Ok(None) | Err(RepositoryError::InvalidId(_)) => Err(CatalogError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let doc = ProductDocument {
            name: product.name,
            price: product.price,
            description: product.description,
            category: product.category,
            image: product.image,
            created_at: Utc::now(),
        };
        let id = self.products.insert(&doc).await?;
        Ok(Product::from_document(id, doc))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: i64) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            price: Decimal::new(price, 0),
            description: String::new(),
            category: "Hair".to_owned(),
            image: format!("/img/{name}.jpg"),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FileCatalog::open(dir.path()).await.unwrap();

        let created = catalog.create_product(new_product("Wig", 120)).await.unwrap();
        let fetched = catalog.get_product(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.price, Decimal::new(120, 0));
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FileCatalog::open(dir.path()).await.unwrap();

        let err = catalog
            .get_product(&ProductId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        let err = catalog
            .get_product(&ProductId::new("../etc"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_featured_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FileCatalog::open(dir.path()).await.unwrap();

        for i in 0..10 {
            catalog
                .create_product(new_product(&format!("p{i}"), i))
                .await
                .unwrap();
        }

        assert_eq!(catalog.list_products().await.unwrap().len(), 10);
        assert_eq!(
            catalog
                .featured_products(FEATURED_LIMIT)
                .await
                .unwrap()
                .len(),
            8
        );
    }

    #[tokio::test]
    async fn test_reads_hand_written_document() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FileCatalog::open(dir.path()).await.unwrap();

        tokio::fs::write(
            dir.path().join(PRODUCTS_COLLECTION).join("abc.json"),
            r#"{"name":"Serum","price":"35.5","createdAt":"2025-01-01T00:00:00Z"}"#,
        )
        .await
        .unwrap();

        let product = catalog.get_product(&ProductId::new("abc")).await.unwrap();
        assert_eq!(product.price, Decimal::new(355, 1));
        assert_eq!(product.category, "");
    }

    #[test]
    fn test_to_cart_candidate() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Shirt".to_owned(),
            price: Decimal::new(20, 0),
            description: String::new(),
            category: String::new(),
            image: "/a.jpg".to_owned(),
            created_at: Utc::now(),
        };

        let candidate = product.to_cart_candidate();
        assert_eq!(candidate.id, ProductId::new("p1"));
        assert_eq!(candidate.unit_price, Decimal::new(20, 0));
        assert_eq!(candidate.image_ref, "/a.jpg");
    }
}
