//! Products service.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use tessera::cart::ProductId;
use tracing::{instrument, warn};

use crate::{
    database::Db,
    domain::products::{
        errors::ProductsServiceError,
        models::{NewProduct, Product, ProductUuid},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(&self) -> Result<Vec<Product>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<Product, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn get_products_by_sku(
        &self,
        skus: &[ProductId],
    ) -> Result<Vec<Product>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.get_products_by_sku(&mut tx, skus).await?;

        tx.commit().await?;

        Ok(products)
    }

    #[instrument(skip(self, product), fields(sku = %product.sku))]
    async fn create_product(&self, product: NewProduct) -> Result<Product, ProductsServiceError> {
        if product.price < Decimal::ZERO {
            return Err(ProductsServiceError::NegativePrice);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, &product).await?;

        tx.commit().await?;

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn deduct_stock(&self, sku: &ProductId, quantity: u32) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.deduct_stock(&mut tx, sku, quantity).await?;

        if rows_affected == 0 {
            warn!("stock deduction refused");

            return Err(ProductsServiceError::InsufficientStock(sku.clone()));
        }

        tx.commit().await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn restock(&self, sku: &ProductId, quantity: u32) -> Result<Product, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.restock(&mut tx, sku, quantity).await?;

        tx.commit().await?;

        Ok(product)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves all products, ordered by SKU.
    async fn list_products(&self) -> Result<Vec<Product>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<Product, ProductsServiceError>;

    /// Retrieve the products with the given SKUs. Unknown SKUs are skipped.
    async fn get_products_by_sku(
        &self,
        skus: &[ProductId],
    ) -> Result<Vec<Product>, ProductsServiceError>;

    /// Adds a product to the catalog.
    async fn create_product(&self, product: NewProduct) -> Result<Product, ProductsServiceError>;

    /// Takes `quantity` units out of stock, failing rather than going below zero.
    async fn deduct_stock(&self, sku: &ProductId, quantity: u32) -> Result<(), ProductsServiceError>;

    /// Adds `quantity` units to stock.
    async fn restock(&self, sku: &ProductId, quantity: u32) -> Result<Product, ProductsServiceError>;
}
