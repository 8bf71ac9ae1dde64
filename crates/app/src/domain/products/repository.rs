//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tessera::cart::ProductId;

use crate::{
    database::{count_to_i32, try_get_count},
    domain::products::models::{NewProduct, Product, ProductUuid},
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_PRODUCTS_BY_SKU_SQL: &str = include_str!("sql/get_products_by_sku.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const DEDUCT_STOCK_SQL: &str = include_str!("sql/deduct_stock.sql");
const RESTOCK_SQL: &str = include_str!("sql/restock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_products_by_sku(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        skus: &[ProductId],
    ) -> Result<Vec<Product>, sqlx::Error> {
        let skus: Vec<&str> = skus.iter().map(ProductId::as_str).collect();

        query_as::<Postgres, Product>(GET_PRODUCTS_BY_SKU_SQL)
            .bind(skus)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.sku.as_str())
            .bind(&product.name)
            .bind(product.price)
            .bind(count_to_i32(product.stock, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Take `quantity` units out of stock, only if that many are available.
    ///
    /// Returns the number of rows changed: zero when the product is unknown or short.
    pub(crate) async fn deduct_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: &ProductId,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEDUCT_STOCK_SQL)
            .bind(sku.as_str())
            .bind(count_to_i32(quantity, "stock")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn restock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: &ProductId,
        quantity: u32,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(RESTOCK_SQL)
            .bind(sku.as_str())
            .bind(count_to_i32(quantity, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            sku: ProductId::new(row.try_get::<String, _>("sku")?),
            name: row.try_get("name")?,
            price: row.try_get::<Decimal, _>("price")?,
            stock: try_get_count(row, "stock")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
