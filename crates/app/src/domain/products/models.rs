//! Product Models

use jiff::Timestamp;
use rust_decimal::Decimal;
use tessera::cart::ProductId;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub uuid: ProductUuid,
    pub sku: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub sku: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
}
