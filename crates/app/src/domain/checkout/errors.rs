//! Checkout errors.

use rust_decimal::Decimal;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use tessera::{
    cart::{InvalidCart, ProductId},
    orders::PlaceOrderError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    InvalidCart(#[from] InvalidCart),

    #[error("a valid e-mail address is required")]
    InvalidEmail,

    #[error("product {0} is no longer available")]
    UnknownProduct(ProductId),

    #[error("the price of {product} changed from {captured} to {current}")]
    PriceChanged {
        product: ProductId,
        captured: Decimal,
        current: Decimal,
    },

    #[error("not enough stock of {0}")]
    InsufficientStock(ProductId),

    #[error("coupon {0} does not exist")]
    UnknownCoupon(String),

    #[error("coupon {0} has no redemptions left")]
    CouponUsedUp(String),

    #[error(transparent)]
    PlaceOrder(#[from] PlaceOrderError),

    #[error("order number already in use")]
    DuplicateOrderNumber,

    #[error("stored data is inconsistent")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CheckoutError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateOrderNumber,
            Some(
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation,
            ) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
