//! Checkout service.
//!
//! Places an order in a single transaction: the order row, its items and initial
//! history, the coupon redemption and the stock deductions either all commit or none do.
//! Coupon redemption and stock deduction are conditional updates, so two checkouts racing
//! for the last unit or the last redemption cannot both succeed.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use tessera::{
    cart::{CartLine, ProductId, validate_lines},
    coupons::normalize_code,
    orders::{Actor, Order, OrderLineItem, OrderNumber, PlaceOrder},
    pricing::{PricingConfig, quote},
};
use tracing::{info, instrument, warn};

use crate::{
    database::{Db, storage_now},
    domain::{
        checkout::{
            errors::CheckoutError,
            models::{CheckoutOutcome, CheckoutRequest},
        },
        coupons::repository::PgCouponsRepository,
        orders::{
            models::{NewOrder, OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        products::{models::Product, repository::PgProductsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCheckoutService {
    db: Db,
    pricing: PricingConfig,
    products_repository: PgProductsRepository,
    coupons_repository: PgCouponsRepository,
    orders_repository: PgOrdersRepository,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(db: Db, pricing: PricingConfig) -> Self {
        Self {
            db,
            pricing,
            products_repository: PgProductsRepository::new(),
            coupons_repository: PgCouponsRepository::new(),
            orders_repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    #[instrument(
        skip_all,
        fields(customer = %request.customer_email, lines = request.lines.len())
    )]
    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        validate_lines(&request.lines)?;

        let customer_email = request.customer_email.trim().to_string();

        if !customer_email.contains('@') {
            return Err(CheckoutError::InvalidEmail);
        }

        let mut tx = self.db.begin().await?;

        let skus: Vec<ProductId> = request
            .lines
            .iter()
            .map(|line| line.product_id.clone())
            .collect();

        let catalog: FxHashMap<ProductId, Product> = self
            .products_repository
            .get_products_by_sku(&mut tx, &skus)
            .await?
            .into_iter()
            .map(|product| (product.sku.clone(), product))
            .collect();

        let items = request
            .lines
            .iter()
            .map(|line| snapshot(&catalog, line))
            .collect::<Result<Vec<_>, _>>()?;

        let code = request
            .coupon_code
            .as_deref()
            .map(normalize_code)
            .filter(|code| !code.is_empty());

        let coupon = match code {
            Some(code) => match self.coupons_repository.get_coupon(&mut tx, &code).await {
                Ok(record) => Some(record.coupon),
                Err(sqlx::Error::RowNotFound) => return Err(CheckoutError::UnknownCoupon(code)),
                Err(error) => return Err(error.into()),
            },
            None => None,
        };

        let now = storage_now();
        let quote = quote(&request.lines, coupon.as_ref(), &self.pricing, now)?;

        if let Some(rejection) = &quote.coupon_rejection {
            warn!(%rejection, "coupon not applied");
        }

        let order = Order::place(
            PlaceOrder {
                number: OrderNumber::generate(now, rand::random()),
                customer_email: customer_email.clone(),
                shipping_address: request.shipping_address,
                payment_method: request.payment_method,
                items,
                coupon_code: quote.applied_coupon.clone(),
            },
            &quote.pricing,
            Actor::new(customer_email),
            now,
        )?;

        let new_order = NewOrder {
            uuid: OrderUuid::new(),
            order,
        };

        let updated_at = self
            .orders_repository
            .create_order(&mut tx, &new_order)
            .await?;

        if let Some(code) = &quote.applied_coupon
            && self.coupons_repository.redeem_coupon(&mut tx, code).await? == 0
        {
            warn!(code, "coupon used up during checkout");

            return Err(CheckoutError::CouponUsedUp(code.clone()));
        }

        for line in &request.lines {
            let rows_affected = self
                .products_repository
                .deduct_stock(&mut tx, &line.product_id, line.quantity)
                .await?;

            if rows_affected == 0 {
                warn!(sku = %line.product_id, "insufficient stock");

                return Err(CheckoutError::InsufficientStock(line.product_id.clone()));
            }
        }

        tx.commit().await?;

        info!(
            number = %new_order.order.number(),
            total = %new_order.order.totals().total,
            "order placed"
        );

        Ok(CheckoutOutcome {
            order: OrderRecord {
                uuid: new_order.uuid,
                order: new_order.order,
                updated_at,
            },
            coupon_rejection: quote.coupon_rejection,
        })
    }
}

/// Snapshot a cart line against the live catalog, refusing lines whose captured price no
/// longer matches.
fn snapshot(
    catalog: &FxHashMap<ProductId, Product>,
    line: &CartLine,
) -> Result<OrderLineItem, CheckoutError> {
    let product = catalog
        .get(&line.product_id)
        .ok_or_else(|| CheckoutError::UnknownProduct(line.product_id.clone()))?;

    if product.price != line.unit_price {
        return Err(CheckoutError::PriceChanged {
            product: line.product_id.clone(),
            captured: line.unit_price,
            current: product.price,
        });
    }

    Ok(OrderLineItem::snapshot(line, product.name.clone()))
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Prices the cart, places the order, redeems the coupon and deducts stock.
    ///
    /// A coupon that cannot be applied is ignored and reported in the outcome; the order
    /// is placed without a discount.
    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError>;
}
