//! Test context for service-level integration tests.

use rust_decimal_macros::dec;
use rusty_money::iso;
use tessera::pricing::PricingConfig;

use crate::{
    database::Db,
    domain::{
        checkout::PgCheckoutService, coupons::PgCouponsService, orders::PgOrdersService,
        products::PgProductsService,
    },
};

use super::db::TestDb;

/// Services wired to a fresh database, priced at 23% tax with free shipping above 100 PLN
/// and a 10 PLN flat fee otherwise.
pub struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub coupons: PgCouponsService,
    pub orders: PgOrdersService,
    pub checkout: PgCheckoutService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            coupons: PgCouponsService::new(db.clone()),
            orders: PgOrdersService::new(db.clone()),
            checkout: PgCheckoutService::new(db, pricing_config()),
            db: test_db,
        }
    }
}

pub(crate) fn pricing_config() -> PricingConfig {
    PricingConfig::new(dec!(0.23), dec!(100), dec!(10), iso::PLN)
        .expect("Failed to build test pricing config")
}
