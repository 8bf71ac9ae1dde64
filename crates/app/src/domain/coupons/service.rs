//! Coupons service.

use async_trait::async_trait;
use mockall::automock;
use tessera::coupons::{CouponStatus, normalize_code};
use tracing::{info, instrument, warn};

use crate::{
    database::Db,
    domain::coupons::{
        errors::CouponsServiceError,
        models::{CouponRecord, NewCoupon},
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    async fn list_coupons(&self) -> Result<Vec<CouponRecord>, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupons = self.repository.list_coupons(&mut tx).await?;

        tx.commit().await?;

        Ok(coupons)
    }

    async fn get_coupon(&self, code: &str) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = self
            .repository
            .get_coupon(&mut tx, &normalize_code(code))
            .await?;

        tx.commit().await?;

        Ok(coupon)
    }

    #[instrument(skip(self, coupon), fields(code = %coupon.coupon.code))]
    async fn create_coupon(&self, mut coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        coupon.coupon.code = normalize_code(&coupon.coupon.code);
        coupon.coupon.validate()?;

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_coupon(&mut tx, &coupon).await?;

        tx.commit().await?;

        info!("coupon created");

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn set_coupon_status(
        &self,
        code: &str,
        status: CouponStatus,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .set_coupon_status(&mut tx, &normalize_code(code), status)
            .await?;

        tx.commit().await?;

        info!("coupon status changed");

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn redeem_coupon(&self, code: &str) -> Result<(), CouponsServiceError> {
        let code = normalize_code(code);
        let mut tx = self.db.begin().await?;

        if self.repository.redeem_coupon(&mut tx, &code).await? == 0 {
            // Distinguish an unknown code from one that is used up.
            self.repository.get_coupon(&mut tx, &code).await?;

            warn!("coupon redemption refused");

            return Err(CouponsServiceError::UsageLimitReached(code));
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Retrieves all coupons, ordered by code.
    async fn list_coupons(&self) -> Result<Vec<CouponRecord>, CouponsServiceError>;

    /// Retrieve a coupon by the code a customer entered.
    async fn get_coupon(&self, code: &str) -> Result<CouponRecord, CouponsServiceError>;

    /// Validates and stores a new coupon. The code is stored upper-case.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Enables or disables a coupon.
    async fn set_coupon_status(
        &self,
        code: &str,
        status: CouponStatus,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Counts one redemption, failing once the usage limit is reached.
    async fn redeem_coupon(&self, code: &str) -> Result<(), CouponsServiceError>;
}
