//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tessera::coupons::{Coupon, CouponStatus};

use crate::{
    database::{count_to_i32, try_get_count, try_get_optional_count, try_get_parsed},
    domain::coupons::models::{CouponRecord, CouponUuid, NewCoupon},
};

const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");
const GET_COUPON_SQL: &str = include_str!("sql/get_coupon.sql");
const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const SET_COUPON_STATUS_SQL: &str = include_str!("sql/set_coupon_status.sql");
const REDEEM_COUPON_SQL: &str = include_str!("sql/redeem_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(LIST_COUPONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    /// Look up a coupon by its normalised code.
    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let NewCoupon { uuid, coupon } = coupon;

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(uuid.into_uuid())
            .bind(&coupon.code)
            .bind(coupon.discount_type.as_str())
            .bind(coupon.discount_value)
            .bind(coupon.min_order_value)
            .bind(
                coupon
                    .usage_limit
                    .map(|limit| count_to_i32(limit, "usage_limit"))
                    .transpose()?,
            )
            .bind(count_to_i32(coupon.used_count, "used_count")?)
            .bind(coupon.expires_at.map(SqlxTimestamp::from))
            .bind(coupon.status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_coupon_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        status: CouponStatus,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(SET_COUPON_STATUS_SQL)
            .bind(code)
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Count one redemption, only if the coupon is still under its usage limit.
    ///
    /// Returns the number of rows changed: zero when the coupon is unknown or used up.
    pub(crate) async fn redeem_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REDEEM_COUPON_SQL)
            .bind(code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let coupon = Coupon {
            code: row.try_get("code")?,
            discount_type: try_get_parsed(row, "discount_type")?,
            discount_value: row.try_get("discount_value")?,
            min_order_value: row.try_get("min_order_value")?,
            usage_limit: try_get_optional_count(row, "usage_limit")?,
            used_count: try_get_count(row, "used_count")?,
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            status: try_get_parsed(row, "status")?,
        };

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            coupon,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
