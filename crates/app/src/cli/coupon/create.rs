use std::io::Write;

use clap::Args;
use jiff::Timestamp;
use rust_decimal::Decimal;
use tessera::coupons::{Coupon, DiscountType};
use tessera_app::{
    config::DatabaseConfig,
    domain::coupons::{
        CouponsService, PgCouponsService,
        models::{CouponUuid, NewCoupon},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// Code customers enter at checkout; stored upper-case
    #[arg(long)]
    code: String,

    /// Discount type (percentage, fixed)
    #[arg(long = "type")]
    discount_type: DiscountType,

    /// Percentage (0-100) or fixed amount off
    #[arg(long)]
    value: Decimal,

    /// Minimum pre-discount subtotal
    #[arg(long)]
    min_order_value: Option<Decimal>,

    /// Maximum number of redemptions
    #[arg(long)]
    usage_limit: Option<u32>,

    /// Instant after which the coupon no longer applies, e.g. 2026-12-31T23:59:59Z
    #[arg(long)]
    expires_at: Option<Timestamp>,

    #[command(flatten)]
    database: DatabaseConfig,
}

impl CreateCouponArgs {
    fn to_coupon(&self) -> Coupon {
        Coupon {
            min_order_value: self.min_order_value,
            usage_limit: self.usage_limit,
            expires_at: self.expires_at,
            ..Coupon::new(&self.code, self.discount_type, self.value)
        }
    }
}

pub(crate) async fn run(args: CreateCouponArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgCouponsService::new(db), &args, out).await
}

async fn execute(
    coupons: &dyn CouponsService,
    args: &CreateCouponArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let record = coupons
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            coupon: args.to_coupon(),
        })
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    super::write_coupon(&record, out)
}
