use std::io::Write;

use clap::Args;
use tessera::coupons::CouponStatus;
use tessera_app::{
    config::DatabaseConfig,
    domain::coupons::{CouponsService, PgCouponsService},
};

#[derive(Debug, Args)]
pub(crate) struct DisableCouponArgs {
    /// Coupon code, any case
    code: String,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: DisableCouponArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgCouponsService::new(db), &args.code, out).await
}

async fn execute(
    coupons: &dyn CouponsService,
    code: &str,
    out: &mut impl Write,
) -> Result<(), String> {
    let record = coupons
        .set_coupon_status(code, CouponStatus::Inactive)
        .await
        .map_err(|error| format!("failed to disable coupon {code}: {error}"))?;

    super::write_coupon(&record, out)
}
