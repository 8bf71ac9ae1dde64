use std::io::Write;

use clap::Args;
use tessera_app::{
    config::DatabaseConfig,
    domain::coupons::{CouponsService, PgCouponsService},
};

#[derive(Debug, Args)]
pub(crate) struct ListCouponsArgs {
    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: ListCouponsArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgCouponsService::new(db), out).await
}

async fn execute(coupons: &dyn CouponsService, out: &mut impl Write) -> Result<(), String> {
    let records = coupons
        .list_coupons()
        .await
        .map_err(|error| format!("failed to list coupons: {error}"))?;

    if records.is_empty() {
        return crate::cli::write_line(out, "no coupons found");
    }

    let table = crate::cli::table(
        &["Code", "Type", "Value", "Min order", "Used", "Limit", "Expires", "Status"],
        records.iter().map(|record| {
            let coupon = &record.coupon;

            [
                coupon.code.clone(),
                coupon.discount_type.to_string(),
                coupon.discount_value.to_string(),
                coupon
                    .min_order_value
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
                coupon.used_count.to_string(),
                coupon
                    .usage_limit
                    .map(|limit| limit.to_string())
                    .unwrap_or_default(),
                coupon
                    .expires_at
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
                coupon.status.to_string(),
            ]
        }),
        &[2, 3, 4, 5],
    );

    crate::cli::write_line(out, table)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal_macros::dec;
    use tessera::coupons::{Coupon, DiscountType};
    use tessera_app::domain::coupons::{
        MockCouponsService,
        models::{CouponRecord, CouponUuid},
    };
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn lists_coupons_as_table() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_list_coupons().return_once(|| {
            Ok(vec![CouponRecord {
                uuid: CouponUuid::new(),
                coupon: Coupon::new("SPRING20", DiscountType::Percentage, dec!(20))
                    .with_usage_limit(50),
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
            }])
        });

        let mut out = Vec::new();

        execute(&coupons, &mut out).await?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("SPRING20"), "{output}");
        assert!(output.contains("percentage"), "{output}");
        assert!(output.contains("active"), "{output}");

        Ok(())
    }

    #[tokio::test]
    async fn empty_listing_says_so() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_list_coupons().return_once(|| Ok(Vec::new()));

        let mut out = Vec::new();

        execute(&coupons, &mut out).await?;

        assert_eq!(String::from_utf8(out)?, "no coupons found\n");

        Ok(())
    }
}
