use std::io::Write;

use clap::{Args, Subcommand};
use tessera_app::domain::coupons::models::CouponRecord;

mod create;
mod disable;
mod list;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Create a coupon
    Create(create::CreateCouponArgs),
    /// Stop a coupon from being applied
    Disable(disable::DisableCouponArgs),
    /// List all coupons
    List(list::ListCouponsArgs),
}

pub(crate) async fn run(command: CouponCommand, out: &mut impl Write) -> Result<(), String> {
    match command.command {
        CouponSubcommand::Create(args) => create::run(args, out).await,
        CouponSubcommand::Disable(args) => disable::run(args, out).await,
        CouponSubcommand::List(args) => list::run(args, out).await,
    }
}

fn write_coupon(record: &CouponRecord, out: &mut impl Write) -> Result<(), String> {
    let coupon = &record.coupon;

    for line in [
        format!("code: {}", coupon.code),
        format!("coupon_uuid: {}", record.uuid),
        format!("discount: {} {}", coupon.discount_value, coupon.discount_type),
        format!(
            "min_order_value: {}",
            coupon
                .min_order_value
                .map_or_else(|| "none".to_string(), |value| value.to_string())
        ),
        format!(
            "usage: {}/{}",
            coupon.used_count,
            coupon
                .usage_limit
                .map_or_else(|| "unlimited".to_string(), |limit| limit.to_string())
        ),
        format!(
            "expires_at: {}",
            coupon
                .expires_at
                .map_or_else(|| "never".to_string(), |value| value.to_string())
        ),
        format!("status: {}", coupon.status),
    ] {
        crate::cli::write_line(out, line)?;
    }

    Ok(())
}
