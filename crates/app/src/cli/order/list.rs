use std::io::Write;

use clap::Args;
use tessera::orders::{OrderStatus, revenue};
use tessera_app::{
    config::DatabaseConfig,
    domain::orders::{OrdersService, PgOrdersService},
};

#[derive(Debug, Args)]
pub(crate) struct ListOrdersArgs {
    /// Only list orders in this status
    #[arg(long)]
    status: Option<OrderStatus>,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: ListOrdersArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgOrdersService::new(db), args.status, out).await
}

async fn execute(
    orders: &dyn OrdersService,
    status: Option<OrderStatus>,
    out: &mut impl Write,
) -> Result<(), String> {
    let records = orders
        .list_orders(status)
        .await
        .map_err(|error| format!("failed to list orders: {error}"))?;

    let Some(first) = records.first() else {
        return crate::cli::write_line(out, "no orders found");
    };

    let currency = first.order.currency();

    let table = crate::cli::table(
        &["Order", "Status", "Payment", "Customer", "Placed", "Total"],
        records.iter().map(|record| {
            let order = &record.order;

            [
                order.number().to_string(),
                order.status().to_string(),
                order.payment_status().to_string(),
                order.customer_email().to_string(),
                order.placed_at().to_string(),
                crate::cli::money(order.totals().total, order.currency()),
            ]
        }),
        &[5],
    )
    .to_string();

    crate::cli::write_line(out, table)?;

    crate::cli::write_line(
        out,
        format!(
            "revenue: {}",
            crate::cli::money(revenue(records.iter().map(|record| &record.order)), currency)
        ),
    )
}
