use std::io::Write;

use clap::Args;
use tessera::orders::OrderNumber;
use tessera_app::{
    config::DatabaseConfig,
    domain::orders::{OrdersService, PgOrdersService},
};

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    /// Order number, e.g. TS-20261018-4F2A9C
    number: OrderNumber,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: ShowOrderArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgOrdersService::new(db), &args.number, out).await
}

async fn execute(
    orders: &dyn OrdersService,
    number: &OrderNumber,
    out: &mut impl Write,
) -> Result<(), String> {
    let record = orders
        .get_order_by_number(number)
        .await
        .map_err(|error| format!("failed to load order {number}: {error}"))?;

    super::write_order(&record, out)
}
