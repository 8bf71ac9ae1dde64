use std::io::Write;

use clap::Args;
use tessera::cart::ProductId;
use tessera_app::{
    config::DatabaseConfig,
    domain::products::{PgProductsService, ProductsService},
};

#[derive(Debug, Args)]
pub(crate) struct RestockArgs {
    sku: String,

    /// Units to add
    quantity: u32,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: RestockArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgProductsService::new(db), &args, out).await
}

async fn execute(
    products: &dyn ProductsService,
    args: &RestockArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let sku = ProductId::new(args.sku.trim());

    let product = products
        .restock(&sku, args.quantity)
        .await
        .map_err(|error| format!("failed to restock {sku}: {error}"))?;

    super::write_product(&product, out)
}
