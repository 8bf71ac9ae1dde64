use std::io::Write;

use clap::Args;
use tessera_app::{
    config::DatabaseConfig,
    domain::products::{PgProductsService, ProductsService},
};

#[derive(Debug, Args)]
pub(crate) struct ListProductsArgs {
    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: ListProductsArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgProductsService::new(db), out).await
}

async fn execute(products: &dyn ProductsService, out: &mut impl Write) -> Result<(), String> {
    let catalog = products
        .list_products()
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    if catalog.is_empty() {
        return crate::cli::write_line(out, "no products found");
    }

    let table = crate::cli::table(
        &["SKU", "Name", "Price", "Stock"],
        catalog.iter().map(|product| {
            [
                product.sku.to_string(),
                product.name.clone(),
                product.price.to_string(),
                product.stock.to_string(),
            ]
        }),
        &[2, 3],
    );

    crate::cli::write_line(out, table)
}
