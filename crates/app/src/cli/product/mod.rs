use std::io::Write;

use clap::{Args, Subcommand};
use tessera_app::domain::products::models::Product;

mod create;
mod list;
mod restock;

#[derive(Debug, Args)]
pub(crate) struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// Add a product to the catalog
    Create(create::CreateProductArgs),
    /// List the catalog with stock levels
    List(list::ListProductsArgs),
    /// Add units to a product's stock
    Restock(restock::RestockArgs),
}

pub(crate) async fn run(command: ProductCommand, out: &mut impl Write) -> Result<(), String> {
    match command.command {
        ProductSubcommand::Create(args) => create::run(args, out).await,
        ProductSubcommand::List(args) => list::run(args, out).await,
        ProductSubcommand::Restock(args) => restock::run(args, out).await,
    }
}

fn write_product(product: &Product, out: &mut impl Write) -> Result<(), String> {
    for line in [
        format!("sku: {}", product.sku),
        format!("product_uuid: {}", product.uuid),
        format!("name: {}", product.name),
        format!("price: {}", product.price),
        format!("stock: {}", product.stock),
    ] {
        crate::cli::write_line(out, line)?;
    }

    Ok(())
}
