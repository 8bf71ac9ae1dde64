use std::io::Write;

use clap::Args;
use rust_decimal::Decimal;
use tessera::cart::ProductId;
use tessera_app::{
    config::DatabaseConfig,
    domain::products::{
        PgProductsService, ProductsService,
        models::{NewProduct, ProductUuid},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// Stock keeping unit, unique across the catalog
    #[arg(long)]
    sku: String,

    #[arg(long)]
    name: String,

    /// Unit price in the store currency
    #[arg(long)]
    price: Decimal,

    /// Units on hand
    #[arg(long, default_value_t = 0)]
    stock: u32,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: CreateProductArgs, out: &mut impl Write) -> Result<(), String> {
    let db = crate::cli::connect(&args.database).await?;

    execute(&PgProductsService::new(db), args, out).await
}

async fn execute(
    products: &dyn ProductsService,
    args: CreateProductArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let sku = args.sku.trim();

    if sku.is_empty() {
        return Err("sku cannot be empty".to_string());
    }

    let product = products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            sku: ProductId::new(sku),
            name: args.name,
            price: args.price,
            stock: args.stock,
        })
        .await
        .map_err(|error| format!("failed to create product {sku}: {error}"))?;

    super::write_product(&product, out)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal_macros::dec;
    use tessera_app::domain::products::{
        MockProductsService, ProductsServiceError, models::Product,
    };
    use testresult::TestResult;

    use super::*;

    fn args(sku: &str, price: Decimal) -> CreateProductArgs {
        CreateProductArgs {
            sku: sku.to_string(),
            name: "Terracotta floor tile 30x30".to_string(),
            price,
            stock: 40,
            database: DatabaseConfig {
                database_url: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn creates_product() -> TestResult {
        let mut products = MockProductsService::new();

        products
            .expect_create_product()
            .withf(|new| new.sku.as_str() == "TERRACOTTA-30" && new.stock == 40)
            .times(1)
            .return_once(|new| {
                Ok(Product {
                    uuid: new.uuid,
                    sku: new.sku,
                    name: new.name,
                    price: new.price,
                    stock: new.stock,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut out = Vec::new();

        execute(&products, args(" TERRACOTTA-30 ", dec!(10)), &mut out).await?;

        let output = String::from_utf8(out)?;

        assert!(output.starts_with("sku: TERRACOTTA-30\n"), "{output}");
        assert!(output.contains("stock: 40"), "{output}");

        Ok(())
    }

    #[tokio::test]
    async fn service_rejection_is_reported() {
        let mut products = MockProductsService::new();

        products
            .expect_create_product()
            .return_once(|_| Err(ProductsServiceError::NegativePrice));

        let result = execute(&products, args("BROKEN", dec!(-1)), &mut Vec::new()).await;

        assert!(
            matches!(&result, Err(message) if message.starts_with("failed to create product BROKEN")),
            "unexpected result: {result:?}"
        );
    }

    #[tokio::test]
    async fn blank_sku_is_rejected() {
        let products = MockProductsService::new();

        let result = execute(&products, args("  ", dec!(1)), &mut Vec::new()).await;

        assert_eq!(result, Err("sku cannot be empty".to_string()));
    }
}
