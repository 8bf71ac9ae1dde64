use std::io::Write;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use tessera::money::to_money;
use tessera_app::{
    config::{DatabaseConfig, LoggingConfig},
    database::{self, Db},
    observability::init_logging,
};

mod coupon;
mod migrate;
mod order;
mod product;
mod quote;
#[cfg(test)]
mod test_helpers;

#[derive(Debug, Parser)]
#[command(name = "tessera-app", about = "Tessera back-office CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a checkout scenario described in YAML
    Quote(quote::QuoteArgs),
    Order(order::OrderCommand),
    Coupon(coupon::CouponCommand),
    Product(product::ProductCommand),
    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Parse flags, falling back to the environment and `.env`.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self, out: &mut impl Write) -> Result<(), String> {
        init_logging(&self.logging).map_err(|error| error.to_string())?;

        match self.command {
            Commands::Quote(args) => quote::run(&args, out),
            Commands::Order(command) => order::run(command, out).await,
            Commands::Coupon(command) => coupon::run(command, out).await,
            Commands::Product(command) => product::run(command, out).await,
            Commands::Migrate(args) => migrate::run(args, out).await,
        }
    }
}

async fn connect(config: &DatabaseConfig) -> Result<Db, String> {
    let pool = database::connect(&config.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(Db::new(pool))
}

fn money(amount: Decimal, currency: &'static Currency) -> String {
    to_money(amount, currency).to_string()
}

/// Build a table with the house style; columns listed in `numeric` are right aligned.
fn table<R, I>(header: &[&str], rows: R, numeric: &[usize]) -> Table
where
    R: IntoIterator<Item = I>,
    I: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();

    builder.push_record(header.iter().map(ToString::to_string));

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());

    for &column in numeric {
        table.modify(Columns::new(column..=column), Alignment::right());
    }

    table
}

fn write_line(out: &mut impl Write, line: impl std::fmt::Display) -> Result<(), String> {
    writeln!(out, "{line}").map_err(|error| format!("failed to write output: {error}"))
}
