use std::io::Write;

use clap::Args;
use tessera_app::{config::DatabaseConfig, database};
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct MigrateArgs {
    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: MigrateArgs, out: &mut impl Write) -> Result<(), String> {
    let db = super::connect(&args.database).await?;

    database::migrate(db.pool())
        .await
        .map_err(|error| format!("failed to apply migrations: {error}"))?;

    info!("migrations applied");

    super::write_line(out, "migrations applied")
}
