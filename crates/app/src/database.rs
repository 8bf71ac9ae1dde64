//! Database connection management

use std::{error::Error as StdError, str::FromStr};

use jiff::Timestamp;
use sqlx::{PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow};

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// The current time at the precision `TIMESTAMPTZ` stores, so values read back compare
/// equal to the ones written.
pub(crate) fn storage_now() -> Timestamp {
    let now = Timestamp::now();

    Timestamp::from_microsecond(now.as_microsecond()).unwrap_or(now)
}

/// Read a text column and parse it, e.g. a status stored as its string form.
pub(crate) fn try_get_parsed<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;

    raw.parse().map_err(|error| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    })
}

/// Read an `INTEGER` column that must not be negative.
pub(crate) fn try_get_count(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|error| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    })
}

/// Read a nullable `INTEGER` column that must not be negative.
pub(crate) fn try_get_optional_count(row: &PgRow, column: &str) -> sqlx::Result<Option<u32>> {
    let value: Option<i32> = row.try_get(column)?;

    value
        .map(u32::try_from)
        .transpose()
        .map_err(|error| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(error),
        })
}

/// Convert a count for binding to an `INTEGER` column.
pub(crate) fn count_to_i32(value: u32, column: &str) -> sqlx::Result<i32> {
    i32::try_from(value).map_err(|error| sqlx::Error::Encode(Box::new(ColumnOverflow {
        column: column.to_string(),
        source: error,
    })))
}

#[derive(Debug, thiserror::Error)]
#[error("value for {column} does not fit the column")]
struct ColumnOverflow {
    column: String,
    #[source]
    source: std::num::TryFromIntError,
}
