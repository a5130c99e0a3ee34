use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

pub mod ledger;
pub mod wallet;

pub use ledger::{PersistentLedger, SqliteLedger};

const CREATE_TABLES_SQL: &str = include_str!("../../migrations/create_tables.sql");

/// Open the SQLite pool and create tables
pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // Every in-memory connection is its own database, so keep those to one
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    create_tables(&pool).await?;
    info!("Database ready at {}", database_url);

    Ok(pool)
}

/// Create all database tables
async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(CREATE_TABLES_SQL).execute(pool).await?;
    Ok(())
}
