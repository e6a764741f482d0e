use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod ratings;
pub mod users;

/// Opens the report database file, creating it on first run.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url: {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .context("connect database failed")
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Startup initialization: create all tables, then seed the fixed rating rows.
pub async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
    migrate(pool).await?;
    ratings::seed_defaults(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database.
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse memory url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("open in-memory sqlite");

    init(&pool).await.expect("init schema");
    pool
}
