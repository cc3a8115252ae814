//! Shared database connection helpers for Nexo

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

/// Maximum pooled connections per process
const MAX_CONNECTIONS: u32 = 10;

/// How long to wait for the server before giving up on a connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Build connect options from a URL, optionally overriding the database name.
pub fn connect_options(
    database_url: &str,
    database_name: Option<&str>,
) -> Result<PgConnectOptions, sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url)?;
    Ok(match database_name {
        Some(name) => options.database(name),
        None => options,
    })
}

/// Open a connection pool and verify the server is reachable.
///
/// Fails if no connection can be established; callers treat this as fatal.
pub async fn connect(database_url: &str, database_name: Option<&str>) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(database_url, database_name)?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;

    tracing::info!(database = ?database_name, "Database connection pool established");
    Ok(pool)
}
