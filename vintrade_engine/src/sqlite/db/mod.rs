//! # SQLite database methods
//!
//! Low-level SQLite interactions, written as plain functions that accept a `&mut SqliteConnection`. Callers take a
//! connection from the pool, or open a transaction and pass `&mut tx`, without any other changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod demand_orders;
pub mod quotes;

const SQLITE_DB_URL: &str = "sqlite://data/vintrade.db";

/// SQLite limits the number of bound parameters per statement. `IN (...)` lookups are split into chunks of this size.
pub(crate) const MAX_IN_LIST: usize = 500;

/// Takes the row produced by an `INSERT .. RETURNING` statement.
///
/// The statement only completes, and its implicit transaction only commits, once every row has been stepped. Such
/// statements are therefore read with `fetch_all` and never with `fetch_one`, which leaves the statement pending and
/// the insert invisible to other connections.
pub(crate) fn returned_row<T>(rows: Vec<T>) -> Result<T, SqlxError> {
    rows.into_iter().next().ok_or(SqlxError::RowNotFound)
}

pub fn db_url() -> String {
    let result = env::var("VT_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ VT_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
