//! Postgres access for the local restaurant store.
//!
//! The schema is owned elsewhere; this crate only opens pools and reads.

use std::time::Duration;

use dinescope_core::AppConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub mod restaurants;

pub use restaurants::{list_restaurants_in_box, RestaurantRow};

/// Pool bounds. Defaults match the `DINESCOPE_DB_*` config defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }

    fn options(self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Open a pool and establish its first connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the database cannot be reached.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    config.options().connect(database_url).await
}

/// Build a pool that opens connections on first use.
///
/// An unreachable database surfaces as a query error rather than at startup.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if `database_url` cannot be parsed.
pub fn connect_pool_lazy(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    config.options().connect_lazy(database_url)
}

/// Connect using the URL and pool bounds carried by `config`.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if no database is configured, or
/// [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or(DbError::MissingDatabaseUrl)?;
    Ok(connect_pool(database_url, PoolConfig::from_app_config(config)).await?)
}

/// Round-trip `SELECT 1` on the pool.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// [`ping`], then confirm the `restaurants` table is readable.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    sqlx::query_scalar::<_, i64>("SELECT count(*) FROM (SELECT 1 FROM restaurants LIMIT 1) probe")
        .fetch_one(pool)
        .await?;
    Ok(())
}
