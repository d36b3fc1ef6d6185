//! Repository implementations for database persistence.
//!
//! This module provides the PostgreSQL-backed transaction log and the
//! read side of the pool snapshot table.

mod pool_repository;
mod transaction_repository;

pub use pool_repository::PgPoolRegistry;
pub use transaction_repository::PgTransactionLog;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// Creates a new Database wrapper from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Creates a new database connection from a connection string.
    ///
    /// Connection acquisition is bounded by `acquire_timeout` so that a
    /// saturated pool fails a request instead of stalling it.
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        info!(max_connections, "Connected to database");
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a transaction log repository.
    #[must_use]
    pub fn transactions(&self) -> PgTransactionLog {
        PgTransactionLog::new(self.pool.clone())
    }

    /// Creates a pool snapshot repository.
    #[must_use]
    pub fn pools(&self) -> PgPoolRegistry {
        PgPoolRegistry::new(self.pool.clone())
    }

    /// Runs database migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(include_str!("../../migrations/001_initial_schema.sql"))
            .execute(self.pool.as_ref())
            .await?;
        info!("Database schema is up to date");
        Ok(())
    }
}
