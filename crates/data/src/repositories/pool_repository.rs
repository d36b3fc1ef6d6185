//! Pool snapshot repository.

use crate::error::DataError;
use crate::sources::PoolRegistry;
use async_trait::async_trait;
use dex_metrics_domain::PoolSnapshot;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

/// Decodes a pool snapshot row.
fn from_row(row: &PgRow) -> Result<PoolSnapshot, sqlx::Error> {
    Ok(PoolSnapshot {
        pool_address: row.try_get("pool_address")?,
        pool_owner_key_hash: row.try_get("pool_owner_key_hash")?,
        token_category: row.try_get("token_category")?,
        token_symbol: row.try_get("token_symbol")?,
        token_name: row.try_get("token_name")?,
        token_icon_url: row.try_get("token_icon_url")?,
        bch_reserve: row.try_get("bch_reserve")?,
        token_reserve: row.try_get("token_reserve")?,
        token_price_in_bch: row.try_get("token_price_in_bch")?,
    })
}

/// Read side of the pool snapshot table maintained by the chain reader.
#[derive(Clone)]
pub struct PgPoolRegistry {
    pool: Arc<PgPool>,
}

impl PgPoolRegistry {
    /// Creates a new PgPoolRegistry.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolRegistry for PgPoolRegistry {
    async fn list_pools(&self) -> Result<Vec<PoolSnapshot>, DataError> {
        let rows = sqlx::query("SELECT * FROM pool_snapshots ORDER BY token_category, pool_address")
            .fetch_all(self.pool.as_ref())
            .await?;
        Ok(rows.iter().map(from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn pools_for_token(&self, category: &str) -> Result<Vec<PoolSnapshot>, DataError> {
        let rows = sqlx::query(
            "SELECT * FROM pool_snapshots WHERE token_category = $1 ORDER BY pool_address",
        )
        .bind(category)
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(rows.iter().map(from_row).collect::<Result<Vec<_>, _>>()?)
    }
}
