//! Transaction log repository.

use crate::error::DataError;
use crate::filter::TransactionFilter;
use crate::sources::TransactionLog;
use async_trait::async_trait;
use dex_metrics_domain::{StoredTransaction, TradeDirection, TransactionType, TxAmounts};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::sync::Arc;
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT txid, address, type, direction, token_category, \
     bch_in, bch_out, token_in, token_out, created_at FROM transactions";

/// Decodes a transaction log row.
fn from_row(row: &PgRow) -> Result<StoredTransaction, DataError> {
    let tx_type: String = row.try_get("type")?;
    let tx_type: TransactionType = tx_type
        .parse()
        .map_err(|e| DataError::Corrupt(format!("{e}")))?;
    let direction: Option<String> = row.try_get("direction")?;
    let direction = direction
        .map(|d| d.parse::<TradeDirection>())
        .transpose()
        .map_err(|e| DataError::Corrupt(format!("{e}")))?;

    let amounts = TxAmounts {
        bch_in: row.try_get::<Option<Decimal>, _>("bch_in")?,
        bch_out: row.try_get::<Option<Decimal>, _>("bch_out")?,
        token_in: row.try_get::<Option<Decimal>, _>("token_in")?,
        token_out: row.try_get::<Option<Decimal>, _>("token_out")?,
    };
    let has_amounts = amounts != TxAmounts::default();

    Ok(StoredTransaction {
        txid: row.try_get("txid")?,
        address: row.try_get("address")?,
        tx_type,
        direction,
        token_category: row.try_get("token_category")?,
        amounts: has_amounts.then_some(amounts),
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL-backed transaction log.
#[derive(Clone)]
pub struct PgTransactionLog {
    pool: Arc<PgPool>,
}

impl PgTransactionLog {
    /// Creates a new PgTransactionLog.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn build_query(filter: &TransactionFilter) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        qb.push(" WHERE TRUE");

        if !filter.types.is_empty() {
            let types: Vec<String> = filter.types.iter().map(|t| t.as_str().to_string()).collect();
            qb.push(" AND type = ANY(").push_bind(types).push(")");
        }
        if let Some(category) = &filter.token_category {
            qb.push(" AND token_category = ").push_bind(category.as_str());
        }
        if let Some(address) = &filter.address {
            qb.push(" AND address = ").push_bind(address.as_str());
        }
        if let Some(from) = filter.created_from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(before) = filter.created_before {
            qb.push(" AND created_at < ").push_bind(before);
        }

        qb.push(" ORDER BY created_at ").push(filter.sort.sql());
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }
        qb
    }
}

#[async_trait]
impl TransactionLog for PgTransactionLog {
    async fn find(&self, filter: &TransactionFilter) -> Result<Vec<StoredTransaction>, DataError> {
        let mut qb = Self::build_query(filter);
        let rows = qb.build().fetch_all(self.pool.as_ref()).await?;
        debug!(rows = rows.len(), "Loaded transaction log entries");
        rows.iter().map(from_row).collect()
    }

    async fn insert(&self, entry: &StoredTransaction) -> Result<(), DataError> {
        let amounts = entry.legs();
        sqlx::query(
            r#"
            INSERT INTO transactions (txid, address, type, direction, token_category,
                                      bch_in, bch_out, token_in, token_out, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&entry.txid)
        .bind(&entry.address)
        .bind(entry.tx_type.as_str())
        .bind(entry.direction.map(|d| d.as_str()))
        .bind(entry.token_category.as_deref())
        .bind(amounts.bch_in)
        .bind(amounts.bch_out)
        .bind(amounts.token_in)
        .bind(amounts.token_out)
        .bind(entry.created_at)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }
}
