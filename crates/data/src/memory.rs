//! In-memory collaborators.
//!
//! Used by the test suites and for running the API without a database.

use crate::error::DataError;
use crate::filter::TransactionFilter;
use crate::sources::{BalanceReader, PoolRegistry, TransactionLog};
use async_trait::async_trait;
use dex_metrics_domain::{LiveBalance, PoolSnapshot, StoredTransaction};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Transaction log held in a vector.
#[derive(Clone, Default)]
pub struct InMemoryTransactionLog {
    entries: Arc<RwLock<Vec<StoredTransaction>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryTransactionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log pre-filled with `entries`.
    #[must_use]
    pub fn with_entries(entries: Vec<StoredTransaction>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Makes every subsequent call fail, simulating an outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DataError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DataError::Unavailable("transaction log".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionLog for InMemoryTransactionLog {
    async fn find(&self, filter: &TransactionFilter) -> Result<Vec<StoredTransaction>, DataError> {
        self.check_available()?;
        Ok(filter.apply(self.entries.read().await.iter()))
    }

    async fn insert(&self, entry: &StoredTransaction) -> Result<(), DataError> {
        self.check_available()?;
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}

/// Pool registry backed by a replaceable list.
#[derive(Clone, Default)]
pub struct InMemoryPoolRegistry {
    pools: Arc<RwLock<Vec<PoolSnapshot>>>,
}

impl InMemoryPoolRegistry {
    /// Creates a registry holding `pools`.
    #[must_use]
    pub fn new(pools: Vec<PoolSnapshot>) -> Self {
        Self {
            pools: Arc::new(RwLock::new(pools)),
        }
    }

    /// Replaces every snapshot.
    pub async fn set_pools(&self, pools: Vec<PoolSnapshot>) {
        *self.pools.write().await = pools;
    }
}

#[async_trait]
impl PoolRegistry for InMemoryPoolRegistry {
    async fn list_pools(&self) -> Result<Vec<PoolSnapshot>, DataError> {
        Ok(self.pools.read().await.clone())
    }

    async fn pools_for_token(&self, category: &str) -> Result<Vec<PoolSnapshot>, DataError> {
        Ok(self
            .pools
            .read()
            .await
            .iter()
            .filter(|p| p.token_category == category)
            .cloned()
            .collect())
    }
}

/// Balance reader answering from a fixed table. Unknown addresses hold nothing.
#[derive(Clone, Default)]
pub struct StaticBalanceReader {
    balances: Arc<RwLock<HashMap<String, LiveBalance>>>,
}

impl StaticBalanceReader {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the live balance of `address`.
    pub async fn set_balance(&self, address: impl Into<String>, balance: LiveBalance) {
        self.balances.write().await.insert(address.into(), balance);
    }
}

#[async_trait]
impl BalanceReader for StaticBalanceReader {
    async fn balances_for(&self, address: &str) -> Result<LiveBalance, DataError> {
        Ok(self
            .balances
            .read()
            .await
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_metrics_domain::{TradeDirection, TransactionType, TxAmounts};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_insert_then_find() {
        let log = InMemoryTransactionLog::new();
        let tx = StoredTransaction::swap(
            "t1",
            "addr",
            "cat",
            TradeDirection::TokenToBch,
            TxAmounts::token_to_bch(dec!(10), dec!(1)),
            5,
        );
        log.insert(&tx).await.unwrap();

        let found = log
            .find(&TransactionFilter::new().of_type(TransactionType::Swap))
            .await
            .unwrap();
        assert_eq!(found, vec![tx]);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn test_unavailable_log_fails() {
        let log = InMemoryTransactionLog::new();
        log.set_unavailable(true);
        let err = log.find(&TransactionFilter::new()).await.unwrap_err();
        assert!(matches!(err, DataError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_pools_for_token() {
        let registry = InMemoryPoolRegistry::new(vec![
            PoolSnapshot::new("p1", "a", dec!(1), dec!(10), dec!(0.1)),
            PoolSnapshot::new("p2", "b", dec!(1), dec!(10), dec!(0.1)),
        ]);
        let pools = registry.pools_for_token("a").await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].pool_address, "p1");
    }

    #[tokio::test]
    async fn test_unknown_address_is_empty() {
        let reader = StaticBalanceReader::new();
        let balance = reader.balances_for("nobody").await.unwrap();
        assert!(balance.bch.is_zero());
        assert!(balance.tokens.is_empty());
    }
}
