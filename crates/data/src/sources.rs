//! Collaborator boundaries consumed by the metrics engine.

use crate::error::DataError;
use crate::filter::TransactionFilter;
use async_trait::async_trait;
use dex_metrics_domain::{LiveBalance, PoolSnapshot, StoredTransaction};

/// Read access to current AMM pool snapshots.
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    /// Every known pool.
    async fn list_pools(&self) -> Result<Vec<PoolSnapshot>, DataError>;

    /// Pools trading the given token category.
    async fn pools_for_token(&self, category: &str) -> Result<Vec<PoolSnapshot>, DataError>;
}

/// The append-only transaction log.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Entries matching `filter`, in the filter's order.
    async fn find(&self, filter: &TransactionFilter) -> Result<Vec<StoredTransaction>, DataError>;

    /// Appends one entry.
    async fn insert(&self, entry: &StoredTransaction) -> Result<(), DataError>;
}

/// Live balance lookup for an address.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Current BCH and token holdings of `address`.
    async fn balances_for(&self, address: &str) -> Result<LiveBalance, DataError>;
}

/// Coarse cache of computed aggregates.
///
/// Values are stored together with the generation observed when their
/// computation started; `invalidate_all` starts a new generation so that
/// results computed before it are never stored afterwards.
#[async_trait]
pub trait AggregateCache: Send + Sync {
    /// Current generation.
    async fn generation(&self) -> u64;

    /// Cached value for `key`, if present and fresh.
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Stores `value` if `generation` is still current. Returns whether it was stored.
    async fn put(&self, key: &str, value: serde_json::Value, generation: u64) -> bool;

    /// Drops every entry and starts a new generation.
    async fn invalidate_all(&self);
}

/// Pub/sub notification sink.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publishes `payload` on `channel`.
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> Result<(), DataError>;
}
