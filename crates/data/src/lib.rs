//! Source-data access for the DEX metrics engine.
//!
//! This crate defines the collaborator boundaries the engine reads from and
//! writes to, together with their implementations:
//! - PostgreSQL repositories for the transaction log and pool snapshots
//! - An HTTP reader for live address balances
//! - In-memory stores for tests and local runs
//! - The process-wide aggregate cache
//! - Notification publishers (in-process broadcast, webhook)

/// Process-wide aggregate cache.
pub mod cache;
/// Data-layer errors.
pub mod error;
/// Transaction log query model.
pub mod filter;
/// In-memory source implementations.
pub mod memory;
/// External HTTP providers.
pub mod providers;
/// Notification publishers.
pub mod publisher;
/// Repository implementations for database persistence.
pub mod repositories;
/// Collaborator traits.
pub mod sources;

pub use cache::MemoryAggregateCache;
pub use error::DataError;
pub use filter::{SortOrder, TransactionFilter};
pub use publisher::{BroadcastPublisher, FanoutPublisher, Notification, WebhookPublisher};
pub use repositories::{Database, PgPoolRegistry, PgTransactionLog};
pub use sources::{
    AggregateCache, BalanceReader, NotificationPublisher, PoolRegistry, TransactionLog,
};
