//! Derived on-chain metrics engine.
//!
//! Read-side projections over the transaction log and live pool snapshots:
//! - Liquidity-weighted spot prices per token
//! - Windowed volume and TVL comparisons, daily TVL/volume history
//! - Historical execution-price series
//! - Baseline lookup and percent change
//! - Per-address balance history by backward replay
//! - Cache invalidation and notification on new log writes
//!
//! Every figure is recomputed from source data on request, subject to the
//! coarse aggregate cache.

/// Prelude module for convenient imports.
pub mod prelude;

/// Balance history replay.
pub mod balance_replay;
/// Baseline and percent-change resolution.
pub mod baseline;
/// Time source.
pub mod clock;
/// Engine configuration.
pub mod config;
/// Duplicate entry handling.
pub mod dedupe;
/// Engine errors.
pub mod error;
/// Cache invalidation on log writes.
pub mod invalidation;
/// Historical price series.
pub mod price_history;
/// Response shapes.
pub mod reports;
/// Request-level aggregation service.
pub mod service;
/// Daily TVL and volume history.
pub mod tvl_history;
/// Windowed volume sums.
pub mod volume;
/// Liquidity-weighted price aggregation.
pub mod weighted_price;

pub use clock::Clock;
pub use config::EngineConfig;
pub use error::MetricsError;
pub use invalidation::{InvalidationGate, TransactionNotification};
pub use service::MetricsService;
