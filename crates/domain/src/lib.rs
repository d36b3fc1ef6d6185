//! Domain model for the DEX metrics engine.
//!
//! This crate holds the types every other layer speaks:
//! - AMM pool snapshots as reported by the chain reader
//! - Stored transaction log entries and their trade direction
//! - Live address balances
//! - Derived, ephemeral points (price, balance, TVL/volume)
//! - Time ranges and epoch-millisecond helpers

/// Domain entities read from external collaborators.
pub mod entities;
/// Closed enumerations used across the model.
pub mod enums;
/// Domain errors.
pub mod error;
/// Epoch-millisecond time helpers.
pub mod time;
/// Derived values produced by the engine.
pub mod value_objects;

pub use entities::{LiveBalance, PoolSnapshot, StoredTransaction, TokenBalance, TxAmounts};
pub use enums::{TradeDirection, TransactionType, TvlConvention};
pub use error::DomainError;
pub use time::EpochMillis;
pub use value_objects::{BalancePoint, PricePoint, TimeRange, TvlVolumePoint};
