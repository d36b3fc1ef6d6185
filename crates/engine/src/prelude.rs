//! Prelude module for convenient imports.

pub use crate::balance_replay::{BalanceHistory, replay_balance_history, value_holdings};
pub use crate::baseline::{baseline_price_since, change_since, percent_change};
pub use crate::clock::Clock;
pub use crate::config::EngineConfig;
pub use crate::error::MetricsError;
pub use crate::invalidation::{InvalidationGate, TransactionNotification};
pub use crate::price_history::{
    SeriesOptions, append_live_point, build_price_series, execution_price, initial_price,
};
pub use crate::reports::{
    OverviewQuery, PriceHistory, TokenOverview, TokenPrice, TokensOverview, TvlVolumeHistory,
    VolumeStats,
};
pub use crate::service::MetricsService;
pub use crate::tvl_history::{build_tvl_volume_history, liquidity_delta_bch, tvl_at};
pub use crate::volume::{WindowComparison, compare_windows, swap_volume_bch};
pub use crate::weighted_price::{TokenAggregate, aggregate_by_token, aggregate_token, weighted_price};
