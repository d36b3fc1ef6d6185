//! OpenAPI documentation configuration.
//!
//! The document is generated with utoipa and served at
//! `/api/v1/openapi.json`.

use crate::handlers;
use crate::models::{ErrorResponse, HealthResponse, RecordTransactionRequest};
use dex_metrics_domain::{
    BalancePoint, PricePoint, StoredTransaction, TimeRange, TradeDirection, TransactionType,
    TvlVolumePoint, TxAmounts,
};
use dex_metrics_engine::balance_replay::BalanceHistory;
use dex_metrics_engine::invalidation::TransactionNotification;
use dex_metrics_engine::reports::{
    PriceHistory, TokenOverview, TokenPrice, TokensOverview, TvlVolumeHistory, VolumeStats,
};
use utoipa::OpenApi;

/// OpenAPI documentation structure.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "DEX Metrics API",
        description = "Derived on-chain metrics for a BCH automated-market-maker exchange: \
                       token prices, price history, TVL and volume, address balance history.",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Tokens", description = "Token prices and history"),
        (name = "Stats", description = "Platform TVL and volume"),
        (name = "Addresses", description = "Address balance history"),
        (name = "Transactions", description = "Transaction log writes and notifications")
    ),
    paths(
        handlers::health_check,
        handlers::get_token_price,
        handlers::list_tokens,
        handlers::get_token_history,
        handlers::get_tvl_volume,
        handlers::get_volume_stats,
        handlers::get_balance_history,
        handlers::record_transaction,
        handlers::events,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            RecordTransactionRequest,
            StoredTransaction,
            TxAmounts,
            TransactionType,
            TradeDirection,
            TimeRange,
            TokenPrice,
            TokenOverview,
            TokensOverview,
            PriceHistory,
            PricePoint,
            TvlVolumeHistory,
            TvlVolumePoint,
            VolumeStats,
            BalanceHistory,
            BalancePoint,
            TransactionNotification,
        )
    )
)]
pub struct ApiDoc;

/// Returns the OpenAPI JSON specification.
#[must_use]
pub fn openapi_json() -> String {
    ApiDoc::openapi().to_pretty_json().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let json = openapi_json();
        assert!(json.contains("DEX Metrics API"));
        assert!(json.contains("/tokens/{category}/history"));
        assert!(json.contains("TokensOverview"));
    }
}
