//! API request and response models.
//!
//! Response bodies for the metric endpoints are the engine's report types;
//! this module holds the query strings, the record request and the
//! envelope types that only exist at the HTTP boundary.

use dex_metrics_domain::{
    DomainError, EpochMillis, StoredTransaction, TimeRange, TradeDirection, TransactionType,
    TxAmounts,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Cache bypass flag accepted by every read endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForceQuery {
    /// Recompute instead of serving a cached result.
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /tokens`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokensQuery {
    /// Case-insensitive match on symbol, name or category.
    pub q: Option<String>,
    /// Page size, capped at the configured maximum.
    pub limit: Option<usize>,
    /// Rows to skip.
    pub offset: Option<usize>,
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /tokens/{category}/history`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// `1d`, `7d`, `30d`, `90d`, `1y` or `all`; defaults to `7d`.
    pub range: Option<String>,
    /// Append the current price as the last point; defaults to true.
    pub live: Option<bool>,
    #[serde(default)]
    pub force: bool,
}

/// Query for `GET /stats/tvl-volume`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// `1d`, `7d`, `30d`, `90d`, `1y` or `all`; defaults to `7d`.
    pub range: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Parses an optional range string, defaulting to a week.
///
/// # Errors
/// Returns `UnknownRange` for an unrecognised value.
pub fn parse_range(raw: Option<&str>) -> Result<TimeRange, DomainError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(value) => TimeRange::from_str(value),
        None => Ok(TimeRange::default()),
    }
}

/// Body of `POST /transactions`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    pub txid: String,
    pub address: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default)]
    pub direction: Option<TradeDirection>,
    #[serde(default)]
    pub token_category: Option<String>,
    #[serde(default)]
    pub amounts: Option<TxAmounts>,
    /// Epoch milliseconds; server time when omitted. Must not predate
    /// 2017-08-01 or run more than five minutes ahead of the server.
    #[serde(default)]
    pub created_at: Option<EpochMillis>,
}

impl RecordTransactionRequest {
    /// Builds the log entry, stamping `now` when no timestamp was sent.
    #[must_use]
    pub fn into_entry(self, now: EpochMillis) -> StoredTransaction {
        StoredTransaction {
            txid: self.txid.trim().to_string(),
            address: self.address.trim().to_string(),
            tx_type: self.tx_type,
            direction: self.direction,
            token_category: self.token_category.map(|c| c.trim().to_string()),
            amounts: self.amounts,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}
