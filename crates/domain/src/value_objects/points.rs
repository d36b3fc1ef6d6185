use crate::time::EpochMillis;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A price observation for charting. Computed on request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub timestamp: EpochMillis,
    pub price_bch: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

impl PricePoint {
    /// Creates a point without volume.
    #[must_use]
    pub fn new(timestamp: EpochMillis, price_bch: Decimal) -> Self {
        Self {
            timestamp,
            price_bch,
            volume: None,
        }
    }
}

/// Valuation of an address at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub timestamp: EpochMillis,
    /// BCH plus every token holding valued at the current weighted price.
    pub value_bch: Decimal,
    pub bch: Decimal,
    /// Token holdings at this instant, by category.
    #[serde(default)]
    pub tokens: BTreeMap<String, Decimal>,
}

/// One daily bucket of the TVL/volume history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TvlVolumePoint {
    /// Bucket start.
    pub timestamp: EpochMillis,
    pub tvl_bch: Decimal,
    pub volume_bch: Decimal,
}
