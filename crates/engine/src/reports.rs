//! Response shapes produced by [`crate::MetricsService`].

use crate::weighted_price::TokenAggregate;
use dex_metrics_domain::{PricePoint, TimeRange, TvlVolumePoint};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current market price of one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub token_category: String,
    /// Whether at least one pool trades the token.
    pub has_market_pools: bool,
    /// Liquidity-weighted price in BCH, `null` when no BCH liquidity exists.
    pub market_price: Option<Decimal>,
    /// Sum of BCH reserves across the token's pools.
    pub total_liquidity: Decimal,
    pub pool_count: usize,
}

impl From<TokenAggregate> for TokenPrice {
    fn from(aggregate: TokenAggregate) -> Self {
        Self {
            has_market_pools: aggregate.pool_count > 0,
            market_price: aggregate.price_bch,
            total_liquidity: aggregate.bch_reserve,
            pool_count: aggregate.pool_count,
            token_category: aggregate.token_category,
        }
    }
}

/// One row of the token overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenOverview {
    pub token_category: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub icon_url: Option<String>,
    pub price_bch: Option<Decimal>,
    pub tvl_bch: Decimal,
    pub pool_count: usize,
    pub volume_24h_bch: Decimal,
    pub price_change_24h_pct: Option<Decimal>,
    pub price_change_7d_pct: Option<Decimal>,
}

impl TokenOverview {
    /// Case-insensitive match of `needle` against symbol, name and category.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            self.symbol.as_deref(),
            self.name.as_deref(),
            Some(self.token_category.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Search and paging for the token overview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// A page of the token overview, sorted by TVL descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokensOverview {
    pub tokens: Vec<TokenOverview>,
    /// Rows matching the query before paging.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Execution-price series for one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    pub token_category: String,
    pub range: TimeRange,
    pub points: Vec<PricePoint>,
}

/// Daily TVL and volume series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TvlVolumeHistory {
    pub range: TimeRange,
    pub points: Vec<TvlVolumePoint>,
}

/// Rolling volume comparisons and TVL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeStats {
    pub volume_24h_bch: Decimal,
    pub prev_24h_bch: Decimal,
    pub volume_30d_bch: Decimal,
    pub prev_30d_bch: Decimal,
    pub tvl_bch: Decimal,
    /// TVL change against 24h ago, `null` when TVL was zero then.
    pub tvl_change_24h_pct: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_matches_case_insensitively() {
        let row = TokenOverview {
            token_category: "abcd".to_string(),
            symbol: Some("FURU".to_string()),
            name: None,
            icon_url: None,
            price_bch: None,
            tvl_bch: Decimal::ZERO,
            pool_count: 0,
            volume_24h_bch: Decimal::ZERO,
            price_change_24h_pct: None,
            price_change_7d_pct: None,
        };
        assert!(row.matches("furu"));
        assert!(row.matches("BC"));
        assert!(!row.matches("zzz"));
    }

    #[test]
    fn test_stats_field_names() {
        let stats = VolumeStats {
            volume_24h_bch: Decimal::ONE,
            prev_24h_bch: Decimal::ZERO,
            volume_30d_bch: Decimal::ONE,
            prev_30d_bch: Decimal::ZERO,
            tvl_bch: Decimal::TEN,
            tvl_change_24h_pct: None,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("volume24hBch").is_some());
        assert!(json.get("prev30dBch").is_some());
        assert!(json["tvlChange24hPct"].is_null());
    }
}
