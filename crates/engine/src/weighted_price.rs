//! Liquidity-weighted price aggregation.
//!
//! A token may trade in several independently seeded pools. Its spot price
//! is the average of the pool prices weighted by each pool's BCH reserve:
//!
//! `price = Σ(price_i × bch_reserve_i) / Σ(bch_reserve_i)`
//!
//! Weighting by the BCH side keeps token decimals out of the weights.

use dex_metrics_domain::{PoolSnapshot, TvlConvention};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Aggregate view of every pool of one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAggregate {
    /// Token category.
    pub token_category: String,
    /// Weighted spot price, `None` when no BCH liquidity backs it.
    pub price_bch: Option<Decimal>,
    /// Locked value under the requested convention.
    pub tvl_bch: Decimal,
    /// Sum of BCH reserves.
    pub bch_reserve: Decimal,
    /// Number of pools.
    pub pool_count: usize,
    /// First non-empty symbol seen.
    pub symbol: Option<String>,
    /// First non-empty name seen.
    pub name: Option<String>,
    /// First non-empty icon URL seen.
    pub icon_url: Option<String>,
}

#[derive(Default)]
struct Accumulator {
    weighted_sum: Option<Decimal>,
    reserve_sum: Decimal,
    pool_count: usize,
    symbol: Option<String>,
    name: Option<String>,
    icon_url: Option<String>,
}

fn first_non_empty(slot: &mut Option<String>, candidate: &Option<String>) {
    if slot.is_none()
        && let Some(value) = candidate
        && !value.trim().is_empty()
    {
        *slot = Some(value.clone());
    }
}

impl Accumulator {
    fn new() -> Self {
        Self {
            weighted_sum: Some(Decimal::ZERO),
            ..Self::default()
        }
    }

    fn add(&mut self, pool: &PoolSnapshot) {
        self.pool_count += 1;
        self.reserve_sum = self.reserve_sum.saturating_add(pool.bch_reserve);
        self.weighted_sum = self.weighted_sum.and_then(|sum| {
            pool.token_price_in_bch
                .checked_mul(pool.bch_reserve)
                .and_then(|w| sum.checked_add(w))
        });
        first_non_empty(&mut self.symbol, &pool.token_symbol);
        first_non_empty(&mut self.name, &pool.token_name);
        first_non_empty(&mut self.icon_url, &pool.token_icon_url);
    }

    fn price(&self) -> Option<Decimal> {
        if self.reserve_sum <= Decimal::ZERO {
            return None;
        }
        self.weighted_sum?.checked_div(self.reserve_sum)
    }

    fn finish(self, token_category: String, convention: TvlConvention) -> TokenAggregate {
        TokenAggregate {
            token_category,
            price_bch: self.price(),
            tvl_bch: convention.scale(self.reserve_sum),
            bch_reserve: self.reserve_sum,
            pool_count: self.pool_count,
            symbol: self.symbol,
            name: self.name,
            icon_url: self.icon_url,
        }
    }
}

/// Weighted spot price over `pools`.
///
/// Returns `None` when the summed BCH reserve is zero or the weighted sum
/// overflows.
#[must_use]
pub fn weighted_price(pools: &[PoolSnapshot]) -> Option<Decimal> {
    let mut acc = Accumulator::new();
    pools.iter().for_each(|p| acc.add(p));
    acc.price()
}

/// Aggregates pools that all belong to `token_category`.
#[must_use]
pub fn aggregate_token(
    token_category: &str,
    pools: &[PoolSnapshot],
    convention: TvlConvention,
) -> TokenAggregate {
    let mut acc = Accumulator::new();
    pools
        .iter()
        .filter(|p| p.token_category == token_category)
        .for_each(|p| acc.add(p));
    acc.finish(token_category.to_string(), convention)
}

/// Aggregates every pool, grouped by token category.
#[must_use]
pub fn aggregate_by_token(
    pools: &[PoolSnapshot],
    convention: TvlConvention,
) -> BTreeMap<String, TokenAggregate> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for pool in pools {
        groups
            .entry(pool.token_category.clone())
            .or_insert_with(Accumulator::new)
            .add(pool);
    }
    groups
        .into_iter()
        .map(|(category, acc)| {
            let aggregate = acc.finish(category.clone(), convention);
            (category, aggregate)
        })
        .collect()
}

/// Weighted price per token category; tokens without a price are absent.
#[must_use]
pub fn price_map(pools: &[PoolSnapshot]) -> HashMap<String, Decimal> {
    aggregate_by_token(pools, TvlConvention::BchSideOnly)
        .into_values()
        .filter_map(|a| a.price_bch.map(|p| (a.token_category, p)))
        .collect()
}

/// Total locked value across every pool.
#[must_use]
pub fn total_tvl(pools: &[PoolSnapshot], convention: TvlConvention) -> Decimal {
    let reserves = pools
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.bch_reserve));
    convention.scale(reserves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool(addr: &str, cat: &str, reserve: Decimal, price: Decimal) -> PoolSnapshot {
        PoolSnapshot::new(addr, cat, reserve, reserve / price, price)
    }

    #[test]
    fn test_single_pool_identity() {
        let pools = vec![pool("p1", "a", dec!(12.5), dec!(0.000731))];
        assert_eq!(weighted_price(&pools), Some(dec!(0.000731)));
    }

    #[test]
    fn test_two_pool_weighting() {
        let pools = vec![
            pool("p1", "a", dec!(10), dec!(0.02)),
            pool("p2", "a", dec!(30), dec!(0.01)),
        ];
        assert_eq!(weighted_price(&pools), Some(dec!(0.0125)));
    }

    #[test]
    fn test_zero_reserve_has_no_price() {
        let pools = vec![PoolSnapshot::new("p1", "a", dec!(0), dec!(100), dec!(0.5))];
        assert_eq!(weighted_price(&pools), None);
        assert_eq!(weighted_price(&[]), None);
    }

    #[test]
    fn test_tvl_conventions() {
        let pools = vec![
            pool("p1", "a", dec!(10), dec!(0.02)),
            pool("p2", "a", dec!(30), dec!(0.01)),
        ];
        let single = aggregate_token("a", &pools, TvlConvention::BchSideOnly);
        let both = aggregate_token("a", &pools, TvlConvention::BothSides);
        assert_eq!(single.tvl_bch, dec!(40));
        assert_eq!(both.tvl_bch, dec!(80));
        assert_eq!(both.pool_count, 2);
        assert_eq!(total_tvl(&pools, TvlConvention::BothSides), dec!(80));
    }

    #[test]
    fn test_first_non_empty_metadata_wins() {
        let mut first = pool("p1", "a", dec!(1), dec!(1));
        first.token_symbol = Some(String::new());
        first.token_name = Some("Alpha".to_string());
        let second = pool("p2", "a", dec!(1), dec!(1)).with_metadata("ALP", "Alpha Two");

        let agg = aggregate_token("a", &[first, second], TvlConvention::BchSideOnly);
        assert_eq!(agg.symbol.as_deref(), Some("ALP"));
        assert_eq!(agg.name.as_deref(), Some("Alpha"));
        assert_eq!(agg.icon_url, None);
    }

    #[test]
    fn test_price_map_groups_by_token() {
        let pools = vec![
            pool("p1", "a", dec!(10), dec!(0.02)),
            pool("p2", "b", dec!(5), dec!(0.5)),
            PoolSnapshot::new("p3", "c", dec!(0), dec!(0), dec!(0)),
        ];
        let prices = price_map(&pools);
        assert_eq!(prices.len(), 2);
        assert_eq!(prices["a"], dec!(0.02));
        assert_eq!(prices["b"], dec!(0.5));
        assert!(!prices.contains_key("c"));
    }
}
