//! Request-level aggregation service.
//!
//! [`MetricsService`] answers every read operation of the engine. Each
//! request fans out its independent source reads concurrently, bounds each
//! of them with the configured timeout, and runs the pure computations of
//! the sibling modules over the results. Whole responses are memoised in
//! the [`AggregateCache`]; a `force` flag bypasses the lookup.

use crate::balance_replay::{BalanceHistory, replay_balance_history};
use crate::baseline::{change_since, percent_change};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::dedupe::dedupe_by_txid;
use crate::error::{MetricsError, require_non_empty};
use crate::price_history::{SeriesOptions, append_live_point, build_price_series, initial_price};
use crate::reports::{
    OverviewQuery, PriceHistory, TokenOverview, TokenPrice, TokensOverview, TvlVolumeHistory,
    VolumeStats,
};
use crate::tvl_history::{build_tvl_volume_history, tvl_at};
use crate::volume::{compare_windows, volume_by_token};
use crate::weighted_price::{aggregate_by_token, aggregate_token, price_map, total_tvl, weighted_price};
use dex_metrics_data::{
    AggregateCache, BalanceReader, DataError, PoolRegistry, SortOrder, TransactionFilter,
    TransactionLog,
};
use dex_metrics_domain::time::{DAY_MS, LOG_EPOCH_MS, WEEK_MS, days};
use dex_metrics_domain::{
    LiveBalance, PoolSnapshot, StoredTransaction, TimeRange, TransactionType, TvlConvention,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const LIQUIDITY_TYPES: [TransactionType; 3] = [
    TransactionType::CreatePool,
    TransactionType::AddLiquidity,
    TransactionType::RemoveLiquidity,
];

/// Awaits `fut`, failing with [`DataError::Timeout`] after `limit`.
pub(crate) async fn time_boxed<T, F>(
    source_name: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, DataError>
where
    F: Future<Output = Result<T, DataError>>,
{
    let started = Instant::now();
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            warn!(source = source_name, elapsed_ms, "Source call timed out");
            Err(DataError::Timeout {
                source_name,
                elapsed_ms,
            })
        }
    }
}

/// Computes derived metrics from the pool registry, the transaction log and
/// live balances.
#[derive(Clone)]
pub struct MetricsService {
    pools: Arc<dyn PoolRegistry>,
    log: Arc<dyn TransactionLog>,
    balances: Arc<dyn BalanceReader>,
    cache: Arc<dyn AggregateCache>,
    config: EngineConfig,
    clock: Clock,
}

impl MetricsService {
    /// Creates a service over the given sources.
    #[must_use]
    pub fn new(
        pools: Arc<dyn PoolRegistry>,
        log: Arc<dyn TransactionLog>,
        balances: Arc<dyn BalanceReader>,
        cache: Arc<dyn AggregateCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            pools,
            log,
            balances,
            cache,
            config,
            clock: Clock::System,
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Time source used for every "now".
    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Current market price and BCH liquidity of one token.
    ///
    /// # Errors
    /// `InvalidInput` for a blank category; `Source` when the pool registry
    /// fails or times out.
    #[instrument(skip(self))]
    pub async fn token_price(&self, category: &str, force: bool) -> Result<TokenPrice, MetricsError> {
        require_non_empty("tokenCategory", category)?;
        self.cached(format!("token-price:{category}"), force, || async move {
            let pools = self.pools_for(category).await?;
            Ok(aggregate_token(category, &pools, TvlConvention::BchSideOnly).into())
        })
        .await
    }

    /// Paged overview of every traded token, largest TVL first.
    ///
    /// # Errors
    /// `Source` when any source read fails or times out.
    #[instrument(skip(self))]
    pub async fn tokens_overview(
        &self,
        query: &OverviewQuery,
        force: bool,
    ) -> Result<TokensOverview, MetricsError> {
        let rows: Vec<TokenOverview> = self
            .cached("tokens-overview".to_string(), force, || self.compute_overview())
            .await?;

        let needle = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
        let matching: Vec<TokenOverview> = match needle {
            Some(q) => rows.into_iter().filter(|row| row.matches(q)).collect(),
            None => rows,
        };
        let limit = self.config.page_size(query.limit);
        let offset = query.offset.unwrap_or(0);
        let total = matching.len();
        Ok(TokensOverview {
            tokens: matching.into_iter().skip(offset).take(limit).collect(),
            total,
            limit,
            offset,
        })
    }

    /// Execution-price series of one token over `range`.
    ///
    /// With `live`, the current weighted price is appended as the last point.
    ///
    /// # Errors
    /// `InvalidInput` for a blank category; `Source` when any source read
    /// fails or times out.
    #[instrument(skip(self))]
    pub async fn token_price_history(
        &self,
        category: &str,
        range: TimeRange,
        live: bool,
        force: bool,
    ) -> Result<PriceHistory, MetricsError> {
        require_non_empty("tokenCategory", category)?;
        let key = format!("price-history:{category}:{range}:{live}");
        self.cached(key, force, || async move {
            let now = self.clock.now();
            let from = range.start(now);
            let mut swaps = TransactionFilter::new()
                .of_type(TransactionType::Swap)
                .token(category)
                .sorted(SortOrder::Ascending);
            if let Some(from) = from {
                swaps = swaps.since(from);
            }
            let creations = TransactionFilter::new()
                .of_type(TransactionType::CreatePool)
                .token(category)
                .sorted(SortOrder::Ascending)
                .limit(1);

            let (pools, swaps, creations) = tokio::try_join!(
                self.pools_for(category),
                self.find(swaps),
                self.find(creations),
            )?;

            let options = SeriesOptions {
                include_initial: true,
                include_volume: true,
            };
            let mut points = build_price_series(&swaps, &creations, category, from, now, options);
            if live {
                append_live_point(&mut points, now, weighted_price(&pools));
            }
            debug!(points = points.len(), "Price history built");
            Ok(PriceHistory {
                token_category: category.to_string(),
                range,
                points,
            })
        })
        .await
    }

    /// Daily TVL and swap volume across every pool over `range`.
    ///
    /// # Errors
    /// `Source` when any source read fails or times out.
    #[instrument(skip(self))]
    pub async fn tvl_volume_history(
        &self,
        range: TimeRange,
        force: bool,
    ) -> Result<TvlVolumeHistory, MetricsError> {
        self.cached(format!("tvl-volume:{range}"), force, || async move {
            let now = self.clock.now();
            let bounded_start = range.start(now);
            let mut filter = TransactionFilter::new().sorted(SortOrder::Ascending);
            if let Some(start) = bounded_start {
                filter = filter.since(start);
            }
            let (pools, entries) = tokio::try_join!(self.list_pools(), self.find(filter))?;

            let start = bounded_start.unwrap_or_else(|| {
                entries
                    .iter()
                    .map(|tx| tx.created_at)
                    .min()
                    .unwrap_or(now)
                    .min(now.saturating_sub(DAY_MS))
                    .max(LOG_EPOCH_MS)
            });
            let convention = self.config.tvl_convention;
            let current = total_tvl(&pools, convention);
            Ok(TvlVolumeHistory {
                range,
                points: build_tvl_volume_history(&entries, current, start, now, convention),
            })
        })
        .await
    }

    /// 24h and 30d volume against the preceding window, plus TVL and its
    /// 24h change.
    ///
    /// # Errors
    /// `Source` when any source read fails or times out.
    #[instrument(skip(self))]
    pub async fn stats_volume(&self, force: bool) -> Result<VolumeStats, MetricsError> {
        self.cached("stats-volume".to_string(), force, || async move {
            let now = self.clock.now();
            let month = days(30);
            let swaps = TransactionFilter::new()
                .of_type(TransactionType::Swap)
                .since(now - 2 * month);
            let liquidity = TransactionFilter::new()
                .of_types(&LIQUIDITY_TYPES)
                .since(now - DAY_MS);

            let (pools, swaps, liquidity) =
                tokio::try_join!(self.list_pools(), self.find(swaps), self.find(liquidity))?;

            let day_window = compare_windows(&swaps, now, DAY_MS);
            let month_window = compare_windows(&swaps, now, month);
            let convention = self.config.tvl_convention;
            let tvl = total_tvl(&pools, convention);
            let tvl_day_ago = tvl_at(tvl, &liquidity, now - DAY_MS, convention);
            Ok(VolumeStats {
                volume_24h_bch: day_window.current,
                prev_24h_bch: day_window.previous,
                volume_30d_bch: month_window.current,
                prev_30d_bch: month_window.previous,
                tvl_bch: tvl,
                tvl_change_24h_pct: percent_change(Some(tvl), Some(tvl_day_ago)),
            })
        })
        .await
    }

    /// Reconstructed value history of one address.
    ///
    /// # Errors
    /// `InvalidInput` for a blank address; `Source` when any source read
    /// fails or times out.
    #[instrument(skip(self))]
    pub async fn balance_history(
        &self,
        address: &str,
        force: bool,
    ) -> Result<BalanceHistory, MetricsError> {
        require_non_empty("address", address)?;
        self.cached(format!("balance-history:{address}"), force, || async move {
            let now = self.clock.now();
            let swaps = TransactionFilter::new()
                .of_type(TransactionType::Swap)
                .address(address)
                .since(now - days(self.config.balance_lookback_days))
                .sorted(SortOrder::Ascending);

            let (live, pools, entries) = tokio::try_join!(
                self.live_balance(address),
                self.list_pools(),
                self.find(swaps),
            )?;
            let history = replay_balance_history(&live, &entries, &price_map(&pools), now);
            debug!(
                points = history.points.len(),
                swaps_this_week = history.swaps_this_week,
                "Balance history replayed"
            );
            Ok(history)
        })
        .await
    }

    async fn compute_overview(&self) -> Result<Vec<TokenOverview>, MetricsError> {
        let now = self.clock.now();
        let swaps = TransactionFilter::new()
            .of_type(TransactionType::Swap)
            .since(now - WEEK_MS)
            .sorted(SortOrder::Ascending);
        let creations = TransactionFilter::new()
            .of_type(TransactionType::CreatePool)
            .sorted(SortOrder::Ascending);

        let (pools, swaps, creations) =
            tokio::try_join!(self.list_pools(), self.find(swaps), self.find(creations))?;

        let volumes = volume_by_token(&swaps, now - DAY_MS, now);
        let mut swaps_by_token: HashMap<&str, Vec<StoredTransaction>> = HashMap::new();
        for tx in &swaps {
            if let Some(category) = tx.token_category.as_deref() {
                swaps_by_token.entry(category).or_default().push(tx.clone());
            }
        }

        let options = SeriesOptions {
            include_initial: true,
            include_volume: false,
        };
        let mut rows: Vec<TokenOverview> = aggregate_by_token(&pools, self.config.tvl_convention)
            .into_values()
            .map(|agg| {
                let category = agg.token_category.as_str();
                let token_swaps = swaps_by_token.get(category).map_or(&[][..], Vec::as_slice);
                let points = build_price_series(
                    token_swaps,
                    &creations,
                    category,
                    Some(now - WEEK_MS),
                    now,
                    options,
                );
                let launch = initial_price(&creations, category).map(|p| p.price_bch);
                TokenOverview {
                    price_change_24h_pct: change_since(&points, now - DAY_MS, agg.price_bch, launch),
                    price_change_7d_pct: change_since(&points, now - WEEK_MS, agg.price_bch, launch),
                    volume_24h_bch: volumes.get(category).copied().unwrap_or_default(),
                    token_category: agg.token_category.clone(),
                    symbol: agg.symbol,
                    name: agg.name,
                    icon_url: agg.icon_url,
                    price_bch: agg.price_bch,
                    tvl_bch: agg.tvl_bch,
                    pool_count: agg.pool_count,
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            b.tvl_bch
                .cmp(&a.tvl_bch)
                .then_with(|| a.token_category.cmp(&b.token_category))
        });
        debug!(tokens = rows.len(), "Token overview computed");
        Ok(rows)
    }

    async fn cached<T, F, Fut>(&self, key: String, force: bool, compute: F) -> Result<T, MetricsError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MetricsError>>,
    {
        if !force && let Some(value) = self.cache.get(&key).await {
            match serde_json::from_value(value) {
                Ok(hit) => {
                    debug!(key, "Cache hit");
                    return Ok(hit);
                }
                Err(e) => warn!(key, error = %e, "Discarding undecodable cache entry"),
            }
        }

        let generation = self.cache.generation().await;
        let fresh = compute().await?;
        match serde_json::to_value(&fresh) {
            Ok(value) => {
                if !self.cache.put(&key, value, generation).await {
                    debug!(key, "Result not cached, invalidated during computation");
                }
            }
            Err(e) => warn!(key, error = %e, "Failed to encode result for cache"),
        }
        Ok(fresh)
    }

    async fn list_pools(&self) -> Result<Vec<PoolSnapshot>, DataError> {
        time_boxed("pool registry", self.config.source_timeout, self.pools.list_pools()).await
    }

    async fn pools_for(&self, category: &str) -> Result<Vec<PoolSnapshot>, DataError> {
        time_boxed(
            "pool registry",
            self.config.source_timeout,
            self.pools.pools_for_token(category),
        )
        .await
    }

    async fn live_balance(&self, address: &str) -> Result<LiveBalance, DataError> {
        time_boxed(
            "balance reader",
            self.config.source_timeout,
            self.balances.balances_for(address),
        )
        .await
    }

    async fn find(&self, filter: TransactionFilter) -> Result<Vec<StoredTransaction>, DataError> {
        let entries =
            time_boxed("transaction log", self.config.source_timeout, self.log.find(&filter))
                .await?;
        Ok(if self.config.dedupe_txids {
            dedupe_by_txid(entries)
        } else {
            entries
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dex_metrics_data::MemoryAggregateCache;
    use dex_metrics_data::memory::{InMemoryPoolRegistry, InMemoryTransactionLog, StaticBalanceReader};
    use dex_metrics_domain::{EpochMillis, TradeDirection, TxAmounts};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const NOW: EpochMillis = 1_700_000_000_000;

    struct Fixture {
        service: MetricsService,
        log: Arc<InMemoryTransactionLog>,
        pools: Arc<InMemoryPoolRegistry>,
        balances: Arc<StaticBalanceReader>,
    }

    fn fixture(pools: Vec<PoolSnapshot>, entries: Vec<StoredTransaction>) -> Fixture {
        fixture_with(pools, entries, EngineConfig::default())
    }

    fn fixture_with(
        pools: Vec<PoolSnapshot>,
        entries: Vec<StoredTransaction>,
        config: EngineConfig,
    ) -> Fixture {
        let log = Arc::new(InMemoryTransactionLog::with_entries(entries));
        let pools = Arc::new(InMemoryPoolRegistry::new(pools));
        let balances = Arc::new(StaticBalanceReader::new());
        let cache = Arc::new(MemoryAggregateCache::new(Duration::from_secs(60)));
        let service = MetricsService::new(
            pools.clone(),
            log.clone(),
            balances.clone(),
            cache,
            config,
        )
        .with_clock(Clock::Fixed(NOW));
        Fixture {
            service,
            log,
            pools,
            balances,
        }
    }

    fn pool(addr: &str, cat: &str, reserve: Decimal, price: Decimal) -> PoolSnapshot {
        PoolSnapshot::new(addr, cat, reserve, reserve / price, price)
    }

    fn buy(txid: &str, addr: &str, cat: &str, bch: Decimal, tokens: Decimal, at: EpochMillis) -> StoredTransaction {
        StoredTransaction::swap(
            txid,
            addr,
            cat,
            TradeDirection::BchToToken,
            TxAmounts::bch_to_token(bch, tokens),
            at,
        )
    }

    fn create(cat: &str, bch: Decimal, tokens: Decimal, at: EpochMillis) -> StoredTransaction {
        StoredTransaction::liquidity(
            format!("create-{cat}"),
            "lp",
            TransactionType::CreatePool,
            cat,
            TxAmounts::deposit(bch, tokens),
            at,
        )
    }

    #[tokio::test]
    async fn test_token_price_weights_pools() {
        let f = fixture(
            vec![
                pool("p1", "a", dec!(10), dec!(0.02)),
                pool("p2", "a", dec!(30), dec!(0.01)),
                pool("p3", "b", dec!(99), dec!(1)),
            ],
            vec![],
        );
        let price = f.service.token_price("a", false).await.unwrap();
        assert!(price.has_market_pools);
        assert_eq!(price.market_price, Some(dec!(0.0125)));
        assert_eq!(price.total_liquidity, dec!(40));
        assert_eq!(price.pool_count, 2);
    }

    #[tokio::test]
    async fn test_token_price_without_pools() {
        let f = fixture(vec![], vec![]);
        let price = f.service.token_price("none", false).await.unwrap();
        assert!(!price.has_market_pools);
        assert_eq!(price.market_price, None);
        assert_eq!(price.total_liquidity, dec!(0));
    }

    #[tokio::test]
    async fn test_blank_category_is_invalid_input() {
        let f = fixture(vec![], vec![]);
        let err = f.service.token_price("  ", false).await.unwrap_err();
        assert!(err.is_client_error());
        let err = f.service.balance_history("", false).await.unwrap_err();
        assert!(matches!(err, MetricsError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_cached_until_forced() {
        let f = fixture(vec![pool("p1", "a", dec!(10), dec!(0.02))], vec![]);
        let first = f.service.token_price("a", false).await.unwrap();

        f.pools.set_pools(vec![pool("p1", "a", dec!(10), dec!(0.04))]).await;
        let cached = f.service.token_price("a", false).await.unwrap();
        let forced = f.service.token_price("a", true).await.unwrap();

        assert_eq!(cached, first);
        assert_eq!(forced.market_price, Some(dec!(0.04)));
    }

    #[tokio::test]
    async fn test_price_history_with_launch_and_live_point() {
        let f = fixture(
            vec![pool("p1", "a", dec!(10), dec!(0.05))],
            vec![
                create("a", dec!(1), dec!(100), NOW - 3 * DAY_MS),
                buy("t1", "u", "a", dec!(2), dec!(100), NOW - 2 * DAY_MS),
                buy("t2", "u", "a", dec!(3), dec!(100), NOW - DAY_MS),
            ],
        );
        let history = f
            .service
            .token_price_history("a", TimeRange::Week, true, false)
            .await
            .unwrap();

        let prices: Vec<_> = history.points.iter().map(|p| p.price_bch).collect();
        assert_eq!(prices, vec![dec!(0.01), dec!(0.02), dec!(0.03), dec!(0.05)]);
        assert_eq!(history.points[1].volume, Some(dec!(2)));
        assert_eq!(history.points.last().map(|p| p.timestamp), Some(NOW));

        let short = f
            .service
            .token_price_history("a", TimeRange::Day, false, false)
            .await
            .unwrap();
        assert_eq!(short.points.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_txids_count_once() {
        let trade = buy("dup", "u", "a", dec!(2), dec!(100), NOW - 10);
        let f = fixture(vec![], vec![trade.clone(), trade]);
        let stats = f.service.stats_volume(false).await.unwrap();
        assert_eq!(stats.volume_24h_bch, dec!(2));

        let mut config = EngineConfig::default();
        config.dedupe_txids = false;
        let trade = buy("dup", "u", "a", dec!(2), dec!(100), NOW - 10);
        let f = fixture_with(vec![], vec![trade.clone(), trade], config);
        let stats = f.service.stats_volume(false).await.unwrap();
        assert_eq!(stats.volume_24h_bch, dec!(4));
    }

    #[tokio::test]
    async fn test_stats_volume_windows_and_tvl_change() {
        let add = StoredTransaction::liquidity(
            "add",
            "lp",
            TransactionType::AddLiquidity,
            "a",
            TxAmounts::deposit(dec!(10), dec!(1000)),
            NOW - HOUR,
        );
        let f = fixture_with(
            vec![pool("p1", "a", dec!(50), dec!(0.01))],
            vec![
                buy("1", "u", "a", dec!(1), dec!(10), NOW - HOUR),
                buy("2", "u", "a", dec!(2), dec!(10), NOW - DAY_MS - HOUR),
                buy("3", "u", "a", dec!(4), dec!(10), NOW - 40 * DAY_MS),
                add,
            ],
            EngineConfig::default().with_tvl_convention(TvlConvention::BchSideOnly),
        );
        let stats = f.service.stats_volume(false).await.unwrap();
        assert_eq!(stats.volume_24h_bch, dec!(1));
        assert_eq!(stats.prev_24h_bch, dec!(2));
        assert_eq!(stats.volume_30d_bch, dec!(3));
        assert_eq!(stats.prev_30d_bch, dec!(4));
        assert_eq!(stats.tvl_bch, dec!(50));
        assert_eq!(stats.tvl_change_24h_pct, Some(dec!(25)));
    }

    const HOUR: EpochMillis = dex_metrics_domain::time::HOUR_MS;

    #[tokio::test]
    async fn test_tvl_volume_history_has_daily_points() {
        let f = fixture(
            vec![pool("p1", "a", dec!(5), dec!(0.01))],
            vec![buy("1", "u", "a", dec!(1), dec!(10), NOW - HOUR)],
        );
        let history = f.service.tvl_volume_history(TimeRange::Week, false).await.unwrap();
        assert_eq!(history.points.len(), 7);
        assert_eq!(history.points[6].volume_bch, dec!(1));
        assert_eq!(history.points[6].tvl_bch, dec!(10));

        let all = f.service.tvl_volume_history(TimeRange::All, false).await.unwrap();
        assert_eq!(all.points.len(), 1);
    }

    #[tokio::test]
    async fn test_all_range_starts_no_earlier_than_log_epoch() {
        let legacy = buy("old", "u", "a", dec!(1), dec!(10), i64::MIN);
        let f = fixture(vec![pool("p1", "a", dec!(5), dec!(0.01))], vec![legacy]);

        let all = f.service.tvl_volume_history(TimeRange::All, true).await.unwrap();
        assert_eq!(all.points[0].timestamp, LOG_EPOCH_MS);
        assert_eq!(all.points.len(), usize::try_from((NOW - LOG_EPOCH_MS).div_euclid(DAY_MS) + 1).unwrap());
        assert!(all.points.iter().all(|p| p.volume_bch.is_zero()));
    }

    #[tokio::test]
    async fn test_balance_history_inverts_buy() {
        let t0 = NOW - DAY_MS;
        let f = fixture(
            vec![pool("p1", "A", dec!(10), dec!(0.01))],
            vec![buy("t0", "addr", "A", dec!(2), dec!(20), t0)],
        );
        f.balances
            .set_balance("addr", LiveBalance::new(dec!(5)).with_token("A", dec!(50)))
            .await;

        let history = f.service.balance_history("addr", false).await.unwrap();
        let summary: Vec<_> = history
            .points
            .iter()
            .map(|p| (p.timestamp, p.bch, p.tokens.get("A").copied()))
            .collect();
        assert_eq!(
            summary,
            vec![(t0, dec!(7), Some(dec!(30))), (NOW, dec!(5), Some(dec!(50)))]
        );
        assert_eq!(history.swaps_this_week, 1);
    }

    #[tokio::test]
    async fn test_overview_sorted_filtered_and_paged() {
        let f = fixture(
            vec![
                pool("p1", "small", dec!(1), dec!(0.1)).with_metadata("SML", "Small"),
                pool("p2", "big", dec!(100), dec!(0.03)).with_metadata("BIG", "Big Token"),
            ],
            vec![
                create("big", dec!(1), dec!(100), NOW - 30 * DAY_MS),
                buy("1", "u", "big", dec!(2), dec!(100), NOW - 2 * DAY_MS),
                buy("2", "u", "big", dec!(0.5), dec!(10), NOW - HOUR),
            ],
        );
        let page = f
            .service
            .tokens_overview(&OverviewQuery::default(), false)
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.tokens[0].token_category, "big");
        let big = &page.tokens[0];
        assert_eq!(big.volume_24h_bch, dec!(0.5));
        // Baseline 0.02 for both windows; current 0.03.
        assert_eq!(big.price_change_24h_pct, Some(dec!(50)));
        assert_eq!(big.price_change_7d_pct, Some(dec!(50)));
        assert_eq!(page.tokens[1].price_change_24h_pct, None);

        let query = OverviewQuery {
            q: Some("sml".to_string()),
            ..OverviewQuery::default()
        };
        let filtered = f.service.tokens_overview(&query, false).await.unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.tokens[0].token_category, "small");

        let query = OverviewQuery {
            limit: Some(1),
            offset: Some(1),
            ..OverviewQuery::default()
        };
        let paged = f.service.tokens_overview(&query, false).await.unwrap();
        assert_eq!(paged.total, 2);
        assert_eq!(paged.tokens.len(), 1);
        assert_eq!(paged.tokens[0].token_category, "small");
    }

    #[tokio::test]
    async fn test_unavailable_log_is_source_error() {
        let f = fixture(vec![], vec![]);
        f.log.set_unavailable(true);
        let err = f.service.stats_volume(false).await.unwrap_err();
        assert!(matches!(err, MetricsError::Source(DataError::Unavailable(_))));
    }

    struct StalledRegistry;

    #[async_trait]
    impl PoolRegistry for StalledRegistry {
        async fn list_pools(&self) -> Result<Vec<PoolSnapshot>, DataError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![])
        }

        async fn pools_for_token(&self, _: &str) -> Result<Vec<PoolSnapshot>, DataError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let service = MetricsService::new(
            Arc::new(StalledRegistry),
            Arc::new(InMemoryTransactionLog::new()),
            Arc::new(StaticBalanceReader::new()),
            Arc::new(MemoryAggregateCache::new(Duration::from_secs(60))),
            EngineConfig::default().with_source_timeout(Duration::from_millis(20)),
        );
        let err = service.token_price("a", false).await.unwrap_err();
        assert!(matches!(
            err,
            MetricsError::Source(DataError::Timeout {
                source_name: "pool registry",
                ..
            })
        ));
    }
}
