//! Engine configuration.

use dex_metrics_domain::TvlConvention;
use std::time::Duration;

/// Tunables for the metrics service.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How long a cached aggregate stays fresh.
    pub cache_ttl: Duration,
    /// Upper bound on each read from a source.
    pub source_timeout: Duration,
    /// How far back balance history replays.
    pub balance_lookback_days: u32,
    /// How pool reserves are turned into TVL.
    pub tvl_convention: TvlConvention,
    /// Whether entries sharing a txid are collapsed.
    pub dedupe_txids: bool,
    /// Channel new log entries are published on.
    pub notification_channel: String,
    /// Token overview page size when none is requested.
    pub overview_default_limit: usize,
    /// Largest token overview page served.
    pub overview_max_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            source_timeout: Duration::from_secs(10),
            balance_lookback_days: 90,
            tvl_convention: TvlConvention::default(),
            dedupe_txids: true,
            notification_channel: "transactions".to_string(),
            overview_default_limit: 50,
            overview_max_limit: 200,
        }
    }
}

impl EngineConfig {
    /// Sets the cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the per-source timeout.
    #[must_use]
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    /// Sets the TVL convention.
    #[must_use]
    pub fn with_tvl_convention(mut self, convention: TvlConvention) -> Self {
        self.tvl_convention = convention;
        self
    }

    /// Clamps a requested page size to the configured bounds.
    #[must_use]
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.overview_default_limit)
            .clamp(1, self.overview_max_limit.max(1))
    }
}
