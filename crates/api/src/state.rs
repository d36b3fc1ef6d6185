//! Application state shared by handlers.

use dex_metrics_data::memory::{InMemoryPoolRegistry, InMemoryTransactionLog, StaticBalanceReader};
use dex_metrics_data::{
    BalanceReader, BroadcastPublisher, FanoutPublisher, MemoryAggregateCache,
    NotificationPublisher, PoolRegistry, TransactionLog,
};
use dex_metrics_engine::{Clock, EngineConfig, InvalidationGate, MetricsService};
use std::sync::Arc;

const EVENT_BUFFER: usize = 256;

/// Collaborators the engine reads from and writes to.
#[derive(Clone)]
pub struct Sources {
    pub pools: Arc<dyn PoolRegistry>,
    pub log: Arc<dyn TransactionLog>,
    pub balances: Arc<dyn BalanceReader>,
}

impl Sources {
    /// Empty in-memory sources.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            pools: Arc::new(InMemoryPoolRegistry::default()),
            log: Arc::new(InMemoryTransactionLog::new()),
            balances: Arc::new(StaticBalanceReader::new()),
        }
    }
}

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Read side.
    pub metrics: MetricsService,
    /// Write side.
    pub gate: InvalidationGate,
    /// In-process notification feed behind `/events`.
    pub events: BroadcastPublisher,
    /// Time source for server-stamped timestamps.
    pub clock: Clock,
}

impl AppState {
    /// Wires the service and the write gate around one shared cache.
    ///
    /// Notifications go to the in-process event feed and, when given, to
    /// `webhook`.
    #[must_use]
    pub fn new(
        sources: Sources,
        config: EngineConfig,
        webhook: Option<Arc<dyn NotificationPublisher>>,
    ) -> Self {
        let cache = Arc::new(MemoryAggregateCache::new(config.cache_ttl));
        let events = BroadcastPublisher::new(EVENT_BUFFER);
        let mut publisher = FanoutPublisher::new().with(Arc::new(events.clone()));
        if let Some(webhook) = webhook {
            publisher = publisher.with(webhook);
        }

        let gate = InvalidationGate::new(
            Arc::clone(&sources.log),
            cache.clone(),
            Arc::new(publisher),
            config.notification_channel.clone(),
            config.source_timeout,
        );
        let metrics = MetricsService::new(
            sources.pools,
            sources.log,
            sources.balances,
            cache,
            config,
        );
        Self {
            metrics,
            gate,
            events,
            clock: Clock::System,
        }
    }

    /// Pins the clock of every component.
    #[must_use]
    pub fn with_clock(self, clock: Clock) -> Self {
        Self {
            metrics: self.metrics.with_clock(clock),
            gate: self.gate.with_clock(clock),
            events: self.events,
            clock,
        }
    }
}
