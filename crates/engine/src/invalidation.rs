//! Cache invalidation on log writes.
//!
//! Every successful append to the transaction log clears the aggregate
//! cache before the write is acknowledged, so the next read of any derived
//! figure reflects the new entry. Subscribers are then told about the entry
//! on the notification channel. Notification is fire-and-forget: the write
//! has already succeeded and is never rolled back for a publish failure.

use crate::clock::Clock;
use crate::error::MetricsError;
use crate::service::time_boxed;
use dex_metrics_data::{AggregateCache, DataError, NotificationPublisher, TransactionLog};
use dex_metrics_domain::{EpochMillis, StoredTransaction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

/// Payload published for each recorded entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNotification {
    pub entry: StoredTransaction,
    pub emitted_at: EpochMillis,
}

/// Write path for the transaction log.
#[derive(Clone)]
pub struct InvalidationGate {
    log: Arc<dyn TransactionLog>,
    cache: Arc<dyn AggregateCache>,
    publisher: Arc<dyn NotificationPublisher>,
    channel: String,
    write_timeout: Duration,
    clock: Clock,
}

impl InvalidationGate {
    /// Creates a gate publishing on `channel`.
    #[must_use]
    pub fn new(
        log: Arc<dyn TransactionLog>,
        cache: Arc<dyn AggregateCache>,
        publisher: Arc<dyn NotificationPublisher>,
        channel: impl Into<String>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            log,
            cache,
            publisher,
            channel: channel.into(),
            write_timeout,
            clock: Clock::System,
        }
    }

    /// Replaces the time source used for `emittedAt`.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Validates and appends `entry`, clears the cache, then notifies.
    ///
    /// # Errors
    /// `InvalidInput` when the entry is malformed or stamped outside the
    /// accepted window; `Source` when the append fails. A rejected entry or a
    /// failed append leaves the cache untouched. A timed-out append may still
    /// commit, so it clears the cache before failing.
    #[instrument(skip(self, entry), fields(txid = %entry.txid, tx_type = %entry.tx_type))]
    pub async fn record(&self, entry: StoredTransaction) -> Result<StoredTransaction, MetricsError> {
        entry.validate_at(self.clock.now())?;
        let written = time_boxed("transaction log", self.write_timeout, self.log.insert(&entry)).await;
        if let Err(e) = written {
            if matches!(e, DataError::Timeout { .. }) {
                self.cache.invalidate_all().await;
            }
            return Err(e.into());
        }
        self.cache.invalidate_all().await;
        info!(address = %entry.address, "Transaction recorded");

        let notification = TransactionNotification {
            entry: entry.clone(),
            emitted_at: self.clock.now(),
        };
        match serde_json::to_value(&notification) {
            Ok(payload) => {
                let publisher = Arc::clone(&self.publisher);
                let channel = self.channel.clone();
                tokio::spawn(async move {
                    if let Err(e) = publisher.publish(&channel, payload).await {
                        warn!(channel, error = %e, "Failed to publish transaction notification");
                    }
                });
            }
            Err(e) => warn!(error = %e, "Failed to encode transaction notification"),
        }
        Ok(entry)
    }
}
