//! Notification publishers.

use crate::error::DataError;
use crate::sources::NotificationPublisher;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// A message published on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Channel name.
    pub channel: String,
    /// Message body.
    pub payload: serde_json::Value,
}

/// In-process pub/sub over a tokio broadcast channel.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastPublisher {
    /// Creates a publisher buffering up to `capacity` messages per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to every future notification.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl NotificationPublisher for BroadcastPublisher {
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> Result<(), DataError> {
        let notification = Notification {
            channel: channel.to_string(),
            payload,
        };
        match self.sender.send(notification) {
            Ok(receivers) => debug!(channel, receivers, "Notification broadcast"),
            Err(_) => debug!(channel, "No subscribers for notification"),
        }
        Ok(())
    }
}

/// Posts notifications as JSON to an external pub/sub endpoint.
#[derive(Clone)]
pub struct WebhookPublisher {
    client: reqwest::Client,
    url: String,
}

impl WebhookPublisher {
    /// Creates a publisher posting to `url`, each request bounded by `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationPublisher for WebhookPublisher {
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> Result<(), DataError> {
        let body = Notification {
            channel: channel.to_string(),
            payload,
        };
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        debug!(channel, url = %self.url, "Notification posted");
        Ok(())
    }
}

/// Publishes to several sinks; every sink is attempted.
#[derive(Clone, Default)]
pub struct FanoutPublisher {
    sinks: Vec<Arc<dyn NotificationPublisher>>,
}

impl FanoutPublisher {
    /// Creates an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn NotificationPublisher>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl NotificationPublisher for FanoutPublisher {
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> Result<(), DataError> {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.publish(channel, payload.clone()).await {
                warn!(channel, error = %e, "Notification sink failed");
                failures.push(e.to_string());
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DataError::Publish(failures.join("; ")))
        }
    }
}
