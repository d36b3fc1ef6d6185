//! Server configuration and startup.

use crate::routes::create_router;
use crate::state::{AppState, Sources};
use axum::Router;
use dex_metrics_data::memory::{InMemoryPoolRegistry, InMemoryTransactionLog, StaticBalanceReader};
use dex_metrics_data::providers::HttpBalanceReader;
use dex_metrics_data::{BalanceReader, DataError, Database, NotificationPublisher, WebhookPublisher};
use dex_metrics_domain::TvlConvention;
use dex_metrics_engine::EngineConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Errors raised while configuring or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// An environment variable held an unusable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// A source could not be set up.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Binding or serving failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,
    /// PostgreSQL URL; in-memory sources are used when absent.
    pub database_url: Option<String>,
    /// Maximum database connections.
    pub max_connections: u32,
    /// Base URL of the live balance service.
    pub balance_api_url: Option<String>,
    /// External pub/sub endpoint receiving transaction notifications.
    pub notify_webhook_url: Option<String>,
    /// Engine tunables.
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            max_connections: 10,
            balance_api_url: None,
            notify_webhook_url: None,
            engine: EngineConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ServerError> {
    match raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ServerError::InvalidEnv { name, value }),
        None => Ok(None),
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut engine = defaults.engine.clone();

        if let Some(secs) = parse_var::<u64>("CACHE_TTL_SECS", lookup("CACHE_TTL_SECS"))? {
            engine = engine.with_cache_ttl(Duration::from_secs(secs));
        }
        if let Some(ms) = parse_var::<u64>("SOURCE_TIMEOUT_MS", lookup("SOURCE_TIMEOUT_MS"))? {
            engine = engine.with_source_timeout(Duration::from_millis(ms));
        }
        if let Some(days) = parse_var("BALANCE_LOOKBACK_DAYS", lookup("BALANCE_LOOKBACK_DAYS"))? {
            engine.balance_lookback_days = days;
        }
        if let Some(convention) =
            parse_var::<TvlConvention>("TVL_CONVENTION", lookup("TVL_CONVENTION"))?
        {
            engine = engine.with_tvl_convention(convention);
        }
        if let Some(dedupe) = parse_var("DEDUPE_TXIDS", lookup("DEDUPE_TXIDS"))? {
            engine.dedupe_txids = dedupe;
        }

        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", lookup("BIND_ADDR"))?.unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", lookup("DATABASE_MAX_CONNECTIONS"))?
                .unwrap_or(defaults.max_connections),
            balance_api_url: lookup("BALANCE_API_URL").filter(|v| !v.trim().is_empty()),
            notify_webhook_url: lookup("NOTIFY_WEBHOOK_URL").filter(|v| !v.trim().is_empty()),
            engine,
        })
    }

    /// Builds the sources this configuration points at.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable or an HTTP client
    /// cannot be built.
    pub async fn sources(&self) -> Result<Sources, ServerError> {
        let balances: Arc<dyn BalanceReader> = match &self.balance_api_url {
            Some(url) => Arc::new(HttpBalanceReader::new(url.clone(), self.engine.source_timeout)?),
            None => {
                warn!("BALANCE_API_URL not set, every address reads as empty");
                Arc::new(StaticBalanceReader::new())
            }
        };

        match &self.database_url {
            Some(url) => {
                let db = self.connect(url).await?;
                Ok(Sources {
                    pools: Arc::new(db.pools()),
                    log: Arc::new(db.transactions()),
                    balances,
                })
            }
            None => {
                warn!("DATABASE_URL not set, using in-memory sources");
                Ok(Sources {
                    pools: Arc::new(InMemoryPoolRegistry::default()),
                    log: Arc::new(InMemoryTransactionLog::new()),
                    balances,
                })
            }
        }
    }

    /// Connects to the configured database.
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(&self, url: &str) -> Result<Database, ServerError> {
        Database::connect(url, self.max_connections, self.engine.source_timeout)
            .await
            .map_err(|e| ServerError::Data(e.into()))
    }

    /// Webhook publisher, when configured.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn webhook(&self) -> Result<Option<Arc<dyn NotificationPublisher>>, ServerError> {
        match &self.notify_webhook_url {
            Some(url) => {
                let publisher = WebhookPublisher::new(url.clone(), self.engine.source_timeout)?;
                Ok(Some(Arc::new(publisher)))
            }
            None => Ok(None),
        }
    }
}

/// API server.
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a server around prepared state.
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Creates a server, building sources from `config`.
    ///
    /// # Errors
    /// Returns an error if a source cannot be set up.
    pub async fn from_config(config: ServerConfig) -> Result<Self, ServerError> {
        let sources = config.sources().await?;
        let webhook = config.webhook()?;
        let state = AppState::new(sources, config.engine.clone(), webhook);
        Ok(Self::new(config, state))
    }

    /// Application router.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Serves until Ctrl-C.
    ///
    /// # Errors
    /// Returns an error if binding or serving fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "API server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
