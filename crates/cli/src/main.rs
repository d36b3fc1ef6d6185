//! Command line entry point for the DEX metrics engine.

mod logging;
mod output;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dex_metrics_api::{ApiServer, AppState, ServerConfig};
use dex_metrics_domain::TimeRange;
use dex_metrics_engine::MetricsService;
use dex_metrics_engine::reports::OverviewQuery;
use dotenv::dotenv;
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Derived on-chain metrics for the BCH AMM DEX", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Overrides BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Apply the database schema
    Migrate,
    /// Show 24h/30d volume and TVL
    Stats {
        /// Also print the daily TVL/volume history for this range
        #[arg(short, long)]
        range: Option<TimeRange>,
    },
    /// Show the price and price history of one token
    Token {
        /// Token category id
        category: String,

        #[arg(short, long, default_value = "7d")]
        range: TimeRange,

        /// Skip the trailing live price point
        #[arg(long)]
        no_live: bool,
    },
    /// List tokens with price, TVL and volume
    Tokens {
        /// Case-insensitive filter over symbol, name and category
        #[arg(short, long)]
        q: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long)]
        offset: Option<usize>,
    },
    /// Show the reconstructed balance history of an address
    Balance {
        /// Cash address
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    let mut config = ServerConfig::from_env().context("reading configuration")?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            ApiServer::from_config(config).await?.run().await?;
        }
        Commands::Migrate => {
            let Some(url) = config.database_url.clone() else {
                bail!("DATABASE_URL must be set to run migrations");
            };
            let db = config.connect(&url).await?;
            db.migrate().await.context("applying schema")?;
            info!("Schema applied");
            println!("✅ Database schema is up to date");
        }
        Commands::Stats { range } => {
            let metrics = metrics(&config).await?;
            let stats = metrics.stats_volume(false).await?;
            println!("📊 Volume and TVL");
            output::volume_stats_table(&stats).printstd();

            if let Some(range) = range {
                let history = metrics.tvl_volume_history(range, false).await?;
                println!();
                println!("📈 Daily TVL and volume ({range})");
                output::tvl_history_table(&history).printstd();
            }
        }
        Commands::Token {
            category,
            range,
            no_live,
        } => {
            let metrics = metrics(&config).await?;
            let price = metrics.token_price(&category, false).await?;
            println!("🪙 Token {category}");
            output::token_price_table(&price).printstd();

            let history = metrics
                .token_price_history(&category, range, !no_live, false)
                .await?;
            println!();
            println!("📈 Price history ({range}, {} points)", history.points.len());
            output::price_history_table(&history).printstd();
        }
        Commands::Tokens { q, limit, offset } => {
            let metrics = metrics(&config).await?;
            let query = OverviewQuery { q, limit, offset };
            let page = metrics.tokens_overview(&query, false).await?;
            println!(
                "🪙 Tokens {}-{} of {}",
                page.offset + usize::from(!page.tokens.is_empty()),
                page.offset + page.tokens.len(),
                page.total
            );
            output::tokens_table(&page).printstd();
        }
        Commands::Balance { address } => {
            let metrics = metrics(&config).await?;
            let history = metrics.balance_history(&address, false).await?;
            println!("👛 Balance history for {address}");
            output::balance_table(&history).printstd();
            println!(
                "Swaps this week: {} ({} BCH)",
                history.swaps_this_week,
                history.swapped_this_week_bch.normalize()
            );
        }
    }

    Ok(())
}

/// Builds a read-side service over the configured sources.
async fn metrics(config: &ServerConfig) -> Result<MetricsService> {
    let sources = config.sources().await?;
    let state = AppState::new(sources, config.engine.clone(), None);
    Ok(state.metrics)
}
