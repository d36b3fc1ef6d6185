//! Table rendering for command output.

use dex_metrics_domain::EpochMillis;
use dex_metrics_engine::balance_replay::BalanceHistory;
use dex_metrics_engine::reports::{PriceHistory, TokenPrice, TokensOverview, TvlVolumeHistory, VolumeStats};
use prettytable::{Table, row};
use rust_decimal::Decimal;

fn timestamp(ms: EpochMillis) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn decimal(value: Decimal) -> String {
    value.round_dp(8).normalize().to_string()
}

fn optional(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), decimal)
}

fn percent(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}%", v.round_dp(2)))
}

/// Volume comparisons and TVL.
#[must_use]
pub fn volume_stats_table(stats: &VolumeStats) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Metric", "Current", "Previous"]);
    table.add_row(row!["Volume 24h (BCH)", decimal(stats.volume_24h_bch), decimal(stats.prev_24h_bch)]);
    table.add_row(row!["Volume 30d (BCH)", decimal(stats.volume_30d_bch), decimal(stats.prev_30d_bch)]);
    table.add_row(row!["TVL (BCH)", decimal(stats.tvl_bch), percent(stats.tvl_change_24h_pct)]);
    table
}

/// Daily TVL and volume.
#[must_use]
pub fn tvl_history_table(history: &TvlVolumeHistory) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Day", "TVL (BCH)", "Volume (BCH)"]);
    for point in &history.points {
        table.add_row(row![timestamp(point.timestamp), decimal(point.tvl_bch), decimal(point.volume_bch)]);
    }
    table
}

/// Single-token price summary.
#[must_use]
pub fn token_price_table(price: &TokenPrice) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Category", "Pools", "Price (BCH)", "Liquidity (BCH)"]);
    table.add_row(row![
        price.token_category,
        price.pool_count,
        optional(price.market_price),
        decimal(price.total_liquidity)
    ]);
    table
}

/// Price series.
#[must_use]
pub fn price_history_table(history: &PriceHistory) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Time", "Price (BCH)", "Volume (BCH)"]);
    for point in &history.points {
        table.add_row(row![timestamp(point.timestamp), decimal(point.price_bch), optional(point.volume)]);
    }
    table
}

/// Token overview page.
#[must_use]
pub fn tokens_table(page: &TokensOverview) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Symbol", "Name", "Price (BCH)", "TVL (BCH)", "Vol 24h", "24h", "7d", "Pools"]);
    for token in &page.tokens {
        table.add_row(row![
            token.symbol.as_deref().unwrap_or("-"),
            token.name.as_deref().unwrap_or("-"),
            optional(token.price_bch),
            decimal(token.tvl_bch),
            decimal(token.volume_24h_bch),
            percent(token.price_change_24h_pct),
            percent(token.price_change_7d_pct),
            token.pool_count
        ]);
    }
    table
}

/// Balance history.
#[must_use]
pub fn balance_table(history: &BalanceHistory) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Time", "Value (BCH)", "BCH", "Tokens"]);
    for point in &history.points {
        let tokens = point
            .tokens
            .iter()
            .map(|(category, amount)| {
                let short: String = category.chars().take(8).collect();
                format!("{short}: {}", decimal(*amount))
            })
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(row![timestamp(point.timestamp), decimal(point.value_bch), decimal(point.bch), tokens]);
    }
    table
}
