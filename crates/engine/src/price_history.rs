//! Historical execution-price series.
//!
//! Each swap yields the price it actually executed at. A series can be
//! prefixed with the pool's launch price (from its creation entry) and
//! suffixed with a live point at the current weighted price.

use dex_metrics_domain::{
    EpochMillis, PricePoint, StoredTransaction, TradeDirection, TransactionType,
};
use rust_decimal::Decimal;

fn ratio(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    let (n, d) = (numerator?, denominator?);
    if n <= Decimal::ZERO || d <= Decimal::ZERO {
        return None;
    }
    n.checked_div(d)
}

/// Price a swap executed at, in BCH per token.
///
/// `bch_in / token_out` for buys and `bch_out / token_in` for sells. Entries
/// without a direction or a positive pair of legs have no price.
#[must_use]
pub fn execution_price(tx: &StoredTransaction) -> Option<Decimal> {
    let legs = tx.legs();
    match tx.swap_direction()? {
        TradeDirection::BchToToken => ratio(legs.bch_in, legs.token_out),
        TradeDirection::TokenToBch => ratio(legs.bch_out, legs.token_in),
    }
}

/// BCH moved by a swap: whichever BCH legs are populated, summed.
#[must_use]
pub fn trade_volume_bch(tx: &StoredTransaction) -> Decimal {
    let legs = tx.legs();
    legs.bch_in
        .unwrap_or_default()
        .saturating_add(legs.bch_out.unwrap_or_default())
}

/// Launch price implied by the earliest create-pool entry for `category`.
///
/// The point is stamped with that entry's timestamp. Returns `None` when no
/// creation entry exists or its legs do not imply a price.
#[must_use]
pub fn initial_price(entries: &[StoredTransaction], category: &str) -> Option<PricePoint> {
    let earliest = entries
        .iter()
        .filter(|tx| tx.tx_type == TransactionType::CreatePool && tx.is_for_token(category))
        .min_by_key(|tx| tx.created_at)?;
    let legs = earliest.legs();
    ratio(legs.bch_in, legs.token_in).map(|price| PricePoint::new(earliest.created_at, price))
}

/// Options for [`build_price_series`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesOptions {
    /// Prefix the series with the launch price when it falls in range.
    pub include_initial: bool,
    /// Attach per-swap BCH volume to each point.
    pub include_volume: bool,
}

/// Builds an ascending price series for `category` over `[from, to]`.
///
/// `from = None` means unbounded. `swaps` and `creations` may contain
/// entries of other tokens and types; they are filtered here. Ties keep
/// input order, with the launch point first.
#[must_use]
pub fn build_price_series(
    swaps: &[StoredTransaction],
    creations: &[StoredTransaction],
    category: &str,
    from: Option<EpochMillis>,
    to: EpochMillis,
    options: SeriesOptions,
) -> Vec<PricePoint> {
    let in_range = |at: EpochMillis| from.is_none_or(|f| at >= f) && at <= to;

    let mut points: Vec<PricePoint> = Vec::with_capacity(swaps.len() + 1);
    if options.include_initial
        && let Some(launch) = initial_price(creations, category)
        && in_range(launch.timestamp)
    {
        points.push(launch);
    }

    points.extend(
        swaps
            .iter()
            .filter(|tx| tx.is_for_token(category) && in_range(tx.created_at))
            .filter_map(|tx| {
                let price = execution_price(tx)?;
                let mut point = PricePoint::new(tx.created_at, price);
                if options.include_volume {
                    point.volume = Some(trade_volume_bch(tx));
                }
                Some(point)
            }),
    );
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Appends the current price at `now` when one exists.
pub fn append_live_point(points: &mut Vec<PricePoint>, now: EpochMillis, price: Option<Decimal>) {
    if let Some(price) = price {
        points.push(PricePoint::new(now, price));
    }
}
