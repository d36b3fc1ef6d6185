//! Baseline resolution and percent change.

use dex_metrics_domain::{EpochMillis, PricePoint};
use rust_decimal::Decimal;

/// Price to compare against for a change measured from `cutoff`.
///
/// Returns the last point at or before `cutoff`; failing that, the first
/// point after it; `None` for an empty series. `points` must be ascending.
#[must_use]
pub fn baseline_price_since(points: &[PricePoint], cutoff: EpochMillis) -> Option<Decimal> {
    let idx = points.partition_point(|p| p.timestamp <= cutoff);
    if idx > 0 {
        points.get(idx - 1).map(|p| p.price_bch)
    } else {
        points.first().map(|p| p.price_bch)
    }
}

/// `(current - baseline) / |baseline| × 100`.
///
/// `None` when either side is missing, the baseline is zero, or the
/// arithmetic overflows.
#[must_use]
pub fn percent_change(current: Option<Decimal>, baseline: Option<Decimal>) -> Option<Decimal> {
    let (current, baseline) = (current?, baseline?);
    if baseline.is_zero() {
        return None;
    }
    current
        .checked_sub(baseline)?
        .checked_div(baseline.abs())?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Percent change of `current` since `cutoff`, falling back to the launch
/// price when the series offers no baseline.
#[must_use]
pub fn change_since(
    points: &[PricePoint],
    cutoff: EpochMillis,
    current: Option<Decimal>,
    launch: Option<Decimal>,
) -> Option<Decimal> {
    let baseline = baseline_price_since(points, cutoff).or(launch);
    percent_change(current, baseline)
}
