//! Windowed volume sums.
//!
//! Windows are half-open. The current window of length `W` is
//! `[now - W, now)` and the previous one is `[now - 2W, now - W)`, so an
//! entry is counted in at most one of them.

use dex_metrics_domain::{EpochMillis, StoredTransaction, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// BCH notional of a swap: the first strictly positive of `bch_in`, `bch_out`.
///
/// Non-swap entries and swaps without a positive BCH leg have no volume.
#[must_use]
pub fn swap_volume_bch(tx: &StoredTransaction) -> Option<Decimal> {
    if tx.tx_type != TransactionType::Swap {
        return None;
    }
    let legs = tx.legs();
    [legs.bch_in, legs.bch_out]
        .into_iter()
        .flatten()
        .find(|v| *v > Decimal::ZERO)
}

/// Which comparison window a timestamp lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBucket {
    /// `[now - W, now)`
    Current,
    /// `[now - 2W, now - W)`
    Previous,
}

/// Classifies `at` against windows of length `window_ms` ending at `now`.
#[must_use]
pub fn classify(at: EpochMillis, now: EpochMillis, window_ms: EpochMillis) -> Option<WindowBucket> {
    let current_start = now.saturating_sub(window_ms);
    let previous_start = current_start.saturating_sub(window_ms);
    if (current_start..now).contains(&at) {
        Some(WindowBucket::Current)
    } else if (previous_start..current_start).contains(&at) {
        Some(WindowBucket::Previous)
    } else {
        None
    }
}

/// Volume in the current and previous window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WindowComparison {
    pub current: Decimal,
    pub previous: Decimal,
}

/// Sums swap volume over the current and previous windows.
#[must_use]
pub fn compare_windows(
    entries: &[StoredTransaction],
    now: EpochMillis,
    window_ms: EpochMillis,
) -> WindowComparison {
    entries
        .iter()
        .filter_map(|tx| {
            let volume = swap_volume_bch(tx)?;
            classify(tx.created_at, now, window_ms).map(|bucket| (bucket, volume))
        })
        .fold(WindowComparison::default(), |mut acc, (bucket, volume)| {
            match bucket {
                WindowBucket::Current => acc.current = acc.current.saturating_add(volume),
                WindowBucket::Previous => acc.previous = acc.previous.saturating_add(volume),
            }
            acc
        })
}

/// Swap volume per token over `[from, to)`.
#[must_use]
pub fn volume_by_token(
    entries: &[StoredTransaction],
    from: EpochMillis,
    to: EpochMillis,
) -> HashMap<String, Decimal> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for tx in entries.iter().filter(|tx| (from..to).contains(&tx.created_at)) {
        let (Some(category), Some(volume)) = (tx.token_category.as_ref(), swap_volume_bch(tx)) else {
            continue;
        };
        let total = totals.entry(category.clone()).or_default();
        *total = total.saturating_add(volume);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_metrics_domain::time::DAY_MS;
    use dex_metrics_domain::{TradeDirection, TxAmounts};
    use rust_decimal_macros::dec;

    const NOW: EpochMillis = 1_700_000_000_000;

    fn buy(txid: &str, bch: Decimal, at: EpochMillis) -> StoredTransaction {
        StoredTransaction::swap(
            txid,
            "addr",
            "tok",
            TradeDirection::BchToToken,
            TxAmounts::bch_to_token(bch, dec!(100)),
            at,
        )
    }

    #[test]
    fn test_swap_volume_takes_positive_bch_leg() {
        let sell = StoredTransaction::swap(
            "s",
            "addr",
            "tok",
            TradeDirection::TokenToBch,
            TxAmounts::token_to_bch(dec!(10), dec!(0.4)),
            NOW,
        );
        assert_eq!(swap_volume_bch(&buy("b", dec!(1.5), NOW)), Some(dec!(1.5)));
        assert_eq!(swap_volume_bch(&sell), Some(dec!(0.4)));
        assert_eq!(swap_volume_bch(&buy("z", dec!(0), NOW)), None);
    }

    #[test]
    fn test_liquidity_entries_have_no_volume() {
        let add = StoredTransaction::liquidity(
            "a",
            "addr",
            TransactionType::AddLiquidity,
            "tok",
            TxAmounts::deposit(dec!(5), dec!(500)),
            NOW - 1,
        );
        assert_eq!(swap_volume_bch(&add), None);
        assert_eq!(compare_windows(&[add], NOW, DAY_MS).current, dec!(0));
    }

    #[test]
    fn test_window_boundaries_are_disjoint() {
        let boundary = NOW - DAY_MS;
        assert_eq!(classify(boundary, NOW, DAY_MS), Some(WindowBucket::Current));
        assert_eq!(classify(boundary - 1, NOW, DAY_MS), Some(WindowBucket::Previous));
        assert_eq!(classify(NOW, NOW, DAY_MS), None);
        assert_eq!(classify(NOW - 2 * DAY_MS, NOW, DAY_MS), Some(WindowBucket::Previous));
        assert_eq!(classify(NOW - 2 * DAY_MS - 1, NOW, DAY_MS), None);
    }

    #[test]
    fn test_compare_windows_counts_each_entry_once() {
        let entries = vec![
            buy("1", dec!(1), NOW - 1),
            buy("2", dec!(2), NOW - DAY_MS),
            buy("3", dec!(4), NOW - DAY_MS - 1),
            buy("4", dec!(8), NOW - 3 * DAY_MS),
            buy("5", dec!(16), NOW),
        ];
        let stats = compare_windows(&entries, NOW, DAY_MS);
        assert_eq!(stats.current, dec!(3));
        assert_eq!(stats.previous, dec!(4));
    }

    #[test]
    fn test_volume_by_token() {
        let mut other = buy("3", dec!(7), NOW - 10);
        other.token_category = Some("other".to_string());
        let entries = vec![buy("1", dec!(1), NOW - 5), buy("2", dec!(2), NOW - 6), other];
        let totals = volume_by_token(&entries, NOW - DAY_MS, NOW);
        assert_eq!(totals["tok"], dec!(3));
        assert_eq!(totals["other"], dec!(7));
    }
}
