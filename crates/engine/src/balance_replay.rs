//! Balance history by backward replay.
//!
//! Only the live balance is known exactly. Walking the address's swaps from
//! newest to oldest and inverting each one reconstructs what the address
//! held just before it. Every reconstructed state is valued at the current
//! token prices, so the series reflects holdings changes rather than price
//! moves.

use crate::volume::swap_volume_bch;
use dex_metrics_domain::time::WEEK_MS;
use dex_metrics_domain::{
    BalancePoint, EpochMillis, LiveBalance, StoredTransaction, TradeDirection,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

/// Reconstructed balance series plus trailing-week activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceHistory {
    /// Ascending by timestamp; the last point is the live balance.
    pub points: Vec<BalancePoint>,
    pub swaps_this_week: usize,
    pub swapped_this_week_bch: Decimal,
}

/// Values holdings at `prices`; tokens without a price count as zero.
#[must_use]
pub fn value_holdings(
    bch: Decimal,
    tokens: &BTreeMap<String, Decimal>,
    prices: &HashMap<String, Decimal>,
) -> Decimal {
    tokens.iter().fold(bch, |acc, (category, amount)| {
        let price = prices.get(category).copied().unwrap_or_default();
        acc.saturating_add(amount.saturating_mul(price))
    })
}

struct Holdings {
    bch: Decimal,
    tokens: BTreeMap<String, Decimal>,
}

impl Holdings {
    fn point(&self, timestamp: EpochMillis, prices: &HashMap<String, Decimal>) -> BalancePoint {
        BalancePoint {
            timestamp,
            value_bch: value_holdings(self.bch, &self.tokens, prices),
            bch: self.bch,
            tokens: self.tokens.clone(),
        }
    }

    fn adjust_token(&mut self, category: &str, delta: Decimal) {
        let amount = self.tokens.get(category).copied().unwrap_or_default().saturating_add(delta);
        if amount > Decimal::ZERO {
            self.tokens.insert(category.to_string(), amount);
        } else {
            self.tokens.remove(category);
        }
    }

    /// Undoes one swap.
    fn invert(&mut self, tx: &StoredTransaction) {
        let (Some(direction), Some(category)) = (tx.swap_direction(), tx.token_category.as_deref())
        else {
            return;
        };
        let legs = tx.legs();
        match direction {
            TradeDirection::BchToToken => {
                self.bch = self.bch.saturating_add(legs.bch_in.unwrap_or_default());
                self.adjust_token(category, -legs.token_out.unwrap_or_default());
            }
            TradeDirection::TokenToBch => {
                self.bch = self.bch.saturating_sub(legs.bch_out.unwrap_or_default());
                self.adjust_token(category, legs.token_in.unwrap_or_default());
            }
        }
    }
}

/// Replays `entries` backwards from `live` and values each state.
///
/// Non-swap entries are ignored. Entries dated after `now` are stamped at
/// `now`. BCH is not clamped, so a negative reconstructed BCH balance
/// surfaces incomplete history instead of hiding it.
#[must_use]
pub fn replay_balance_history(
    live: &LiveBalance,
    entries: &[StoredTransaction],
    prices: &HashMap<String, Decimal>,
    now: EpochMillis,
) -> BalanceHistory {
    let mut swaps: Vec<&StoredTransaction> =
        entries.iter().filter(|tx| tx.swap_direction().is_some()).collect();
    swaps.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut holdings = Holdings {
        bch: live.bch,
        tokens: live
            .token_map()
            .into_iter()
            .filter(|(_, amount)| *amount > Decimal::ZERO)
            .collect(),
    };

    let mut descending = Vec::with_capacity(swaps.len() + 1);
    descending.push(holdings.point(now, prices));
    for tx in &swaps {
        holdings.invert(tx);
        descending.push(holdings.point(tx.created_at.min(now), prices));
    }
    descending.reverse();

    let week_start = now.saturating_sub(WEEK_MS);
    let (swaps_this_week, swapped_this_week_bch) = swaps
        .iter()
        .filter(|tx| tx.created_at >= week_start)
        .fold((0usize, Decimal::ZERO), |(count, total), tx| {
            let volume = swap_volume_bch(tx).unwrap_or_default();
            (count + 1, total.saturating_add(volume))
        });

    BalanceHistory {
        points: descending,
        swaps_this_week,
        swapped_this_week_bch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_metrics_domain::time::DAY_MS;
    use dex_metrics_domain::{TransactionType, TxAmounts};
    use rust_decimal_macros::dec;

    const NOW: EpochMillis = 1_700_000_000_000;

    fn buy(bch: Decimal, tokens: Decimal, at: EpochMillis) -> StoredTransaction {
        StoredTransaction::swap(
            format!("b{at}"),
            "addr",
            "A",
            TradeDirection::BchToToken,
            TxAmounts::bch_to_token(bch, tokens),
            at,
        )
    }

    fn sell(tokens: Decimal, bch: Decimal, at: EpochMillis) -> StoredTransaction {
        StoredTransaction::swap(
            format!("s{at}"),
            "addr",
            "A",
            TradeDirection::TokenToBch,
            TxAmounts::token_to_bch(tokens, bch),
            at,
        )
    }

    fn prices() -> HashMap<String, Decimal> {
        HashMap::from([("A".to_string(), dec!(0.01))])
    }

    #[test]
    fn test_latest_point_is_live_balance() {
        let live = LiveBalance::new(dec!(5)).with_token("A", dec!(50));
        let history = replay_balance_history(&live, &[buy(dec!(2), dec!(20), NOW - 10)], &prices(), NOW);

        let last = history.points.last().unwrap();
        assert_eq!(last.timestamp, NOW);
        assert_eq!(last.bch, dec!(5));
        assert_eq!(last.tokens["A"], dec!(50));
        assert_eq!(last.value_bch, dec!(5.5));
    }

    #[test]
    fn test_inverting_a_buy() {
        let live = LiveBalance::new(dec!(5)).with_token("A", dec!(50));
        let t0 = NOW - DAY_MS;
        let history = replay_balance_history(&live, &[buy(dec!(2), dec!(20), t0)], &prices(), NOW);

        assert_eq!(history.points.len(), 2);
        let first = &history.points[0];
        assert_eq!(first.timestamp, t0);
        assert_eq!(first.bch, dec!(7));
        assert_eq!(first.tokens["A"], dec!(30));
        assert_eq!(history.points[1].bch, dec!(5));
        assert_eq!(history.points[1].tokens["A"], dec!(50));
    }

    #[test]
    fn test_inverting_a_sell_and_dropping_empty_tokens() {
        let live = LiveBalance::new(dec!(3)).with_token("A", dec!(10));
        let entries = vec![
            buy(dec!(1), dec!(10), NOW - 20),
            sell(dec!(5), dec!(0.5), NOW - 10),
        ];
        let history = replay_balance_history(&live, &entries, &prices(), NOW);

        let stamps: Vec<_> = history.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![NOW - 20, NOW - 10, NOW]);
        // Before the sell: 2.5 BCH, 15 A. Before the buy: 3.5 BCH, 5 A.
        assert_eq!(history.points[1].bch, dec!(2.5));
        assert_eq!(history.points[1].tokens["A"], dec!(15));
        assert_eq!(history.points[0].bch, dec!(3.5));
        assert_eq!(history.points[0].tokens["A"], dec!(5));

        let drained = LiveBalance::new(dec!(1)).with_token("A", dec!(10));
        let history = replay_balance_history(&drained, &[buy(dec!(1), dec!(10), NOW - 1)], &prices(), NOW);
        assert!(history.points[0].tokens.is_empty());
    }

    #[test]
    fn test_bch_is_not_clamped() {
        let live = LiveBalance::new(dec!(0.1));
        let history = replay_balance_history(&live, &[sell(dec!(5), dec!(1), NOW - 1)], &prices(), NOW);
        assert_eq!(history.points[0].bch, dec!(-0.9));
    }

    #[test]
    fn test_unpriced_tokens_value_at_zero() {
        let live = LiveBalance::new(dec!(1)).with_token("B", dec!(1000));
        let history = replay_balance_history(&live, &[], &prices(), NOW);
        assert_eq!(history.points.len(), 1);
        assert_eq!(history.points[0].value_bch, dec!(1));
    }

    #[test]
    fn test_week_stats_and_non_swaps_ignored() {
        let live = LiveBalance::new(dec!(10));
        let add = StoredTransaction::liquidity(
            "lp",
            "addr",
            TransactionType::AddLiquidity,
            "A",
            TxAmounts::deposit(dec!(4), dec!(400)),
            NOW - 5,
        );
        let entries = vec![
            buy(dec!(1), dec!(100), NOW - DAY_MS),
            sell(dec!(10), dec!(0.25), NOW - 2 * DAY_MS),
            buy(dec!(9), dec!(100), NOW - 8 * DAY_MS),
            add,
        ];
        let history = replay_balance_history(&live, &entries, &prices(), NOW);
        assert_eq!(history.points.len(), 4);
        assert_eq!(history.swaps_this_week, 2);
        assert_eq!(history.swapped_this_week_bch, dec!(1.25));
    }
}
