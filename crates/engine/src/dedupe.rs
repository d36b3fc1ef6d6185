use dex_metrics_domain::StoredTransaction;
use std::collections::HashSet;
use tracing::debug;

/// Drops entries whose txid was already seen. The first occurrence wins, so
/// callers should pass entries in the order they want preserved.
#[must_use]
pub fn dedupe_by_txid(entries: Vec<StoredTransaction>) -> Vec<StoredTransaction> {
    let before = entries.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<_> = entries
        .into_iter()
        .filter(|tx| seen.insert(tx.txid.clone()))
        .collect();
    if kept.len() != before {
        debug!(dropped = before - kept.len(), "Dropped duplicate txids");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_metrics_domain::{TradeDirection, TxAmounts};
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_occurrence_wins() {
        let first = StoredTransaction::swap(
            "t1",
            "a",
            "tok",
            TradeDirection::BchToToken,
            TxAmounts::bch_to_token(dec!(1), dec!(10)),
            100,
        );
        let mut replayed = first.clone();
        replayed.created_at = 200;
        let mut other = first.clone();
        other.txid = "t2".to_string();

        let kept = dedupe_by_txid(vec![first, replayed, other]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].created_at, 100);
        assert_eq!(kept[1].txid, "t2");
    }
}
