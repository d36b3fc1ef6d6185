//! Query model for the transaction log.

use dex_metrics_domain::{EpochMillis, StoredTransaction, TransactionType};

/// Ordering by `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Ascending,
    /// Newest first.
    Descending,
}

impl SortOrder {
    /// SQL keyword for this order.
    #[must_use]
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Filter over the transaction log.
///
/// Empty `types` matches every type. The time bounds are
/// `[created_from, created_before)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Entry types to include.
    pub types: Vec<TransactionType>,
    /// Token category to match.
    pub token_category: Option<String>,
    /// Address to match.
    pub address: Option<String>,
    /// Inclusive lower bound on `createdAt`.
    pub created_from: Option<EpochMillis>,
    /// Exclusive upper bound on `createdAt`.
    pub created_before: Option<EpochMillis>,
    /// Result ordering.
    pub sort: SortOrder,
    /// Maximum number of entries.
    pub limit: Option<u32>,
}

impl TransactionFilter {
    /// Matches every entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a single entry type.
    #[must_use]
    pub fn of_type(mut self, tx_type: TransactionType) -> Self {
        self.types = vec![tx_type];
        self
    }

    /// Restricts to several entry types.
    #[must_use]
    pub fn of_types(mut self, types: &[TransactionType]) -> Self {
        self.types = types.to_vec();
        self
    }

    /// Restricts to one token category.
    #[must_use]
    pub fn token(mut self, category: impl Into<String>) -> Self {
        self.token_category = Some(category.into());
        self
    }

    /// Restricts to one address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Entries created at or after `from`.
    #[must_use]
    pub fn since(mut self, from: EpochMillis) -> Self {
        self.created_from = Some(from);
        self
    }

    /// Entries created strictly before `before`.
    #[must_use]
    pub fn before(mut self, before: EpochMillis) -> Self {
        self.created_before = Some(before);
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `tx` satisfies every predicate of this filter.
    #[must_use]
    pub fn matches(&self, tx: &StoredTransaction) -> bool {
        (self.types.is_empty() || self.types.contains(&tx.tx_type))
            && self
                .token_category
                .as_deref()
                .is_none_or(|c| tx.is_for_token(c))
            && self.address.as_deref().is_none_or(|a| tx.address == a)
            && self.created_from.is_none_or(|from| tx.created_at >= from)
            && self.created_before.is_none_or(|b| tx.created_at < b)
    }

    /// Filters, sorts and truncates an in-memory collection.
    #[must_use]
    pub fn apply<'a, I>(&self, entries: I) -> Vec<StoredTransaction>
    where
        I: IntoIterator<Item = &'a StoredTransaction>,
    {
        let mut out: Vec<StoredTransaction> =
            entries.into_iter().filter(|tx| self.matches(tx)).cloned().collect();
        match self.sort {
            SortOrder::Ascending => out.sort_by_key(|tx| tx.created_at),
            SortOrder::Descending => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        if let Some(limit) = self.limit {
            out.truncate(limit as usize);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_metrics_domain::{TradeDirection, TxAmounts};
    use rust_decimal_macros::dec;

    fn swap(txid: &str, addr: &str, cat: &str, at: EpochMillis) -> StoredTransaction {
        StoredTransaction::swap(
            txid,
            addr,
            cat,
            TradeDirection::BchToToken,
            TxAmounts::bch_to_token(dec!(1), dec!(10)),
            at,
        )
    }

    #[test]
    fn test_time_bounds_are_half_open() {
        let f = TransactionFilter::new().since(100).before(200);
        assert!(f.matches(&swap("a", "x", "c", 100)));
        assert!(f.matches(&swap("b", "x", "c", 199)));
        assert!(!f.matches(&swap("c", "x", "c", 200)));
        assert!(!f.matches(&swap("d", "x", "c", 99)));
    }

    #[test]
    fn test_type_and_token_predicates() {
        let f = TransactionFilter::new()
            .of_type(TransactionType::CreatePool)
            .token("c");
        assert!(!f.matches(&swap("a", "x", "c", 1)));

        let f = TransactionFilter::new().of_type(TransactionType::Swap).token("c");
        assert!(f.matches(&swap("a", "x", "c", 1)));
        assert!(!f.matches(&swap("a", "x", "other", 1)));
    }

    #[test]
    fn test_apply_sorts_and_limits() {
        let entries = vec![
            swap("a", "x", "c", 30),
            swap("b", "x", "c", 10),
            swap("c", "y", "c", 20),
        ];
        let f = TransactionFilter::new()
            .address("x")
            .sorted(SortOrder::Descending)
            .limit(1);
        let out = f.apply(&entries);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].txid, "a");

        let asc = TransactionFilter::new().apply(&entries);
        let order: Vec<_> = asc.iter().map(|t| t.created_at).collect();
        assert_eq!(order, vec![10, 20, 30]);
    }
}
