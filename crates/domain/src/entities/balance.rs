use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Amount of one fungible token held by an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub category: String,
    pub amount: Decimal,
}

/// Live balance of an address as reported by the balance service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveBalance {
    pub bch: Decimal,
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

impl LiveBalance {
    /// Creates a balance holding only BCH.
    #[must_use]
    pub fn new(bch: Decimal) -> Self {
        Self {
            bch,
            tokens: Vec::new(),
        }
    }

    /// Adds a token holding.
    #[must_use]
    pub fn with_token(mut self, category: impl Into<String>, amount: Decimal) -> Self {
        self.tokens.push(TokenBalance {
            category: category.into(),
            amount,
        });
        self
    }

    /// Token holdings keyed by category; repeated categories are summed.
    #[must_use]
    pub fn token_map(&self) -> BTreeMap<String, Decimal> {
        let mut map = BTreeMap::new();
        for t in &self.tokens {
            *map.entry(t.category.clone()).or_insert(Decimal::ZERO) += t.amount;
        }
        map
    }
}
