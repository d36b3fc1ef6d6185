//! Entries of the append-only transaction log.

use crate::enums::{TradeDirection, TransactionType};
use crate::error::DomainError;
use crate::time::{EpochMillis, LOG_EPOCH_MS, MAX_FUTURE_SKEW_MS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// BCH and token legs of a recorded action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TxAmounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bch_in: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bch_out: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_in: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_out: Option<Decimal>,
}

impl TxAmounts {
    /// Legs of a BCH-to-token swap.
    #[must_use]
    pub fn bch_to_token(bch_in: Decimal, token_out: Decimal) -> Self {
        Self {
            bch_in: Some(bch_in),
            token_out: Some(token_out),
            ..Self::default()
        }
    }

    /// Legs of a token-to-BCH swap.
    #[must_use]
    pub fn token_to_bch(token_in: Decimal, bch_out: Decimal) -> Self {
        Self {
            token_in: Some(token_in),
            bch_out: Some(bch_out),
            ..Self::default()
        }
    }

    /// Legs of a pool creation or liquidity deposit.
    #[must_use]
    pub fn deposit(bch_in: Decimal, token_in: Decimal) -> Self {
        Self {
            bch_in: Some(bch_in),
            token_in: Some(token_in),
            ..Self::default()
        }
    }

    /// Legs of a liquidity withdrawal.
    #[must_use]
    pub fn withdrawal(bch_out: Decimal, token_out: Decimal) -> Self {
        Self {
            bch_out: Some(bch_out),
            token_out: Some(token_out),
            ..Self::default()
        }
    }

    fn check_non_negative(&self) -> Result<(), DomainError> {
        let legs = [
            ("bchIn", self.bch_in),
            ("bchOut", self.bch_out),
            ("tokenIn", self.token_in),
            ("tokenOut", self.token_out),
        ];
        for (name, value) in legs {
            if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
                return Err(DomainError::NegativeAmount(name));
            }
        }
        Ok(())
    }
}

/// One client-reported entry of the transaction log.
///
/// Entries are immutable once written. Delivery is at-least-once and
/// unconfirmed: duplicates and gaps are possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredTransaction {
    pub txid: String,
    pub address: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TradeDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amounts: Option<TxAmounts>,
    pub created_at: EpochMillis,
}

impl StoredTransaction {
    /// Creates a swap entry.
    pub fn swap(
        txid: impl Into<String>,
        address: impl Into<String>,
        token_category: impl Into<String>,
        direction: TradeDirection,
        amounts: TxAmounts,
        created_at: EpochMillis,
    ) -> Self {
        Self {
            txid: txid.into(),
            address: address.into(),
            tx_type: TransactionType::Swap,
            direction: Some(direction),
            token_category: Some(token_category.into()),
            amounts: Some(amounts),
            created_at,
        }
    }

    /// Creates a pool creation or liquidity entry.
    pub fn liquidity(
        txid: impl Into<String>,
        address: impl Into<String>,
        tx_type: TransactionType,
        token_category: impl Into<String>,
        amounts: TxAmounts,
        created_at: EpochMillis,
    ) -> Self {
        Self {
            txid: txid.into(),
            address: address.into(),
            tx_type,
            direction: None,
            token_category: Some(token_category.into()),
            amounts: Some(amounts),
            created_at,
        }
    }

    /// Swap direction, present only on swap entries.
    #[must_use]
    pub fn swap_direction(&self) -> Option<TradeDirection> {
        match self.tx_type {
            TransactionType::Swap => self.direction,
            _ => None,
        }
    }

    /// Whether this entry is for the given token category.
    #[must_use]
    pub fn is_for_token(&self, category: &str) -> bool {
        self.token_category.as_deref() == Some(category)
    }

    /// Amount legs, or all-empty legs when none were recorded.
    #[must_use]
    pub fn legs(&self) -> TxAmounts {
        self.amounts.unwrap_or_default()
    }

    /// Checks the entry against the log's shape invariants.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.txid.trim().is_empty() {
            return Err(DomainError::MissingField("txid"));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::MissingField("address"));
        }
        if self
            .token_category
            .as_deref()
            .is_none_or(|c| c.trim().is_empty())
        {
            return Err(DomainError::MissingField("tokenCategory"));
        }
        if let Some(amounts) = &self.amounts {
            amounts.check_non_negative()?;
        }

        match self.tx_type {
            TransactionType::Swap => {
                let direction = self.direction.ok_or(DomainError::MissingField("direction"))?;
                let a = self.amounts.ok_or(DomainError::MissingField("amounts"))?;
                let expected = match direction {
                    TradeDirection::BchToToken => (
                        a.bch_in.is_some() && a.token_out.is_some(),
                        a.bch_out.is_none() && a.token_in.is_none(),
                    ),
                    TradeDirection::TokenToBch => (
                        a.token_in.is_some() && a.bch_out.is_some(),
                        a.bch_in.is_none() && a.token_out.is_none(),
                    ),
                };
                if expected != (true, true) {
                    return Err(DomainError::InvalidAmounts(format!(
                        "{direction} swap must carry exactly its own BCH and token legs"
                    )));
                }
            }
            TransactionType::CreatePool
            | TransactionType::AddLiquidity
            | TransactionType::RemoveLiquidity => {
                if self.direction.is_some() {
                    return Err(DomainError::InvalidAmounts(format!(
                        "direction is not valid on {}",
                        self.tx_type
                    )));
                }
                if let Some(a) = &self.amounts {
                    let ok = if self.tx_type == TransactionType::RemoveLiquidity {
                        a.bch_out.is_some() && a.bch_in.is_none()
                    } else {
                        a.bch_in.is_some() && a.bch_out.is_none()
                    };
                    if !ok {
                        return Err(DomainError::InvalidAmounts(format!(
                            "{} must carry exactly one BCH leg in its own direction",
                            self.tx_type
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate), plus a check that `created_at` lies
    /// between [`LOG_EPOCH_MS`] and `now` plus [`MAX_FUTURE_SKEW_MS`].
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate_at(&self, now: EpochMillis) -> Result<(), DomainError> {
        self.validate()?;
        let latest = now.saturating_add(MAX_FUTURE_SKEW_MS);
        if !(LOG_EPOCH_MS..=latest).contains(&self.created_at) {
            return Err(DomainError::TimestampOutOfRange(self.created_at));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buy() -> StoredTransaction {
        StoredTransaction::swap(
            "tx1",
            "bitcoincash:qabc",
            "cat",
            TradeDirection::BchToToken,
            TxAmounts::bch_to_token(dec!(1), dec!(100)),
            1_000,
        )
    }

    #[test]
    fn test_valid_swap() {
        assert!(buy().validate().is_ok());
        assert_eq!(buy().swap_direction(), Some(TradeDirection::BchToToken));
    }

    #[test]
    fn test_swap_requires_direction() {
        let mut tx = buy();
        tx.direction = None;
        assert_eq!(
            tx.validate(),
            Err(DomainError::MissingField("direction"))
        );
    }

    #[test]
    fn test_swap_rejects_mismatched_legs() {
        let mut tx = buy();
        tx.amounts = Some(TxAmounts::token_to_bch(dec!(100), dec!(1)));
        assert!(matches!(tx.validate(), Err(DomainError::InvalidAmounts(_))));

        let mut both = buy();
        both.amounts = Some(TxAmounts {
            bch_in: Some(dec!(1)),
            bch_out: Some(dec!(1)),
            token_in: None,
            token_out: Some(dec!(10)),
        });
        assert!(both.validate().is_err());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut tx = buy();
        tx.amounts = Some(TxAmounts::bch_to_token(dec!(-1), dec!(100)));
        assert_eq!(tx.validate(), Err(DomainError::NegativeAmount("bchIn")));
    }

    #[test]
    fn test_liquidity_legs() {
        let add = StoredTransaction::liquidity(
            "tx2",
            "addr",
            TransactionType::AddLiquidity,
            "cat",
            TxAmounts::deposit(dec!(5), dec!(500)),
            10,
        );
        assert!(add.validate().is_ok());
        assert_eq!(add.swap_direction(), None);

        let bad_remove = StoredTransaction::liquidity(
            "tx3",
            "addr",
            TransactionType::RemoveLiquidity,
            "cat",
            TxAmounts::deposit(dec!(5), dec!(500)),
            10,
        );
        assert!(bad_remove.validate().is_err());
    }

    #[test]
    fn test_created_at_bounds() {
        let now = 1_700_000_000_000;
        let at = |created_at| StoredTransaction { created_at, ..buy() };

        assert!(at(now).validate_at(now).is_ok());
        assert!(at(LOG_EPOCH_MS).validate_at(now).is_ok());
        assert!(at(now + MAX_FUTURE_SKEW_MS).validate_at(now).is_ok());

        for bad in [i64::MIN, -1_000_000_000_000_000, 0, LOG_EPOCH_MS - 1, now + MAX_FUTURE_SKEW_MS + 1, i64::MAX] {
            assert_eq!(
                at(bad).validate_at(now),
                Err(DomainError::TimestampOutOfRange(bad))
            );
        }
        // Shape errors still come first.
        let mut shapeless = at(i64::MIN);
        shapeless.direction = None;
        assert_eq!(
            shapeless.validate_at(now),
            Err(DomainError::MissingField("direction"))
        );
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(buy()).unwrap();
        assert_eq!(json["type"], "swap");
        assert_eq!(json["direction"], "bch_to_token");
        assert_eq!(json["tokenCategory"], "cat");
        assert_eq!(json["createdAt"], 1_000);
        assert!(json["amounts"].get("bchOut").is_none());
    }
}
