use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Kind of action recorded in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// A trade against a pool.
    Swap,
    /// A pool was seeded with its first liquidity.
    CreatePool,
    /// Liquidity was added to an existing pool.
    AddLiquidity,
    /// Liquidity was withdrawn from a pool.
    RemoveLiquidity,
}

impl TransactionType {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Swap,
        Self::CreatePool,
        Self::AddLiquidity,
        Self::RemoveLiquidity,
    ];

    /// Storage and wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swap => "swap",
            Self::CreatePool => "create_pool",
            Self::AddLiquidity => "add_liquidity",
            Self::RemoveLiquidity => "remove_liquidity",
        }
    }

    /// Whether this entry moves pool reserves outside of trading.
    #[must_use]
    pub fn affects_liquidity(&self) -> bool {
        match self {
            Self::Swap => false,
            Self::CreatePool | Self::AddLiquidity | Self::RemoveLiquidity => true,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "swap" => Ok(Self::Swap),
            "create_pool" => Ok(Self::CreatePool),
            "add_liquidity" => Ok(Self::AddLiquidity),
            "remove_liquidity" => Ok(Self::RemoveLiquidity),
            other => Err(DomainError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// Direction of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    /// BCH goes into the pool, tokens come out.
    BchToToken,
    /// Tokens go into the pool, BCH comes out.
    TokenToBch,
}

impl TradeDirection {
    /// Storage and wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BchToToken => "bch_to_token",
            Self::TokenToBch => "token_to_bch",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bch_to_token" => Ok(Self::BchToToken),
            "token_to_bch" => Ok(Self::TokenToBch),
            other => Err(DomainError::UnknownDirection(other.to_string())),
        }
    }
}

/// How much of a pool counts as locked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TvlConvention {
    /// Only the BCH reserve.
    BchSideOnly,
    /// Both reserves, the token side valued at the pool price (2x the BCH reserve).
    #[default]
    BothSides,
}

impl TvlConvention {
    /// Scales a BCH-side amount into this convention.
    #[must_use]
    pub fn scale(&self, bch_side: Decimal) -> Decimal {
        match self {
            Self::BchSideOnly => bch_side,
            Self::BothSides => bch_side * Decimal::TWO,
        }
    }
}

impl FromStr for TvlConvention {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bch_side_only" | "bch" | "single" => Ok(Self::BchSideOnly),
            "both_sides" | "both" | "double" => Ok(Self::BothSides),
            other => Err(DomainError::UnknownTvlConvention(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_type_roundtrip_names() {
        for t in TransactionType::ALL {
            assert_eq!(t.as_str().parse::<TransactionType>().unwrap(), t);
        }
        assert!("burn".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_direction_wire_format() {
        let json = serde_json::to_string(&TradeDirection::BchToToken).unwrap();
        assert_eq!(json, "\"bch_to_token\"");
        let parsed: TradeDirection = serde_json::from_str("\"token_to_bch\"").unwrap();
        assert_eq!(parsed, TradeDirection::TokenToBch);
    }

    #[test]
    fn test_liquidity_classification() {
        assert!(!TransactionType::Swap.affects_liquidity());
        assert!(TransactionType::CreatePool.affects_liquidity());
        assert!(TransactionType::RemoveLiquidity.affects_liquidity());
    }

    #[test]
    fn test_tvl_convention_scale() {
        assert_eq!(TvlConvention::BchSideOnly.scale(dec!(10)), dec!(10));
        assert_eq!(TvlConvention::BothSides.scale(dec!(10)), dec!(20));
        assert_eq!(
            "both".parse::<TvlConvention>().unwrap(),
            TvlConvention::BothSides
        );
    }
}
