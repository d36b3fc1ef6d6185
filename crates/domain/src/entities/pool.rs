use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current reserves and metadata of one BCH/token AMM pool.
///
/// `token_price_in_bch` is supplied already computed by the chain reader;
/// the engine never re-derives it from the reserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub pool_address: String,
    pub pool_owner_key_hash: String,
    pub token_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_icon_url: Option<String>,
    pub bch_reserve: Decimal,
    pub token_reserve: Decimal,
    pub token_price_in_bch: Decimal,
}

impl PoolSnapshot {
    /// Creates a snapshot without token metadata.
    pub fn new(
        pool_address: impl Into<String>,
        token_category: impl Into<String>,
        bch_reserve: Decimal,
        token_reserve: Decimal,
        token_price_in_bch: Decimal,
    ) -> Self {
        Self {
            pool_address: pool_address.into(),
            pool_owner_key_hash: String::new(),
            token_category: token_category.into(),
            token_symbol: None,
            token_name: None,
            token_icon_url: None,
            bch_reserve,
            token_reserve,
            token_price_in_bch,
        }
    }

    /// Attaches symbol and name metadata.
    #[must_use]
    pub fn with_metadata(mut self, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        self.token_symbol = Some(symbol.into());
        self.token_name = Some(name.into());
        self
    }
}
