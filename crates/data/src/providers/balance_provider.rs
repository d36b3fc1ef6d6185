//! Live balance reader backed by an indexer's REST API.

use crate::error::DataError;
use crate::sources::BalanceReader;
use async_trait::async_trait;
use dex_metrics_domain::LiveBalance;
use std::time::Duration;
use tracing::debug;

/// Reads `GET {base_url}/balances/{address}`, answering
/// `{ "bch": <decimal>, "tokens": [{ "category": <hex>, "amount": <decimal> }] }`.
#[derive(Clone)]
pub struct HttpBalanceReader {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBalanceReader {
    /// Creates a reader against `base_url`, each request bounded by `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, address: &str) -> String {
        format!("{}/balances/{}", self.base_url, address)
    }
}

#[async_trait]
impl BalanceReader for HttpBalanceReader {
    async fn balances_for(&self, address: &str) -> Result<LiveBalance, DataError> {
        let response = self.client.get(self.url_for(address)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        let balance: LiveBalance = response.json().await?;
        debug!(
            address,
            bch = %balance.bch,
            tokens = balance.tokens.len(),
            "Fetched live balance"
        );
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_strips_trailing_slash() {
        let reader = HttpBalanceReader::new("http://indexer.local/api/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(
            reader.url_for("bitcoincash:qabc"),
            "http://indexer.local/api/balances/bitcoincash:qabc"
        );
    }

    #[test]
    fn test_response_shape_decodes() {
        let body = r#"{"bch":"1.25","tokens":[{"category":"ab","amount":"40"}]}"#;
        let balance: LiveBalance = serde_json::from_str(body).unwrap();
        assert_eq!(balance.tokens.len(), 1);
        assert_eq!(balance.token_map()["ab"].to_string(), "40");
    }
}
