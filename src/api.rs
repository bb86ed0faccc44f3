//! REST client for the venue's indexer API.
//!
//! The indexer mirrors on-chain state with bounded but non-zero lag; reads
//! here may be empty or stale shortly after a transaction, which is why the
//! reconciliation and polling layers sit on top of this client rather than
//! trusting a single response.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{
    address::AccountAddress,
    error::{OnboardError, Result},
    market::{MarketSpec, OrderStatusRecord, SubaccountRecord},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the indexer's REST endpoints.
#[derive(Clone, Debug)]
pub struct IndexerClient {
    client: Client,
    base_url: Url,
}

impl IndexerClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: ensure_trailing_slash(base_url),
        })
    }

    /// All markets currently listed. Fetched fresh per use; specs are never
    /// cached across runs.
    pub async fn markets(&self) -> Result<Vec<MarketSpec>> {
        let url = self.base_url.join("api/v1/markets")?;
        self.get_json(url).await
    }

    /// The named market, or [`OnboardError::MarketNotFound`].
    pub async fn market_by_name(&self, name: &str) -> Result<MarketSpec> {
        self.markets()
            .await?
            .into_iter()
            .find(|m| m.market_name == name)
            .ok_or_else(|| OnboardError::MarketNotFound(name.to_string()))
    }

    /// Subaccounts owned by the given address. An empty list is a normal
    /// answer for a freshly created entity the indexer has not seen yet.
    pub async fn subaccounts(&self, owner: AccountAddress) -> Result<Vec<SubaccountRecord>> {
        let mut url = self.base_url.join("api/v1/subaccounts")?;
        url.query_pairs_mut()
            .append_pair("owner", &owner.to_string());
        self.get_json(url).await
    }

    /// Status of one order, addressed by market, user and client order id.
    pub async fn order_status(
        &self,
        market_addr: &str,
        user: AccountAddress,
        client_order_id: &str,
    ) -> Result<OrderStatusRecord> {
        let mut url = self.base_url.join("api/v1/orders")?;
        url.query_pairs_mut()
            .append_pair("market_address", market_addr)
            .append_pair("user_address", &user.to_string())
            .append_pair("client_order_id", client_order_id);
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "indexer request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OnboardError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_join_keeps_path_prefix() {
        let base = ensure_trailing_slash(Url::parse("https://api.example.com/decibel").unwrap());
        assert_eq!(
            base.join("api/v1/markets").unwrap().as_str(),
            "https://api.example.com/decibel/api/v1/markets"
        );

        let already = ensure_trailing_slash(Url::parse("https://api.example.com/decibel/").unwrap());
        assert_eq!(already.as_str(), "https://api.example.com/decibel/");
    }
}
