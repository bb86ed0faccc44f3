//! Testnet faucet client.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::{
    address::AccountAddress,
    error::{OnboardError, Result},
};

/// Default faucet grant: 100 gas coins in octas.
pub const DEFAULT_FUND_OCTAS: u64 = 10_000_000_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the faucet's mint endpoint.
#[derive(Clone, Debug)]
pub struct FaucetClient {
    client: Client,
    base_url: Url,
}

impl FaucetClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    /// Requests `octas` for the given address. Returns the faucet's
    /// transaction hash. The faucet expects the address without its `0x`
    /// prefix and answers with an array of hashes.
    pub async fn fund(&self, address: AccountAddress, octas: u64) -> Result<String> {
        let mut url = self.base_url.join("mint")?;
        url.query_pairs_mut()
            .append_pair("amount", &octas.to_string())
            .append_pair("address", &address.to_bare_hex());

        info!(%address, octas, "requesting funds from faucet");
        let response = self.client.post(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OnboardError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        parse_tx_hash(&value).ok_or_else(|| OnboardError::Api {
            status: status.as_u16(),
            body: format!("unexpected faucet payload: {value}"),
        })
    }
}

fn parse_tx_hash(value: &Value) -> Option<String> {
    match value {
        Value::Array(hashes) => hashes.first()?.as_str().map(str::to_string),
        Value::String(hash) => Some(hash.clone()),
        _ => None,
    }
}
