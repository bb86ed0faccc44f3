//! Minimal fullnode REST client.
//!
//! Only the balance query lives here; everything else the node can do is
//! behind the external transaction SDK.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    address::AccountAddress,
    error::{OnboardError, Result},
    num::Converter,
};

/// Asset type of the gas coin.
pub const GAS_ASSET: &str = "0x1::aptos_coin::AptosCoin";

/// Decimal exponent of the gas coin (1 APT = 10^8 octas).
pub const GAS_DECIMALS: u8 = 8;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the chain fullnode's REST API.
#[derive(Clone, Debug)]
pub struct FullnodeClient {
    client: Client,
    base_url: Url,
}

impl FullnodeClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    /// Current gas-coin balance in octas. Errors for accounts the chain has
    /// never seen; new wallets hit that before their first funding.
    pub async fn gas_balance(&self, address: AccountAddress) -> Result<u64> {
        let address = address.to_string();
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OnboardError::Config("fullnode URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["accounts", address.as_str(), "balance", GAS_ASSET]);

        debug!(%url, "balance request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OnboardError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // The node encodes u64 as a JSON string; tolerate a bare number too.
        let value: Value = response.json().await?;
        parse_u64(&value).ok_or_else(|| OnboardError::Api {
            status: status.as_u16(),
            body: format!("unexpected balance payload: {value}"),
        })
    }

    /// Balance in whole gas coins, for display.
    pub async fn gas_balance_human(&self, address: AccountAddress) -> Result<f64> {
        let octas = self.gas_balance(address).await?;
        Ok(Converter::new(GAS_DECIMALS).to_human(octas))
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
