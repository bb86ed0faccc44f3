//! Configuration for the onboard CLI.
//!
//! Everything comes from environment variables (via .env file or shell);
//! unset endpoints fall back to the Netna staging deployment.

use decibel_onboard::{
    NETNA_FAUCET_URL, NETNA_FULLNODE_URL, NETNA_INDEXER_URL, NETNA_PACKAGE_ADDRESS,
    NETNA_WEBSOCKET_URL, Venue,
    address::{AccountAddress, AddressParseError},
    error::OnboardError,
};

const DEFAULT_MARKET_NAME: &str = "BTC-PERP";

/// Environment configuration (connection details, credentials).
#[derive(derive_more::Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Wallet address used for queries and as the owner of created entities
    pub api_wallet_address: String,

    /// Private key, consumed by the external signing SDK only. Never logged.
    #[debug(skip)]
    pub api_wallet_private_key: Option<String>,

    /// Venue package address override
    pub package_address: Option<String>,

    /// Fullnode REST URL override
    pub fullnode_url: Option<String>,

    /// Indexer REST URL override
    pub rest_api_base_url: Option<String>,

    /// Websocket URL override
    pub websocket_url: Option<String>,

    /// Faucet URL override
    pub faucet_url: Option<String>,

    /// Subaccount recorded by an earlier create-subaccount run
    pub subaccount_address: Option<String>,

    /// Market to trade/query when none is given on the command line
    pub market_name: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Venue assembled from the overrides, with Netna defaults.
    pub fn venue(&self) -> Result<Venue, OnboardError> {
        Venue::custom(
            self.package_address.as_deref().unwrap_or(NETNA_PACKAGE_ADDRESS),
            self.fullnode_url.as_deref().unwrap_or(NETNA_FULLNODE_URL),
            self.rest_api_base_url.as_deref().unwrap_or(NETNA_INDEXER_URL),
            self.websocket_url.as_deref().unwrap_or(NETNA_WEBSOCKET_URL),
            self.faucet_url.as_deref().unwrap_or(NETNA_FAUCET_URL),
        )
    }

    /// Parse the wallet address.
    pub fn wallet_address(&self) -> Result<AccountAddress, AddressParseError> {
        self.api_wallet_address.parse()
    }

    pub fn market_name(&self) -> &str {
        self.market_name.as_deref().unwrap_or(DEFAULT_MARKET_NAME)
    }
}
