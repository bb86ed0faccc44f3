//! Onboarding SDK for the Decibel perpetuals venue.
//!
//! # Overview
//!
//! Covers the path from an empty wallet to a resting order: fund the wallet
//! from the faucet, create a trading subaccount, mint and deposit
//! collateral, place an order, query its state.
//!
//! Two problems carry the real weight and get dedicated modules:
//!
//! * [`resolve`]: after a create-subaccount transaction, the canonical
//!   address of the new entity has to be reconciled from the transaction's
//!   events, a deterministic derivation ([`address`]), and a lagging
//!   indexer, with a fixed precedence and bounded retries ([`retry`]).
//! * [`num`]: user-entered prices and sizes have to be snapped onto the
//!   venue's tick/lot grid and converted to integer chain units before they
//!   are baked into a transaction that cannot be amended once sent.
//!
//! Transaction signing is delegated to an external SDK behind
//! [`txn::TransactionService`]; [`testing`] provides doubles for it.
//!
//! # Limitations/follow-ups
//!
//! * Websocket order-update subscriptions are not covered.
//! * Historical orders are not persisted; [`api::IndexerClient`] only reads
//!   current state.

pub mod address;
pub mod api;
pub mod error;
pub mod faucet;
pub mod market;
pub mod node;
pub mod num;
pub mod onboard;
pub mod resolve;
pub mod retry;
pub mod settings;
pub mod testing;
pub mod txn;

use url::Url;

use crate::{address::AccountAddress, error::Result};

/// Seed of the collateral (USDC) metadata object under the package address.
pub const COLLATERAL_SEED: &str = "USDC";

/// Netna staging deployment endpoints, usable as environment defaults.
pub const NETNA_PACKAGE_ADDRESS: &str =
    "0xb8a5788314451ce4d2fbbad32e1bad88d4184b73943b7fe5166eab93cf1a5a95";
pub const NETNA_FULLNODE_URL: &str = "https://api.netna.staging.aptoslabs.com/v1";
pub const NETNA_INDEXER_URL: &str = "https://api.netna.aptoslabs.com/decibel";
pub const NETNA_WEBSOCKET_URL: &str = "wss://api.netna.aptoslabs.com/decibel/ws";
pub const NETNA_FAUCET_URL: &str =
    "https://faucet-dev-netna-us-central1-410192433417.us-central1.run.app";

/// Deployment of the venue: the package address and the service endpoints
/// around it.
#[derive(Clone, Debug)]
pub struct Venue {
    package_address: AccountAddress,
    fullnode_url: Url,
    indexer_url: Url,
    websocket_url: Url,
    faucet_url: Url,
}

impl Venue {
    /// The Netna staging deployment.
    pub fn netna() -> Result<Self> {
        Self::custom(
            NETNA_PACKAGE_ADDRESS,
            NETNA_FULLNODE_URL,
            NETNA_INDEXER_URL,
            NETNA_WEBSOCKET_URL,
            NETNA_FAUCET_URL,
        )
    }

    pub fn custom(
        package_address: &str,
        fullnode_url: &str,
        indexer_url: &str,
        websocket_url: &str,
        faucet_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            package_address: package_address.parse()?,
            fullnode_url: Url::parse(fullnode_url)?,
            indexer_url: Url::parse(indexer_url)?,
            websocket_url: Url::parse(websocket_url)?,
            faucet_url: Url::parse(faucet_url)?,
        })
    }

    pub fn package_address(&self) -> AccountAddress {
        self.package_address
    }

    pub fn fullnode_url(&self) -> &Url {
        &self.fullnode_url
    }

    pub fn indexer_url(&self) -> &Url {
        &self.indexer_url
    }

    pub fn websocket_url(&self) -> &Url {
        &self.websocket_url
    }

    pub fn faucet_url(&self) -> &Url {
        &self.faucet_url
    }

    /// Address of the collateral metadata object, derived from the package
    /// address with the well-known seed rather than queried from the chain.
    pub fn collateral_metadata(&self) -> AccountAddress {
        self.package_address.derive_object(COLLATERAL_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netna_venue_parses() {
        let venue = Venue::netna().unwrap();
        assert_eq!(
            venue.package_address().to_string(),
            NETNA_PACKAGE_ADDRESS.to_string()
        );
        assert_eq!(venue.fullnode_url().as_str(), NETNA_FULLNODE_URL);
    }

    #[test]
    fn test_collateral_metadata_is_derived() {
        let venue = Venue::netna().unwrap();
        assert_eq!(
            venue.collateral_metadata().to_string(),
            "0x6555ba01030b366f91c999ac943325096495b339d81e216a2af45e1023609f02"
        );
    }
}
