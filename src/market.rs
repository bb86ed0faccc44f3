//! Market and indexer wire types.
//!
//! These mirror the REST API payloads. Market specs are fetched fresh per
//! use and never cached across runs; the on-chain minimums they carry are
//! enforced by the venue at execution time, so a stale spec means a rejected
//! transaction, not a mispriced order.

use serde::Deserialize;

use crate::{
    address::AccountAddress,
    error::{OnboardError, Result},
    num::Converter,
};

/// One tradable instrument, as listed by the markets endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct MarketSpec {
    pub market_name: String,
    pub market_addr: String,

    /// Decimal exponent for price chain units.
    pub px_decimals: u8,

    /// Decimal exponent for size chain units.
    pub sz_decimals: u8,

    /// Minimum price increment, in chain units.
    pub tick_size: u64,

    /// Minimum size increment, in chain units.
    pub lot_size: u64,

    /// Minimum order size, in chain units.
    pub min_size: u64,

    #[serde(default)]
    pub max_leverage: Option<u32>,
}

impl MarketSpec {
    /// Checks the grid invariants. A spec with a zero tick or lot size
    /// would make every snap divide by zero, so it is rejected up front.
    pub fn validate(&self) -> Result<()> {
        if self.tick_size == 0 {
            return Err(OnboardError::InvalidMarketSpec(format!(
                "{}: tick_size is zero",
                self.market_name
            )));
        }
        if self.lot_size == 0 {
            return Err(OnboardError::InvalidMarketSpec(format!(
                "{}: lot_size is zero",
                self.market_name
            )));
        }
        Ok(())
    }

    pub fn price_converter(&self) -> Converter {
        Converter::new(self.px_decimals)
    }

    pub fn size_converter(&self) -> Converter {
        Converter::new(self.sz_decimals)
    }

    /// Minimum order size in human units.
    pub fn min_size_human(&self) -> f64 {
        self.size_converter().to_human(self.min_size)
    }
}

/// One subaccount, as listed by the subaccounts endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct SubaccountRecord {
    pub subaccount_address: String,
    pub is_primary: bool,
    pub is_active: bool,

    #[serde(default)]
    pub custom_label: Option<String>,
}

impl SubaccountRecord {
    /// Parsed address, or `None` if the indexer returned something
    /// unparseable. Comparisons go through this so that casing and
    /// zero-padding differences never cause a mismatch.
    pub fn address(&self) -> Option<AccountAddress> {
        self.subaccount_address.parse().ok()
    }
}

/// Response of the order-status endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct OrderStatusRecord {
    pub status: String,

    #[serde(default)]
    pub details: Option<String>,

    #[serde(default)]
    pub order: Option<OrderRecord>,
}

/// Order details within an [`OrderStatusRecord`].
#[derive(Clone, Debug, Deserialize)]
pub struct OrderRecord {
    pub market: String,
    pub client_order_id: String,
    pub order_id: u64,
    pub is_buy: bool,
    pub is_reduce_only: bool,

    #[serde(default)]
    pub price: Option<f64>,

    pub orig_size: f64,
    pub remaining_size: f64,

    #[serde(default)]
    pub transaction_version: Option<u64>,

    #[serde(default)]
    pub unix_ms: Option<u64>,
}

impl OrderRecord {
    pub fn filled_size(&self) -> f64 {
        self.orig_size - self.remaining_size
    }
}

/// Time-in-force of a placed order, with the venue's wire encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeInForce {
    #[default]
    GoodTilCancelled,
    PostOnly,
    ImmediateOrCancel,
}

impl TimeInForce {
    pub fn as_u8(&self) -> u8 {
        match self {
            TimeInForce::GoodTilCancelled => 0,
            TimeInForce::PostOnly => 1,
            TimeInForce::ImmediateOrCancel => 2,
        }
    }
}

impl From<u8> for TimeInForce {
    fn from(value: u8) -> Self {
        match value {
            0 => TimeInForce::GoodTilCancelled,
            1 => TimeInForce::PostOnly,
            2 => TimeInForce::ImmediateOrCancel,
            _ => unreachable!(),
        }
    }
}

/// Caller-supplied order parameters, in human units, before normalization.
#[derive(Clone, Debug)]
pub struct OrderIntent {
    pub price: f64,
    pub size: f64,
    pub is_buy: bool,
    pub time_in_force: TimeInForce,
    pub reduce_only: bool,

    /// Client id for later status queries. Generated when absent.
    pub client_order_id: Option<String>,
}

impl OrderIntent {
    /// Limit order with default time-in-force.
    pub fn limit(price: f64, size: f64, is_buy: bool) -> Self {
        Self {
            price,
            size,
            is_buy,
            time_in_force: TimeInForce::default(),
            reduce_only: false,
            client_order_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc_perp() -> MarketSpec {
        MarketSpec {
            market_name: "BTC-PERP".to_string(),
            market_addr: "0x7".to_string(),
            px_decimals: 9,
            sz_decimals: 9,
            tick_size: 1_000_000,
            lot_size: 100_000,
            min_size: 100_000,
            max_leverage: None,
        }
    }

    #[test]
    fn test_validate_rejects_zero_grid() {
        let mut market = btc_perp();
        assert!(market.validate().is_ok());

        market.tick_size = 0;
        assert!(market.validate().is_err());

        market.tick_size = 1_000_000;
        market.lot_size = 0;
        assert!(market.validate().is_err());
    }

    #[test]
    fn test_min_size_human() {
        assert_eq!(btc_perp().min_size_human(), 0.0001);
    }

    #[test]
    fn test_subaccount_record_address_normalizes() {
        let record = SubaccountRecord {
            subaccount_address: "0xAB".to_string(),
            is_primary: false,
            is_active: true,
            custom_label: None,
        };
        assert_eq!(record.address(), "0xab".parse().ok());

        let bad = SubaccountRecord {
            subaccount_address: "not-an-address".to_string(),
            is_primary: false,
            is_active: true,
            custom_label: None,
        };
        assert_eq!(bad.address(), None);
    }

    #[test]
    fn test_time_in_force_round_trip() {
        for tif in [
            TimeInForce::GoodTilCancelled,
            TimeInForce::PostOnly,
            TimeInForce::ImmediateOrCancel,
        ] {
            assert_eq!(TimeInForce::from(tif.as_u8()), tif);
        }
    }

    #[test]
    fn test_market_spec_deserializes_api_shape() {
        let market: MarketSpec = serde_json::from_str(
            r#"{
                "market_name": "BTC-PERP",
                "market_addr": "0x1234",
                "px_decimals": 9,
                "sz_decimals": 9,
                "tick_size": 1000000,
                "lot_size": 100000,
                "min_size": 100000,
                "max_leverage": 20
            }"#,
        )
        .unwrap();
        assert_eq!(market.market_name, "BTC-PERP");
        assert_eq!(market.max_leverage, Some(20));
    }
}
