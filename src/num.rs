//! Quantity normalization: human units to the venue's integer chain units.
//!
//! The chain checks prices and sizes against a discrete grid (tick/lot
//! multiples, minimum size) and rejects anything off-grid, so every
//! caller-supplied number is snapped here before it reaches a transaction.
//! Two different rounding directions are in play and both are load-bearing:
//! snapping to a grid rounds to the nearest multiple, while the final
//! conversion to an integer floors, so the submitted value never overshoots
//! the grid the snap aligned it to.

use tracing::warn;

use crate::market::MarketSpec;

/// Decimal exponent of the collateral asset (USDC).
pub const COLLATERAL_DECIMALS: u8 = 6;

/// Fixed-point converter between human units and integer chain units.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: u8,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    pub(crate) fn scale(&self) -> f64 {
        10f64.powi(self.decimals as i32)
    }

    /// Converts a human value to chain units, flooring. Negative or
    /// non-finite inputs saturate to zero.
    pub fn to_chain(&self, human: f64) -> u64 {
        (human * self.scale()).floor() as u64
    }

    /// Converts chain units back to a human value.
    pub fn to_human(&self, chain: u64) -> f64 {
        chain as f64 / self.scale()
    }
}

/// Grid-aligned order parameters, in both representations.
///
/// Invariants: `chain_price` is a multiple of the market's tick size unless
/// the price is zero (no limit price), `chain_size` is a multiple of the lot
/// size and at least the minimum size unless zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedOrderParams {
    pub human_price: f64,
    pub human_size: f64,
    pub chain_price: u64,
    pub chain_size: u64,
}

/// Snaps a price to the market's tick grid, rounding to the nearest tick.
///
/// A price of exactly zero passes through unchanged; it means "no limit
/// price" and must not be snapped onto the grid.
pub fn snap_price(price: f64, market: &MarketSpec) -> f64 {
    if price == 0.0 {
        return 0.0;
    }
    let scale = market.price_converter().scale();
    let scaled = (price * scale).round();
    let snapped = (scaled / market.tick_size as f64).round() * market.tick_size as f64;
    snapped.round() / scale
}

/// Snaps a size to the market's lot grid, rounding to the nearest lot.
///
/// A size of exactly zero passes through unchanged. A non-zero size below
/// the market minimum is clamped up to the minimum; that is a correction,
/// not an error, and is reported via a `warn!` advisory.
pub fn snap_size(size: f64, market: &MarketSpec) -> f64 {
    if size == 0.0 {
        return 0.0;
    }
    let min_size = market.min_size_human();
    if size < min_size {
        warn!(
            market = %market.market_name,
            requested = size,
            minimum = min_size,
            "size below market minimum, clamping up"
        );
        return min_size;
    }
    let scale = market.size_converter().scale();
    let scaled = (size * scale).round();
    let snapped = (scaled / market.lot_size as f64).round() * market.lot_size as f64;
    snapped.round() / scale
}

/// Full normalization pipeline: snap to the grids, then finalize to chain
/// units with a flooring conversion.
pub fn normalize_order(price: f64, size: f64, market: &MarketSpec) -> NormalizedOrderParams {
    let human_price = snap_price(price, market);
    let human_size = snap_size(size, market);
    NormalizedOrderParams {
        human_price,
        human_size,
        chain_price: market.price_converter().to_chain(human_price),
        chain_size: market.size_converter().to_chain(human_size),
    }
}

/// Converts a collateral amount to chain units. Collateral has no tick or
/// lot grid, only the flooring decimal conversion.
pub fn collateral_to_chain(amount: f64) -> u64 {
    Converter::new(COLLATERAL_DECIMALS).to_chain(amount)
}
