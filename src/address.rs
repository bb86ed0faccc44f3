//! Account addresses and deterministic object-address derivation.
//!
//! Addresses are 32-byte identifiers, written as hex with an optional `0x`
//! prefix. Short forms are accepted on input and left-padded with zeros;
//! output is always the full lowercase `0x`-prefixed form.

use std::{fmt, str::FromStr};

use sha3::{Digest, Sha3_256};

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Address scheme marker appended when deriving an object address from a seed.
const DERIVE_OBJECT_FROM_SEED: u8 = 0xFE;

/// 32-byte on-chain address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Derives the address of an object created by this address with the
    /// given seed: `sha3-256(creator || seed || 0xFE)`.
    ///
    /// Pure function of its inputs. The same creator/seed pair always yields
    /// the same address, which is what lets callers compute an entity's
    /// address without observing its creation.
    pub fn derive_object(&self, seed: &str) -> AccountAddress {
        let mut hasher = Sha3_256::new();
        hasher.update(self.0);
        hasher.update(seed.as_bytes());
        hasher.update([DERIVE_OBJECT_FROM_SEED]);
        Self(hasher.finalize().into())
    }

    /// Hex form without the `0x` prefix, e.g. for faucet query parameters.
    pub fn to_bare_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for AccountAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if digits.len() > 2 * ADDRESS_LENGTH {
            return Err(AddressParseError::TooLong(digits.len()));
        }
        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(&padded).map_err(|_| AddressParseError::InvalidHex)?;
        let bytes: [u8; ADDRESS_LENGTH] = bytes
            .try_into()
            .map_err(|_| AddressParseError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

/// Error parsing an address from its text form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address is empty")]
    Empty,

    #[error("address has {0} hex digits, expected at most 64")]
    TooLong(usize),

    #[error("address contains non-hex characters")]
    InvalidHex,
}
