//! Error types for the onboard CLI.

use decibel_onboard::{address::AddressParseError, error::OnboardError};

/// Main error type for the onboard CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressParseError),

    #[error("Onboarding error: {0}")]
    Onboard(#[from] OnboardError),
}

pub type Result<T> = std::result::Result<T, Error>;
