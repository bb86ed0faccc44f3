//! Onboard CLI: the read-only onboarding steps against the Decibel venue.
//!
//! Steps that sign transactions (create-subaccount, mint, deposit,
//! place-order) go through an external signing SDK and are exposed as
//! library flows instead.

mod commands;
mod config;
mod error;

use std::process::exit;

use clap::{Parser, Subcommand};
use tracing::error;

use config::EnvConfig;

#[derive(Debug, Parser)]
#[command(name = "onboard")]
#[command(about = "Decibel onboarding helper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check configuration and connectivity
    Status,

    /// Request gas funds from the faucet and wait for the balance to update
    Fund {
        /// Amount to request, in whole gas coins
        #[arg(long, default_value_t = 100.0)]
        amount: f64,
    },

    /// Show the wallet's gas balance
    Balance,

    /// List the venue's markets
    Markets,

    /// List subaccounts owned by the wallet
    Subaccounts,

    /// Query one order by its client order id
    OrderStatus {
        /// Client order id recorded when the order was placed
        #[arg(long)]
        client_order_id: String,

        /// Market name; defaults to MARKET_NAME from the environment
        #[arg(long)]
        market: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    let cli = Cli::parse();

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = commands::run(cli.command, &env_config).await {
        error!(%e, "command failed");
        exit(1);
    }
}
