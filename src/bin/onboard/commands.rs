//! Command implementations for the onboard CLI.

use decibel_onboard::{
    api::IndexerClient,
    faucet::FaucetClient,
    node::{FullnodeClient, GAS_DECIMALS},
    num::Converter,
    onboard,
    retry::RetrySchedule,
};

use crate::{Command, config::EnvConfig, error::Result};

pub async fn run(command: Command, config: &EnvConfig) -> Result<()> {
    match command {
        Command::Status => status(config).await,
        Command::Fund { amount } => fund(config, amount).await,
        Command::Balance => balance(config).await,
        Command::Markets => markets(config).await,
        Command::Subaccounts => subaccounts(config).await,
        Command::OrderStatus {
            client_order_id,
            market,
        } => order_status(config, &client_order_id, market.as_deref()).await,
    }
}

async fn status(config: &EnvConfig) -> Result<()> {
    // The config's Debug impl masks the private key.
    println!("Configuration: {config:#?}");

    let venue = config.venue()?;
    let wallet = config.wallet_address()?;
    println!("Package:    {}", venue.package_address());
    println!("Fullnode:   {}", venue.fullnode_url());
    println!("Indexer:    {}", venue.indexer_url());
    println!("Wallet:     {wallet}");
    println!(
        "Signer key: {}",
        if config.api_wallet_private_key.is_some() {
            "set"
        } else {
            "NOT SET (signing flows unavailable)"
        }
    );
    match &config.subaccount_address {
        Some(subaccount) => println!("Subaccount: {subaccount}"),
        None => println!("Subaccount: (not created yet)"),
    }

    let node = FullnodeClient::new(venue.fullnode_url().clone())?;
    match node.gas_balance_human(wallet).await {
        Ok(balance) => println!("Gas balance: {balance}"),
        Err(e) => println!("Gas balance unavailable ({e}); the wallet may not be funded yet"),
    }

    let api = IndexerClient::new(venue.indexer_url().clone())?;
    let markets = api.markets().await?;
    println!("Indexer reachable, {} market(s) listed", markets.len());
    Ok(())
}

async fn fund(config: &EnvConfig, amount: f64) -> Result<()> {
    let venue = config.venue()?;
    let wallet = config.wallet_address()?;
    let node = FullnodeClient::new(venue.fullnode_url().clone())?;
    let faucet = FaucetClient::new(venue.faucet_url().clone())?;

    let converter = Converter::new(GAS_DECIMALS);
    let octas = converter.to_chain(amount);
    let report =
        onboard::fund_wallet(&node, &faucet, wallet, octas, RetrySchedule::default()).await?;

    println!("Faucet transaction: {}", report.faucet_tx);
    println!(
        "Balance: {} -> {}",
        converter.to_human(report.balance_before),
        converter.to_human(report.balance_after)
    );
    if !report.confirmed() {
        println!("Balance increase not visible yet; check again with `onboard balance`.");
    }
    Ok(())
}

async fn balance(config: &EnvConfig) -> Result<()> {
    let venue = config.venue()?;
    let wallet = config.wallet_address()?;
    let node = FullnodeClient::new(venue.fullnode_url().clone())?;

    let balance = node.gas_balance_human(wallet).await?;
    println!("{wallet}: {balance}");
    Ok(())
}

async fn markets(config: &EnvConfig) -> Result<()> {
    let venue = config.venue()?;
    let api = IndexerClient::new(venue.indexer_url().clone())?;

    let markets = api.markets().await?;
    println!("{:<16} {:<68} {}", "Market", "Address", "Min size");
    for market in &markets {
        println!(
            "{:<16} {:<68} {}",
            market.market_name,
            market.market_addr,
            market.min_size_human()
        );
    }
    println!("{} market(s)", markets.len());
    Ok(())
}

async fn subaccounts(config: &EnvConfig) -> Result<()> {
    let venue = config.venue()?;
    let wallet = config.wallet_address()?;
    let api = IndexerClient::new(venue.indexer_url().clone())?;

    let records = api.subaccounts(wallet).await?;
    if records.is_empty() {
        println!("No subaccounts found for {wallet}; the indexer may need more time.");
        return Ok(());
    }
    for record in &records {
        println!(
            "{} primary={} active={} label={}",
            record.subaccount_address,
            record.is_primary,
            record.is_active,
            record.custom_label.as_deref().unwrap_or("(none)")
        );
    }
    Ok(())
}

async fn order_status(
    config: &EnvConfig,
    client_order_id: &str,
    market: Option<&str>,
) -> Result<()> {
    let venue = config.venue()?;
    let wallet = config.wallet_address()?;
    let api = IndexerClient::new(venue.indexer_url().clone())?;

    let market_name = market.unwrap_or_else(|| config.market_name());
    let market = api.market_by_name(market_name).await?;
    let status = api
        .order_status(&market.market_addr, wallet, client_order_id)
        .await?;

    println!("Status:  {}", status.status);
    if let Some(details) = &status.details {
        println!("Details: {details}");
    }
    if let Some(order) = &status.order {
        println!("Order id:       {}", order.order_id);
        println!("Side:           {}", if order.is_buy { "buy" } else { "sell" });
        if let Some(price) = order.price {
            println!("Price:          {price}");
        }
        println!("Original size:  {}", order.orig_size);
        println!("Remaining size: {}", order.remaining_size);
        println!("Filled size:    {}", order.filled_size());
    }
    Ok(())
}
