//! Onboarding flows: the step sequences a new trader runs, as library
//! operations.
//!
//! Each flow submits at most one transaction, then reconciles what the
//! chain and the indexer report about it. Transient verification failures
//! degrade to advisories; a transaction that reverted on chain is fatal.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::{
    Venue,
    address::AccountAddress,
    error::{OnboardError, Result},
    faucet::FaucetClient,
    market::{MarketSpec, OrderIntent, SubaccountRecord},
    node::FullnodeClient,
    num::{NormalizedOrderParams, collateral_to_chain, normalize_order},
    resolve::{ResolvedSubaccount, SubaccountHints, resolve_subaccount},
    retry::{RetrySchedule, poll_until},
    settings::{SUBACCOUNT_ADDRESS_KEY, Settings},
    txn::{
        TransactionService, create_subaccount_call, deposit_collateral_call, mint_collateral_call,
        place_order_call,
    },
};

/// Outcome of [`fund_wallet`].
#[derive(Clone, Debug)]
pub struct FundReport {
    pub faucet_tx: String,
    pub balance_before: u64,
    pub balance_after: u64,
}

impl FundReport {
    /// Whether the balance increase was observed within the schedule. A
    /// `false` here is advisory; the funds usually land after the poll
    /// gives up.
    pub fn confirmed(&self) -> bool {
        self.balance_after > self.balance_before
    }
}

/// Requests gas funds from the faucet and polls until the balance increase
/// is visible. The faucet call itself failing is fatal; the balance never
/// catching up within the schedule is not.
pub async fn fund_wallet(
    node: &FullnodeClient,
    faucet: &FaucetClient,
    address: AccountAddress,
    octas: u64,
    schedule: RetrySchedule,
) -> Result<FundReport> {
    let balance_before = match node.gas_balance(address).await {
        Ok(balance) => balance,
        Err(e) => {
            // Normal for a wallet the chain has never seen.
            debug!(error = %e, "balance unavailable, treating as zero");
            0
        }
    };

    let faucet_tx = faucet.fund(address, octas).await?;
    info!(%faucet_tx, "faucet request accepted");

    let observed = poll_until(
        schedule,
        || node.gas_balance(address),
        |balance| *balance > balance_before,
        tokio::time::sleep,
    )
    .await;

    let balance_after = observed.unwrap_or(balance_before);
    if balance_after <= balance_before {
        warn!(
            balance_before,
            "funding not yet visible on chain; it usually lands shortly"
        );
    }

    Ok(FundReport {
        faucet_tx,
        balance_before,
        balance_after,
    })
}

/// Outcome of [`create_subaccount`].
#[derive(Clone, Debug)]
pub struct CreateSubaccountOutcome {
    pub tx_hash: String,
    pub resolved: ResolvedSubaccount,
}

/// Creates a trading subaccount and reconciles its canonical address.
///
/// `list` is the indexer listing for the owner (normally
/// `|| api.subaccounts(owner)`); it is injected so the reconciliation is
/// testable without a live indexer. When `settings` is given, the resolved
/// address is persisted under [`SUBACCOUNT_ADDRESS_KEY`] for later runs.
pub async fn create_subaccount<T, F, Fut>(
    tx: &T,
    venue: &Venue,
    owner: AccountAddress,
    schedule: RetrySchedule,
    list: F,
    settings: Option<&mut Settings>,
) -> Result<CreateSubaccountOutcome>
where
    T: TransactionService,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<SubaccountRecord>>>,
{
    let confirmed = tx
        .submit_entry_function(create_subaccount_call(venue.package_address()))
        .await?;
    if !confirmed.success {
        return Err(OnboardError::TransactionFailed(confirmed.hash));
    }
    info!(hash = %confirmed.hash, "create-subaccount transaction confirmed");

    let hints = SubaccountHints::from_transaction(&confirmed, owner);
    let resolved = resolve_subaccount(hints, schedule, list, tokio::time::sleep).await;
    if !resolved.is_verified() {
        warn!(
            value = %resolved.value(),
            source = ?resolved.source(),
            "subaccount address not confirmed by the indexer; verify before large deposits"
        );
    }

    if let Some(settings) = settings {
        settings.set(SUBACCOUNT_ADDRESS_KEY, &resolved.value().to_string())?;
    }

    Ok(CreateSubaccountOutcome {
        tx_hash: confirmed.hash,
        resolved,
    })
}

/// Mints testnet collateral to the caller's wallet. Returns the
/// transaction hash.
pub async fn mint_collateral<T: TransactionService>(
    tx: &T,
    venue: &Venue,
    amount: f64,
) -> Result<String> {
    let chain_amount = collateral_to_chain(amount);
    let confirmed = tx
        .submit_entry_function(mint_collateral_call(venue.package_address(), chain_amount))
        .await?;
    if !confirmed.success {
        return Err(OnboardError::TransactionFailed(confirmed.hash));
    }
    info!(hash = %confirmed.hash, amount, chain_amount, "collateral minted");
    Ok(confirmed.hash)
}

/// Outcome of [`deposit_collateral`].
#[derive(Clone, Debug)]
pub struct DepositOutcome {
    pub tx_hash: String,
    pub asset_metadata: AccountAddress,
    pub chain_amount: u64,
}

/// Deposits collateral from the wallet into a subaccount, where it becomes
/// trading margin. The collateral asset is addressed by derivation, not by
/// an on-chain lookup.
pub async fn deposit_collateral<T: TransactionService>(
    tx: &T,
    venue: &Venue,
    subaccount: AccountAddress,
    amount: f64,
) -> Result<DepositOutcome> {
    let asset_metadata = venue.collateral_metadata();
    let chain_amount = collateral_to_chain(amount);

    let confirmed = tx
        .submit_entry_function(deposit_collateral_call(
            venue.package_address(),
            subaccount,
            asset_metadata,
            chain_amount,
        ))
        .await?;
    if !confirmed.success {
        return Err(OnboardError::TransactionFailed(confirmed.hash));
    }
    info!(
        hash = %confirmed.hash,
        %subaccount,
        amount,
        chain_amount,
        "collateral deposited to subaccount"
    );

    Ok(DepositOutcome {
        tx_hash: confirmed.hash,
        asset_metadata,
        chain_amount,
    })
}

/// Outcome of [`place_order`].
#[derive(Clone, Debug)]
pub struct PlacedOrder {
    pub tx_hash: String,
    pub client_order_id: String,
    pub params: NormalizedOrderParams,
}

/// Normalizes the intent against the market's grid and places the order.
///
/// The market spec must be freshly fetched; its grid invariants are checked
/// here before any quantization. A client order id is generated when the
/// intent carries none.
pub async fn place_order<T: TransactionService>(
    tx: &T,
    venue: &Venue,
    subaccount: AccountAddress,
    market: &MarketSpec,
    intent: &OrderIntent,
) -> Result<PlacedOrder> {
    market.validate()?;
    let params = normalize_order(intent.price, intent.size, market);
    let client_order_id = intent
        .client_order_id
        .clone()
        .unwrap_or_else(generate_client_order_id);

    debug!(
        market = %market.market_name,
        human_price = params.human_price,
        human_size = params.human_size,
        chain_price = params.chain_price,
        chain_size = params.chain_size,
        %client_order_id,
        "normalized order parameters"
    );

    let confirmed = tx
        .submit_entry_function(place_order_call(
            venue.package_address(),
            subaccount,
            &market.market_addr,
            &params,
            intent,
            &client_order_id,
        ))
        .await?;
    if !confirmed.success {
        return Err(OnboardError::TransactionFailed(confirmed.hash));
    }
    info!(
        hash = %confirmed.hash,
        market = %market.market_name,
        %client_order_id,
        "order placed"
    );

    Ok(PlacedOrder {
        tx_hash: confirmed.hash,
        client_order_id,
        params,
    })
}

fn generate_client_order_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("order-{millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_client_order_id_shape() {
        let id = generate_client_order_id();
        assert!(id.starts_with("order-"));
        assert!(id["order-".len()..].chars().all(|c| c.is_ascii_digit()));
    }
}
