//! Flow-level tests: submit through a transaction-service double, then
//! reconcile, normalize and persist exactly as a real run would.

use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use serde_json::json;

use decibel_onboard::{
    Venue,
    address::AccountAddress,
    error::OnboardError,
    market::OrderIntent,
    onboard,
    resolve::{PRIMARY_SUBACCOUNT_SEED, ResolvedSource},
    retry::RetrySchedule,
    settings::{SUBACCOUNT_ADDRESS_KEY, Settings},
    testing::{FailingTxService, StaticTxService, subaccount_created_event, subaccount_record},
};

fn venue() -> Venue {
    Venue::netna().unwrap()
}

fn owner() -> AccountAddress {
    "0xb540c13b3aab3966fd4c505bfd3851aed2f9983938ed4e89570a5234db65ff2"
        .parse()
        .unwrap()
}

fn created() -> AccountAddress {
    "0x42".parse().unwrap()
}

fn fast_schedule() -> RetrySchedule {
    RetrySchedule::new(5, Duration::ZERO)
}

fn settings_at(name: &str) -> (PathBuf, Settings) {
    let path = std::env::temp_dir().join(format!(
        "decibel-onboard-it-{}-{name}",
        std::process::id()
    ));
    let _ = fs::remove_file(&path);
    let settings = Settings::load(&path).unwrap();
    (path, settings)
}

#[tokio::test]
async fn test_create_subaccount_verified_on_second_attempt() {
    let venue = venue();
    let tx = StaticTxService::confirming("0xaaa").with_events(vec![subaccount_created_event(
        venue.package_address(),
        owner(),
        created(),
    )]);
    let (path, mut settings) = settings_at("verified.env");

    let listing_calls = AtomicU32::new(0);
    let outcome = onboard::create_subaccount(
        &tx,
        &venue,
        owner(),
        fast_schedule(),
        || {
            let n = listing_calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    Ok(vec![])
                } else {
                    Ok(vec![subaccount_record("0x42", false)])
                }
            }
        },
        Some(&mut settings),
    )
    .await
    .unwrap();

    assert_eq!(outcome.tx_hash, "0xaaa");
    assert_eq!(outcome.resolved.value(), created());
    assert_eq!(outcome.resolved.source(), ResolvedSource::ApiVerified);
    assert_eq!(listing_calls.load(Ordering::SeqCst), 2);

    // The resolved address is persisted for later runs.
    let reloaded = Settings::load(&path).unwrap();
    assert_eq!(
        reloaded.get(SUBACCOUNT_ADDRESS_KEY),
        Some(created().to_string().as_str())
    );
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn test_create_subaccount_falls_back_to_calculated() {
    let venue = venue();
    // No events on the transaction and an indexer that never catches up.
    let tx = StaticTxService::confirming("0xbbb");
    let (path, mut settings) = settings_at("calculated.env");

    let outcome = onboard::create_subaccount(
        &tx,
        &venue,
        owner(),
        fast_schedule(),
        || async { Ok(vec![]) },
        Some(&mut settings),
    )
    .await
    .unwrap();

    let calculated = owner().derive_object(PRIMARY_SUBACCOUNT_SEED);
    assert_eq!(outcome.resolved.value(), calculated);
    assert_eq!(outcome.resolved.source(), ResolvedSource::Calculated);
    assert!(!outcome.resolved.is_verified());

    let reloaded = Settings::load(&path).unwrap();
    assert_eq!(
        reloaded.get(SUBACCOUNT_ADDRESS_KEY),
        Some(calculated.to_string().as_str())
    );
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn test_create_subaccount_reverted_transaction_is_fatal() {
    let venue = venue();
    let tx = StaticTxService::reverting("0xccc");

    let result = onboard::create_subaccount(
        &tx,
        &venue,
        owner(),
        fast_schedule(),
        || async { Ok(vec![]) },
        None,
    )
    .await;

    assert!(matches!(
        result,
        Err(OnboardError::TransactionFailed(hash)) if hash == "0xccc"
    ));
}

#[tokio::test]
async fn test_mint_collateral_service_error_propagates() {
    let venue = venue();
    let tx = FailingTxService("signer unavailable".to_string());

    let result = onboard::mint_collateral(&tx, &venue, 250.0).await;
    assert!(matches!(result, Err(OnboardError::Transaction(_))));
}

#[tokio::test]
async fn test_deposit_collateral_call_layout() {
    let venue = venue();
    let tx = StaticTxService::confirming("0xddd");
    let subaccount = created();

    let outcome = onboard::deposit_collateral(&tx, &venue, subaccount, 200.0)
        .await
        .unwrap();

    assert_eq!(outcome.chain_amount, 200_000_000);
    assert_eq!(outcome.asset_metadata, venue.collateral_metadata());

    let calls = tx.submitted();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].function,
        format!(
            "{}::dex_accounts::deposit_to_subaccount_at",
            venue.package_address()
        )
    );
    assert_eq!(calls[0].args[0], json!(subaccount.to_string()));
    assert_eq!(calls[0].args[1], json!(outcome.asset_metadata.to_string()));
    assert_eq!(calls[0].args[2], json!("200000000"));
}

#[tokio::test]
async fn test_place_order_normalizes_before_submission() {
    let venue = venue();
    let tx = StaticTxService::confirming("0xeee");
    let market = decibel_onboard::market::MarketSpec {
        market_name: "BTC-PERP".to_string(),
        market_addr: "0x7777".to_string(),
        px_decimals: 9,
        sz_decimals: 9,
        tick_size: 1_000_000,
        lot_size: 100_000,
        min_size: 100_000,
        max_leverage: Some(20),
    };
    let intent = OrderIntent {
        client_order_id: Some("order-test-1".to_string()),
        ..OrderIntent::limit(50000.0007, 0.00005, true)
    };

    let placed = onboard::place_order(&tx, &venue, created(), &market, &intent)
        .await
        .unwrap();

    // Price snapped to the tick grid, size clamped up to the minimum.
    assert_eq!(placed.params.human_price, 50000.001);
    assert_eq!(placed.params.human_size, 0.0001);
    assert_eq!(placed.params.chain_price % market.tick_size, 0);
    assert_eq!(placed.params.chain_size, market.min_size);
    assert_eq!(placed.client_order_id, "order-test-1");

    let calls = tx.submitted();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args.len(), 15);
    assert_eq!(calls[0].args[1], json!("0x7777"));
    assert_eq!(calls[0].args[2], json!("50000001000000"));
    assert_eq!(calls[0].args[3], json!("100000"));
    assert_eq!(calls[0].args[7], json!("order-test-1"));
}

#[tokio::test]
async fn test_place_order_rejects_invalid_market_spec() {
    let venue = venue();
    let tx = StaticTxService::confirming("0xfff");
    let market = decibel_onboard::market::MarketSpec {
        market_name: "BROKEN".to_string(),
        market_addr: "0x1".to_string(),
        px_decimals: 9,
        sz_decimals: 9,
        tick_size: 0,
        lot_size: 100_000,
        min_size: 100_000,
        max_leverage: None,
    };

    let result = onboard::place_order(
        &tx,
        &venue,
        created(),
        &market,
        &OrderIntent::limit(100.0, 1.0, true),
    )
    .await;

    assert!(matches!(result, Err(OnboardError::InvalidMarketSpec(_))));
    assert!(tx.submitted().is_empty());
}
