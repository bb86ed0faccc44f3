//! Test doubles for the transaction seam and the indexer's record shapes.
//!
//! [`StaticTxService`] confirms every submission with a canned result and
//! records the calls it saw, so flow tests can assert on the exact payload
//! that would have gone to the chain. [`FailingTxService`] simulates the
//! external SDK erroring out.

use std::{sync::Mutex, time::Duration};

use serde_json::json;

use crate::{
    address::AccountAddress,
    error::{OnboardError, Result},
    market::SubaccountRecord,
    resolve::SUBACCOUNT_CREATED_EVENT,
    txn::{ConfirmedTransaction, EntryFunctionCall, TransactionEvent, TransactionService},
};

/// Transaction service double with a fixed confirmation result.
#[derive(Debug)]
pub struct StaticTxService {
    hash: String,
    success: bool,
    events: Vec<TransactionEvent>,
    calls: Mutex<Vec<EntryFunctionCall>>,
}

impl StaticTxService {
    /// Confirms every submission with the given hash and no events.
    pub fn confirming(hash: &str) -> Self {
        Self {
            hash: hash.to_string(),
            success: true,
            events: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Confirms every submission but reports on-chain failure.
    pub fn reverting(hash: &str) -> Self {
        Self {
            success: false,
            ..Self::confirming(hash)
        }
    }

    /// Events attached to every confirmation.
    pub fn with_events(mut self, events: Vec<TransactionEvent>) -> Self {
        self.events = events;
        self
    }

    /// Calls submitted so far, in order.
    pub fn submitted(&self) -> Vec<EntryFunctionCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl TransactionService for StaticTxService {
    async fn submit_entry_function(&self, call: EntryFunctionCall) -> Result<ConfirmedTransaction> {
        self.calls.lock().unwrap().push(call);
        Ok(ConfirmedTransaction {
            hash: self.hash.clone(),
            success: self.success,
            events: self.events.clone(),
        })
    }
}

/// Transaction service double whose submissions always error.
#[derive(Debug)]
pub struct FailingTxService(pub String);

impl TransactionService for FailingTxService {
    async fn submit_entry_function(&self, _call: EntryFunctionCall) -> Result<ConfirmedTransaction> {
        Err(OnboardError::Transaction(self.0.clone()))
    }
}

/// A subaccount listing record as the indexer would return it.
pub fn subaccount_record(address: &str, is_primary: bool) -> SubaccountRecord {
    SubaccountRecord {
        subaccount_address: address.to_string(),
        is_primary,
        is_active: true,
        custom_label: None,
    }
}

/// The event `create_new_subaccount` emits for the given owner.
pub fn subaccount_created_event(
    package: AccountAddress,
    owner: AccountAddress,
    subaccount: AccountAddress,
) -> TransactionEvent {
    TransactionEvent {
        event_type: format!("{package}{SUBACCOUNT_CREATED_EVENT}"),
        data: json!({
            "owner": owner.to_string(),
            "subaccount": subaccount.to_string(),
        }),
    }
}

/// Sleep function that returns immediately, for driving retry loops in
/// tests without timers.
pub async fn no_sleep(_: Duration) {}
