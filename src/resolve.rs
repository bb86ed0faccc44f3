//! Reconciliation of a newly created subaccount's canonical address.
//!
//! Three signals can name the entity a create-subaccount transaction just
//! produced, and they disagree in timeliness: the transaction's own emitted
//! events carry the address immediately, the address is also derivable
//! up front from the owner and a fixed seed, and the indexer eventually
//! lists it, but it lags the chain and may return nothing, stale data, or
//! several candidates. The engine polls the indexer on a bounded schedule
//! and settles on one answer with a fixed precedence: event data outranks
//! the indexer (a listing match only upgrades confidence, a miss never
//! overrides the event value), and the derived address is the fallback of
//! last resort.
//!
//! Every outcome carries an explicit [`ResolvedSource`] tag so callers can
//! make risk-sensitive decisions, e.g. require `ApiVerified` before a large
//! deposit.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    address::AccountAddress,
    error::Result,
    market::SubaccountRecord,
    retry::RetrySchedule,
    txn::{ConfirmedTransaction, TransactionEvent},
};

/// Event type suffix emitted by `dex_accounts::create_new_subaccount`.
pub const SUBACCOUNT_CREATED_EVENT: &str = "::dex_accounts::SubaccountCreatedEvent";

/// Seed of the owner's primary derivation path, the basis of the calculated
/// fallback candidate.
pub const PRIMARY_SUBACCOUNT_SEED: &str = "primary_subaccount";

/// How the resolved address was established, highest confidence first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedSource {
    /// Extracted from the transaction's events and confirmed by the indexer.
    ApiVerified,

    /// Extracted from the transaction's events; the indexer responded but
    /// has not caught up to this entity yet.
    EventUnverified,

    /// Extracted from the transaction's events; the indexer never responded
    /// usefully within the schedule.
    EventExtracted,

    /// Derived from the owner address and the primary seed; nothing else
    /// was available.
    Calculated,
}

/// Outcome of reconciliation. Ground truth for the rest of the run; never
/// overwritten once reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedSubaccount {
    value: AccountAddress,
    source: ResolvedSource,
}

impl ResolvedSubaccount {
    pub fn value(&self) -> AccountAddress {
        self.value
    }

    pub fn source(&self) -> ResolvedSource {
        self.source
    }

    /// Whether the indexer confirmed this address.
    pub fn is_verified(&self) -> bool {
        self.source == ResolvedSource::ApiVerified
    }
}

/// Candidates known before the indexer is consulted.
#[derive(Clone, Copy, Debug)]
pub struct SubaccountHints {
    event: Option<AccountAddress>,
    calculated: AccountAddress,
}

impl SubaccountHints {
    pub fn new(event: Option<AccountAddress>, calculated: AccountAddress) -> Self {
        Self { event, calculated }
    }

    /// Builds hints for a confirmed create-subaccount transaction: scan its
    /// events for the created address, and always derive the calculated
    /// fallback from the owner.
    pub fn from_transaction(tx: &ConfirmedTransaction, owner: AccountAddress) -> Self {
        Self {
            event: extract_created_subaccount(&tx.events, owner),
            calculated: owner.derive_object(PRIMARY_SUBACCOUNT_SEED),
        }
    }

    pub fn event_candidate(&self) -> Option<AccountAddress> {
        self.event
    }

    pub fn calculated_candidate(&self) -> AccountAddress {
        self.calculated
    }

    /// Resolution when the indexer never produced a usable listing.
    fn fallback(&self) -> ResolvedSubaccount {
        match self.event {
            Some(value) => ResolvedSubaccount {
                value,
                source: ResolvedSource::EventExtracted,
            },
            None => ResolvedSubaccount {
                value: self.calculated,
                source: ResolvedSource::Calculated,
            },
        }
    }
}

/// Scans emitted events for the subaccount created by `owner`. Matches on
/// the event type suffix and the owner field; the first match wins.
pub fn extract_created_subaccount(
    events: &[TransactionEvent],
    owner: AccountAddress,
) -> Option<AccountAddress> {
    events
        .iter()
        .filter(|e| e.event_type.ends_with(SUBACCOUNT_CREATED_EVENT))
        .find_map(|e| {
            let event_owner: AccountAddress = e.data.get("owner")?.as_str()?.parse().ok()?;
            if event_owner != owner {
                return None;
            }
            e.data.get("subaccount")?.as_str()?.parse().ok()
        })
}

/// Resolves the canonical subaccount address against the indexer listing.
///
/// Polls `list` on the given schedule. Terminates as soon as a non-empty
/// listing is evaluated, or after the last attempt with the best fallback;
/// the returned value is always non-null and the loop never exceeds the
/// schedule. Transient listing errors are logged and absorbed here, never
/// re-thrown.
pub async fn resolve_subaccount<F, Fut, S, SFut>(
    hints: SubaccountHints,
    schedule: RetrySchedule,
    mut list: F,
    sleep: S,
) -> ResolvedSubaccount
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<SubaccountRecord>>>,
    S: Fn(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    for attempt in schedule.attempts() {
        sleep(schedule.delay_before(attempt)).await;
        let records = match list().await {
            Ok(records) => records,
            Err(e) => {
                warn!(attempt, error = %e, "subaccount listing failed");
                continue;
            }
        };
        if records.is_empty() {
            debug!(attempt, "indexer has no subaccounts yet");
            continue;
        }
        if let Some(resolved) = evaluate_listing(&hints, &records) {
            return resolved;
        }
        debug!(attempt, "listing had no usable records");
    }

    let resolved = hints.fallback();
    warn!(
        value = %resolved.value(),
        source = ?resolved.source(),
        "indexer never confirmed the subaccount, using fallback candidate"
    );
    resolved
}

/// Evaluates one non-empty listing against the hints. `None` means the
/// listing was unusable (no record parses) and the poll should continue.
fn evaluate_listing(
    hints: &SubaccountHints,
    records: &[SubaccountRecord],
) -> Option<ResolvedSubaccount> {
    if let Some(expected) = hints.event {
        // Address comparison is on parsed bytes, so casing and padding
        // differences in the API response cannot cause a false mismatch.
        let verified = records.iter().any(|r| r.address() == Some(expected));
        let source = if verified {
            ResolvedSource::ApiVerified
        } else {
            ResolvedSource::EventUnverified
        };
        return Some(ResolvedSubaccount {
            value: expected,
            source,
        });
    }

    // No event candidate: creation is known to produce non-primary entities,
    // so prefer the first record not flagged primary, then any record.
    let chosen = records
        .iter()
        .find(|r| !r.is_primary)
        .or_else(|| records.first())?;
    let value = chosen.address()?;
    Some(ResolvedSubaccount {
        value,
        source: ResolvedSource::ApiVerified,
    })
}
