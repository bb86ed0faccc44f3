//! Bounded polling against eventually-consistent reads.
//!
//! The chain and its indexer converge on their own schedule; callers that
//! just submitted a transaction need to wait, but not forever. Every wait in
//! this crate goes through one [`RetrySchedule`]: a fixed number of attempts
//! with a linearly increasing delay before each, never reset mid-loop.
//!
//! The sleep function is injected by the caller, so tests drive the loops
//! without timers.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;

/// Attempts made before giving up, as observed at every call site.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Base delay unit; attempt `n` waits `n` times this.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);

/// Linear backoff schedule: attempt `n` (1-based) is preceded by a delay of
/// `n * base_delay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetrySchedule {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetrySchedule {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay preceding the given 1-based attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// 1-based attempt numbers, in order.
    pub fn attempts(&self) -> impl Iterator<Item = u32> + use<> {
        1..=self.max_attempts
    }

    /// Worst-case total time spent waiting: `max*(max+1)/2 * base_delay`.
    pub fn total_delay(&self) -> Duration {
        self.base_delay * (self.max_attempts * (self.max_attempts + 1) / 2)
    }
}

/// Polls `check` until `satisfied` holds, on the given schedule.
///
/// Returns the first satisfying result immediately. When the schedule is
/// exhausted the last observed result is returned anyway; callers treat
/// "still not satisfied after N tries" as advisory, since the underlying
/// condition is expected to become true after the process exits. Returns
/// `None` only if every attempt failed and nothing was ever observed.
/// Errors from `check` are logged and retried, never propagated.
pub async fn poll_until<T, C, CFut, P, S, SFut>(
    schedule: RetrySchedule,
    mut check: C,
    satisfied: P,
    sleep: S,
) -> Option<T>
where
    C: FnMut() -> CFut,
    CFut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
    S: Fn(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut last = None;
    for attempt in schedule.attempts() {
        sleep(schedule.delay_before(attempt)).await;
        match check().await {
            Ok(value) => {
                if satisfied(&value) {
                    return Some(value);
                }
                debug!(
                    attempt,
                    max_attempts = schedule.max_attempts(),
                    "condition not satisfied yet"
                );
                last = Some(value);
            }
            Err(e) => {
                warn!(attempt, error = %e, "poll attempt failed, will retry");
            }
        }
    }
    last
}
