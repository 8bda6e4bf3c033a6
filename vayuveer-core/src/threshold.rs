//! Remote threshold synchronization
//!
//! The alarm threshold can be overridden from the remote store. The device
//! pulls the value on a fixed interval; it is never pushed. This is an
//! eventually-consistent model: after a remote change the device may run on
//! the old threshold for up to one interval, and a failed pull simply leaves
//! the current threshold in place until the next one.
//!
//! Acceptance rule: the fetched body must parse to a strictly positive
//! integer that differs from the active threshold. Everything else
//! (transport failure, non-200, malformed body, zero, negative, unchanged)
//! is "no update".

use core::fmt;
use core::num::NonZeroU32;

use crate::time::{elapsed_ms, Timestamp};

/// Result of one synchronization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// New threshold applied
    Updated {
        /// Threshold before the update
        previous: u32,
        /// Threshold now active
        current: u32,
    },
    /// Remote value equals the active threshold
    Unchanged,
    /// Remote value parsed but is zero or negative
    Rejected {
        /// The parsed value
        value: i64,
    },
    /// Remote body is not a number
    Malformed,
    /// Transport failure, non-200, or link offline
    FetchFailed,
}

impl SyncOutcome {
    /// Check if the active threshold changed
    pub fn is_update(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

/// Parse a remote threshold body
///
/// Accepts a bare number or a JSON scalar: surrounding whitespace and a
/// single pair of double quotes are stripped, an optional sign and decimal
/// digits are required, and a fractional part is truncated. Values that do
/// not fit in an `i64` are treated as malformed.
pub fn parse_threshold(body: &str) -> Option<i64> {
    let mut text = body.trim();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text = text[1..text.len() - 1].trim();
    }

    let (integer, fraction) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let digits = integer.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(integer);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    integer.parse::<i64>().ok()
}

/// Decide the new threshold from a fetch result
///
/// Pure function: the caller applies [`SyncOutcome::Updated`].
pub fn sync_threshold<B, E>(current: u32, fetched: Result<B, E>) -> SyncOutcome
where
    B: AsRef<str>,
    E: fmt::Debug,
{
    let body = match fetched {
        Ok(body) => body,
        Err(_e) => {
            log_warn!("Failed to fetch threshold: {:?}", _e);
            return SyncOutcome::FetchFailed;
        }
    };

    let value = match parse_threshold(body.as_ref()) {
        Some(value) => value,
        None => {
            log_warn!("Ignoring malformed threshold body {:?}", body.as_ref());
            return SyncOutcome::Malformed;
        }
    };

    if value <= 0 {
        log_warn!("Ignoring non-positive threshold {}", value);
        return SyncOutcome::Rejected { value };
    }

    // Larger than any representable threshold: keep the current one
    let Ok(value) = u32::try_from(value) else {
        return SyncOutcome::Rejected { value };
    };

    if value == current {
        return SyncOutcome::Unchanged;
    }

    SyncOutcome::Updated {
        previous: current,
        current: value,
    }
}

/// Active threshold plus the time of the last sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdState {
    active: NonZeroU32,
    last_synced_at: Timestamp,
}

impl ThresholdState {
    /// Start from a calibrated threshold
    ///
    /// A zero threshold is unrepresentable; it is raised to 1.
    pub fn new(initial: u32, now: Timestamp) -> Self {
        Self {
            active: NonZeroU32::new(initial).unwrap_or(NonZeroU32::MIN),
            last_synced_at: now,
        }
    }

    /// Threshold the alarm compares against
    pub fn active(&self) -> u32 {
        self.active.get()
    }

    /// Time of the last sync attempt (successful or not)
    pub fn last_synced_at(&self) -> Timestamp {
        self.last_synced_at
    }
}

/// Time-gated synchronizer owning the [`ThresholdState`]
#[derive(Debug, Clone)]
pub struct ThresholdSync {
    state: ThresholdState,
    interval_ms: u64,
}

impl ThresholdSync {
    /// Start from `initial`; the first sync is due one interval after `now`
    pub fn new(initial: u32, interval_ms: u64, now: Timestamp) -> Self {
        Self {
            state: ThresholdState::new(initial, now),
            interval_ms,
        }
    }

    /// Threshold the alarm compares against
    pub fn active(&self) -> u32 {
        self.state.active()
    }

    /// Active threshold and last attempt time
    pub fn state(&self) -> &ThresholdState {
        &self.state
    }

    /// Check if more than one interval has passed since the last attempt
    pub fn is_due(&self, now: Timestamp) -> bool {
        elapsed_ms(self.state.last_synced_at, now) > self.interval_ms
    }

    /// Apply a fetch result and restart the interval
    pub fn apply<B, E>(&mut self, fetched: Result<B, E>, now: Timestamp) -> SyncOutcome
    where
        B: AsRef<str>,
        E: fmt::Debug,
    {
        let outcome = sync_threshold(self.state.active(), fetched);
        self.state.last_synced_at = now;

        if let SyncOutcome::Updated { current, .. } = outcome {
            if let Some(active) = NonZeroU32::new(current) {
                self.state.active = active;
                log_info!("Threshold updated from remote store: {}", current);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(body: &str) -> Result<&str, &'static str> {
        Ok(body)
    }

    #[test]
    fn accepts_new_positive_value() {
        assert_eq!(
            sync_threshold(100, fetched("150")),
            SyncOutcome::Updated { previous: 100, current: 150 }
        );
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(sync_threshold(100, fetched("0")), SyncOutcome::Rejected { value: 0 });
        assert_eq!(sync_threshold(100, fetched("-5")), SyncOutcome::Rejected { value: -5 });
    }

    #[test]
    fn garbage_and_failures_keep_current() {
        assert_eq!(sync_threshold(100, fetched("abc")), SyncOutcome::Malformed);
        assert_eq!(sync_threshold(100, fetched("null")), SyncOutcome::Malformed);
        assert_eq!(sync_threshold(100, fetched("")), SyncOutcome::Malformed);
        assert_eq!(
            sync_threshold::<&str, _>(100, Err("HTTP 401")),
            SyncOutcome::FetchFailed
        );
    }

    #[test]
    fn same_value_is_not_reapplied() {
        assert_eq!(sync_threshold(100, fetched("100")), SyncOutcome::Unchanged);
    }

    #[test]
    fn parses_json_scalars() {
        assert_eq!(parse_threshold("1300\n"), Some(1300));
        assert_eq!(parse_threshold("\"1300\""), Some(1300));
        assert_eq!(parse_threshold("1300.9"), Some(1300));
        assert_eq!(parse_threshold("+42"), Some(42));
        assert_eq!(parse_threshold("12a"), None);
        assert_eq!(parse_threshold("1300."), None);
        assert_eq!(parse_threshold("-"), None);
        assert_eq!(parse_threshold("99999999999999999999999"), None);
    }

    #[test]
    fn oversized_value_is_rejected() {
        assert_eq!(
            sync_threshold(100, fetched("5000000000")),
            SyncOutcome::Rejected { value: 5_000_000_000 }
        );
    }

    #[test]
    fn zero_initial_threshold_is_raised() {
        let state = ThresholdState::new(0, 0);
        assert_eq!(state.active(), 1);
    }

    #[test]
    fn sync_is_due_strictly_after_interval() {
        let mut sync = ThresholdSync::new(1120, 10_000, 0);
        assert!(!sync.is_due(10_000));
        assert!(sync.is_due(10_001));

        let outcome = sync.apply(fetched("1300"), 10_001);
        assert!(outcome.is_update());
        assert_eq!(sync.active(), 1300);
        assert_eq!(sync.state().last_synced_at(), 10_001);
        assert!(!sync.is_due(20_001));
    }

    #[test]
    fn failed_fetch_still_restarts_interval() {
        let mut sync = ThresholdSync::new(1120, 10_000, 0);
        let outcome = sync.apply::<&str, _>(Err("timeout"), 12_000);
        assert_eq!(outcome, SyncOutcome::FetchFailed);
        assert_eq!(sync.active(), 1120);
        assert!(!sync.is_due(22_000));
    }
}
