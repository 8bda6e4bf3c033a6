//! Time management for the monitor loop
//!
//! Every interval in this crate (threshold sync, heartbeat reports) is a
//! "now minus last timestamp" comparison against a monotonic millisecond
//! counter that starts at boot. The counter is injected through
//! [`TimeSource`] so tests can step time instead of sleeping.

use core::cell::Cell;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Source of monotonic time for the system
///
/// Implementations on hardware read a timer peripheral; on a host the
/// `std`-only [`MonotonicTime`] wraps `Instant`.
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Monotonic time source backed by `std::time::Instant`
///
/// Starts at 0 when constructed, matching the firmware's `millis()`.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    boot: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start counting from now
    pub fn new() -> Self {
        Self {
            boot: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.boot.elapsed().as_millis() as Timestamp
    }
}

/// Manually stepped time source for testing and simulation
///
/// Interior mutability lets a shared reference drive the monitor while the
/// test (or a delay implementation) advances it.
#[derive(Debug, Default)]
pub struct ManualTime {
    now: Cell<Timestamp>,
}

impl ManualTime {
    /// Clock frozen at `start` until moved
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, timestamp: Timestamp) {
        self.now.set(timestamp);
    }

    /// Move forward by `ms`, saturating
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Milliseconds elapsed between two timestamps, zero if `later` is earlier
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_time_advances() {
        let time = ManualTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        let by_ref: &ManualTime = &time;
        assert_eq!(TimeSource::now(&by_ref), 1500);
    }

    #[test]
    fn elapsed_never_underflows() {
        assert_eq!(elapsed_ms(2000, 5000), 3000);
        assert_eq!(elapsed_ms(5000, 2000), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn monotonic_starts_near_zero() {
        let time = MonotonicTime::new();
        assert!(time.now() < 1000);
    }
}
