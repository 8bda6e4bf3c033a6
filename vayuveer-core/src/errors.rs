//! Error Types for the Gas-Leak Monitor
//!
//! ## Design Philosophy
//!
//! Very little in this crate is allowed to fail loudly. The alarm loop must
//! keep sampling through network outages and remote-service errors, so most
//! failures are absorbed where they happen and only logged:
//!
//! - A remote read that fails keeps the previous threshold
//! - A remote write that fails is dropped
//! - An offline link turns every reporter call into a no-op
//!
//! The errors that do exist are small and `Copy`, with `&'static str` reasons
//! only, so they can be returned from the sampling path without allocation.
//!
//! ## Error Categories
//!
//! ### Startup
//! - `CalibrationImplausible`: the clean-air baseline looks like a stuck sensor
//! - `InvalidConfig`: a tunable would break an invariant (zero offset, etc.)
//!
//! ### Runtime
//! - `SensorUnavailable`: the ADC did not produce a reading this tick
//!
//! ### Remote
//! - [`FetchError`]: threshold read skipped because the link is down, or
//!   the remote store returned an error of its own type

use core::fmt;

use thiserror_no_std::Error;

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, GasMonitorError>;

/// Monitor errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasMonitorError {
    /// The sensor could not be read
    #[error("Sensor unavailable: {reason}")]
    SensorUnavailable {
        /// What went wrong
        reason: &'static str,
    },

    /// Calibration finished but the baseline is outside the plausible window
    #[error("Baseline {baseline} outside plausible range [{floor}, {ceiling}]")]
    CalibrationImplausible {
        /// Averaged clean-air reading
        baseline: u16,
        /// Lowest baseline a working sensor produces
        floor: u16,
        /// Highest baseline a working sensor produces
        ceiling: u16,
    },

    /// Configuration rejected by [`crate::MonitorConfig::validate`]
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// The offending field
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for GasMonitorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorUnavailable { reason } =>
                defmt::write!(fmt, "Sensor unavailable: {}", reason),
            Self::CalibrationImplausible { baseline, floor, ceiling } =>
                defmt::write!(fmt, "Baseline {} outside [{}, {}]", baseline, floor, ceiling),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid configuration: {}", reason),
        }
    }
}

/// Why a threshold fetch produced no payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError<E> {
    /// Connectivity collaborator reported the link as down; nothing was sent
    Offline,
    /// The remote store answered with an error
    Remote(E),
}

impl<E: fmt::Debug> fmt::Display for FetchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Offline => write!(f, "link offline"),
            FetchError::Remote(e) => write!(f, "remote store error: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_stays_small() {
        assert!(core::mem::size_of::<GasMonitorError>() <= 24);
    }

    #[test]
    fn messages_carry_values() {
        let err = GasMonitorError::CalibrationImplausible {
            baseline: 0,
            floor: 1,
            ceiling: 4094,
        };
        assert_eq!(err.to_string(), "Baseline 0 outside plausible range [1, 4094]");

        let fetch: FetchError<u16> = FetchError::Remote(503);
        assert_eq!(fetch.to_string(), "remote store error: 503");
    }
}
