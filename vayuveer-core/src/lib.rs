//! Core alarm engine for the VayuVeer gas-leak monitor
//!
//! Turns raw analog readings from an MQ-6 class gas sensor into a SAFE/ALERT
//! decision and tells the outside world about it.
//! Designed to run on the microcontroller itself.
//!
//! Key constraints:
//! - Runs inside a single cooperative loop (no threads required)
//! - No heap allocation in the sampling path
//! - A remote failure never stops local alarm evaluation
//!
//! ```no_run
//! use vayuveer_core::{AlarmMachine, AlarmState, SampleWindow};
//!
//! let mut window: SampleWindow<8> = SampleWindow::new();
//! window.reseed(1000);
//!
//! let mut alarm = AlarmMachine::new(3000, 0);
//! let smoothed = window.push(1400);
//! let action = alarm.evaluate(smoothed, 1120, 400);
//! assert_eq!(alarm.state(), AlarmState::Safe);
//! # let _ = action;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod alarm;
pub mod buffer;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod errors;
pub mod hal;
pub mod monitor;
pub mod reporter;
pub mod threshold;
pub mod time;

// Public API
pub use alarm::{AlarmAction, AlarmMachine, AlarmState, StatusLabel};
pub use buffer::SampleWindow;
pub use calibration::{calibrate, CalibrationParams, CalibrationResult};
pub use config::MonitorConfig;
pub use errors::{FetchError, GasMonitorError, MonitorResult};
pub use hal::{AnalogSensor, Indicators, PinIndicators};
pub use monitor::{GasMonitor, TickOutcome};
pub use reporter::{
    ChatNotifier, Connectivity, Delivery, RemoteStore, Report, Reporter, ThresholdPayload,
};
pub use threshold::{sync_threshold, SyncOutcome, ThresholdState, ThresholdSync};
pub use time::{ManualTime, TimeSource, Timestamp};
#[cfg(feature = "std")]
pub use time::MonotonicTime;

/// Crate version reported in the user agent of the connectors
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
