//! Time-Related Constants
//!
//! All values in milliseconds of the monotonic boot clock.

/// Heater warm-up before calibration starts.
///
/// MQ-series sensors drift heavily while the heater settles.
pub const WARMUP_MS: u32 = 15_000;

/// Spacing between calibration readings.
pub const CALIBRATION_SAMPLE_DELAY_MS: u32 = 50;

/// Delay between iterations of the control loop.
pub const LOOP_DELAY_MS: u32 = 400;

/// Interval between remote threshold pulls.
pub const THRESHOLD_SYNC_INTERVAL_MS: u64 = 10_000;

/// Minimum spacing of heartbeat reports while the alarm state is unchanged.
pub const REPORT_INTERVAL_MS: u64 = 3000;
