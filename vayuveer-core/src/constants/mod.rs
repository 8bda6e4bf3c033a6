//! Constants for the VayuVeer monitor
//!
//! Default values for every tunable in [`crate::MonitorConfig`], plus the
//! fixed wire-level strings. Values match the deployed ESP32 firmware.
//!
//! ## Organization
//!
//! - **Sensors**: ADC geometry, calibration and the pseudo-ppm transform
//! - **Time**: loop cadence and the remote sync / heartbeat intervals

/// ADC, calibration and conversion constants for the MQ-6 front end.
pub mod sensors;

/// Loop cadence, warm-up and remote interval constants.
pub mod time;

// Re-export commonly used constants for convenience
pub use sensors::{
    ADC_FULL_SCALE, CALIBRATION_SAMPLES, DEFAULT_THRESHOLD_OFFSET, PPM_SCALE,
    REFERENCE_VOLTAGE_V, SMOOTHING_WINDOW,
};

pub use time::{
    CALIBRATION_SAMPLE_DELAY_MS, LOOP_DELAY_MS, REPORT_INTERVAL_MS, THRESHOLD_SYNC_INTERVAL_MS,
    WARMUP_MS,
};
