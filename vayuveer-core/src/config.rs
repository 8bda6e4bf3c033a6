//! Monitor configuration
//!
//! Every tunable of the alarm loop in one struct. `Default` reproduces the
//! deployed firmware; with the `serde` feature the struct can be loaded from
//! a config file where any omitted field falls back to that default.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    alarm,
    constants::{self, sensors, time},
    errors::{GasMonitorError, MonitorResult},
};

/// Tunables for calibration, alarm timing and the pseudo-ppm transform
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    // --- Calibration ---
    /// Counts above the baseline at which the alarm triggers
    pub threshold_offset: u32,
    /// Heater warm-up before calibration (ms)
    pub warmup_ms: u32,
    /// Readings averaged for the baseline
    pub calibration_samples: u16,
    /// Spacing between calibration readings (ms)
    pub calibration_sample_delay_ms: u32,
    /// Lowest plausible clean-air baseline
    pub baseline_floor: u16,
    /// Highest plausible clean-air baseline
    pub baseline_ceiling: u16,

    // --- Timing ---
    /// Remote threshold pull interval (ms)
    pub threshold_sync_interval_ms: u64,
    /// Heartbeat report interval while the state is unchanged (ms)
    pub report_interval_ms: u64,
    /// Delay between loop iterations (ms)
    pub loop_delay_ms: u32,

    // --- Pseudo-ppm ---
    /// Largest raw ADC count
    pub adc_full_scale: u16,
    /// ADC reference voltage (V)
    pub reference_voltage: f32,
    /// Volts to pseudo-ppm multiplier
    pub ppm_scale: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold_offset: constants::DEFAULT_THRESHOLD_OFFSET,
            warmup_ms: time::WARMUP_MS,
            calibration_samples: constants::CALIBRATION_SAMPLES,
            calibration_sample_delay_ms: time::CALIBRATION_SAMPLE_DELAY_MS,
            baseline_floor: sensors::BASELINE_FLOOR,
            baseline_ceiling: sensors::BASELINE_CEILING,

            threshold_sync_interval_ms: time::THRESHOLD_SYNC_INTERVAL_MS,
            report_interval_ms: time::REPORT_INTERVAL_MS,
            loop_delay_ms: time::LOOP_DELAY_MS,

            adc_full_scale: sensors::ADC_FULL_SCALE,
            reference_voltage: sensors::REFERENCE_VOLTAGE_V,
            ppm_scale: sensors::PPM_SCALE,
        }
    }
}

impl MonitorConfig {
    /// Reject values that would break a monitor invariant
    pub fn validate(&self) -> MonitorResult<()> {
        if self.threshold_offset == 0 {
            return Err(GasMonitorError::InvalidConfig {
                reason: "threshold_offset must be positive",
            });
        }

        if self.threshold_offset > u32::from(self.adc_full_scale) {
            return Err(GasMonitorError::InvalidConfig {
                reason: "threshold_offset exceeds adc_full_scale",
            });
        }

        if self.calibration_samples == 0 {
            return Err(GasMonitorError::InvalidConfig {
                reason: "calibration_samples must be positive",
            });
        }

        if self.adc_full_scale == 0 {
            return Err(GasMonitorError::InvalidConfig {
                reason: "adc_full_scale must be positive",
            });
        }

        if !(self.reference_voltage.is_finite() && self.reference_voltage > 0.0) {
            return Err(GasMonitorError::InvalidConfig {
                reason: "reference_voltage must be a positive number",
            });
        }

        if !(self.ppm_scale.is_finite() && self.ppm_scale > 0.0) {
            return Err(GasMonitorError::InvalidConfig {
                reason: "ppm_scale must be a positive number",
            });
        }

        if self.baseline_floor > self.baseline_ceiling {
            return Err(GasMonitorError::InvalidConfig {
                reason: "baseline_floor exceeds baseline_ceiling",
            });
        }

        Ok(())
    }

    /// Pseudo-concentration for a smoothed reading (see [`alarm::pseudo_ppm`])
    pub fn pseudo_ppm(&self, smoothed: u16) -> f32 {
        alarm::pseudo_ppm(smoothed, self.adc_full_scale, self.reference_voltage, self.ppm_scale)
    }

    /// Sensor voltage for a smoothed reading
    pub fn voltage(&self, smoothed: u16) -> f32 {
        alarm::pseudo_ppm(smoothed, self.adc_full_scale, self.reference_voltage, 1.0)
    }
}
