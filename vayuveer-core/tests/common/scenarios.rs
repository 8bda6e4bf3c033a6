//! Reading scripts for common situations
//!
//! Every script starts with the 50 calibration readings, so the first queued
//! value after that is what the first tick sees.

use super::ScriptedSensor;

/// Readings consumed by calibration under the default config
pub const CALIBRATION_READS: usize = 50;

/// Clean air at `baseline` forever
pub fn clean_air(baseline: u16) -> ScriptedSensor {
    ScriptedSensor::steady(baseline).then(baseline, CALIBRATION_READS)
}

/// Clean air, then `leak` for `ticks` readings, then clean air again
pub fn leak_then_clear(baseline: u16, leak: u16, ticks: usize) -> ScriptedSensor {
    clean_air(baseline).then(leak, ticks).then(baseline, 1)
}

/// Clean air, then `leak` forever
pub fn sustained_leak(baseline: u16, leak: u16) -> ScriptedSensor {
    clean_air(baseline).then(leak, 1)
}

/// Calibration where every `every`th reading fails
pub fn flaky_calibration(baseline: u16, every: usize) -> ScriptedSensor {
    let mut sensor = ScriptedSensor::steady(baseline);
    for i in 1..=CALIBRATION_READS {
        sensor = if i % every == 0 {
            sensor.then_fail(1)
        } else {
            sensor.then(baseline, 1)
        };
    }
    sensor
}
