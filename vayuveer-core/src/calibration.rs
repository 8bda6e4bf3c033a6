//! Clean-air baseline calibration
//!
//! Runs once at startup, blocking: wait for the heater to settle, average a
//! burst of readings, and put the alarm threshold a fixed offset above that
//! average. This is a best-effort estimate, not a measured-precision
//! instrument; there are no retries and an unreadable sensor yields a
//! baseline of 0 rather than aborting startup.

use embedded_hal::delay::DelayNs;

use crate::{
    config::MonitorConfig,
    errors::{GasMonitorError, MonitorResult},
    hal::AnalogSensor,
};

/// Timing and offset for one calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationParams {
    /// Heater settling time before the first reading
    pub warmup_ms: u32,
    /// Number of readings averaged
    pub sample_count: u16,
    /// Delay after each reading
    pub sample_delay_ms: u32,
    /// Added to the baseline to form the initial threshold
    pub threshold_offset: u32,
}

impl From<&MonitorConfig> for CalibrationParams {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            warmup_ms: config.warmup_ms,
            sample_count: config.calibration_samples,
            sample_delay_ms: config.calibration_sample_delay_ms,
            threshold_offset: config.threshold_offset,
        }
    }
}

/// Outcome of a calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationResult {
    /// Mean clean-air reading
    pub baseline: u16,
    /// `baseline + threshold_offset`
    pub threshold: u32,
    /// Readings that actually contributed to the mean
    pub samples_used: u16,
}

impl CalibrationResult {
    /// Check the baseline against a plausible window
    ///
    /// A stuck-low (floating input) or stuck-high (saturated ADC) sensor
    /// still calibrates; this only reports it.
    pub fn check_plausible(&self, floor: u16, ceiling: u16) -> MonitorResult<()> {
        if self.samples_used == 0 {
            return Err(GasMonitorError::SensorUnavailable {
                reason: "no calibration reading succeeded",
            });
        }

        if self.baseline < floor || self.baseline > ceiling {
            return Err(GasMonitorError::CalibrationImplausible {
                baseline: self.baseline,
                floor,
                ceiling,
            });
        }

        Ok(())
    }
}

/// Establish the clean-air baseline
///
/// Failed reads are logged and left out of the mean. If every read fails the
/// baseline is 0 and the threshold is just the offset.
pub fn calibrate<S, D>(sensor: &mut S, delay: &mut D, params: CalibrationParams) -> CalibrationResult
where
    S: AnalogSensor,
    D: DelayNs,
{
    log_info!("Heating sensor for {} ms...", params.warmup_ms);
    delay.delay_ms(params.warmup_ms);

    log_info!("Calibrating sensor in clean air...");
    let mut sum: u32 = 0;
    let mut used: u16 = 0;

    for _ in 0..params.sample_count {
        match nb::block!(sensor.read_raw()) {
            Ok(raw) => {
                sum += u32::from(raw);
                used += 1;
            }
            Err(_e) => {
                log_warn!("Calibration read failed: {:?}", _e);
            }
        }
        delay.delay_ms(params.sample_delay_ms);
    }

    let baseline = if used == 0 { 0 } else { (sum / u32::from(used)) as u16 };
    let threshold = u32::from(baseline).saturating_add(params.threshold_offset);

    log_info!("Baseline={}, Threshold={}", baseline, threshold);

    CalibrationResult {
        baseline,
        threshold,
        samples_used: used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct Constant(u16);

    impl AnalogSensor for Constant {
        type Error = Infallible;

        fn read_raw(&mut self) -> nb::Result<u16, Self::Error> {
            Ok(self.0)
        }
    }

    /// Fails every other read, returning `WouldBlock` once before each success
    struct Flaky {
        calls: u32,
        value: u16,
    }

    impl AnalogSensor for Flaky {
        type Error = &'static str;

        fn read_raw(&mut self) -> nb::Result<u16, Self::Error> {
            self.calls += 1;
            match self.calls % 3 {
                0 => Err(nb::Error::Other("adc timeout")),
                1 => Err(nb::Error::WouldBlock),
                _ => Ok(self.value),
            }
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ms: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += u64::from(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += u64::from(ms);
        }
    }

    fn params(samples: u16) -> CalibrationParams {
        CalibrationParams {
            warmup_ms: 15_000,
            sample_count: samples,
            sample_delay_ms: 50,
            threshold_offset: 120,
        }
    }

    #[test]
    fn constant_input_yields_that_baseline() {
        for &value in &[0u16, 1, 1000, 4095] {
            let mut delay = CountingDelay::default();
            let result = calibrate(&mut Constant(value), &mut delay, params(50));
            assert_eq!(result.baseline, value);
            assert_eq!(result.threshold, u32::from(value) + 120);
            assert_eq!(result.samples_used, 50);
        }
    }

    #[test]
    fn waits_warmup_plus_sample_spacing() {
        let mut delay = CountingDelay::default();
        calibrate(&mut Constant(900), &mut delay, params(50));
        assert_eq!(delay.total_ms, 15_000 + 50 * 50);
    }

    #[test]
    fn failed_reads_are_skipped() {
        let mut sensor = Flaky { calls: 0, value: 800 };
        let mut delay = CountingDelay::default();
        let result = calibrate(&mut sensor, &mut delay, params(6));

        // Sequence per attempt: WouldBlock then Ok, or Other -> skipped
        assert!(result.samples_used > 0);
        assert!(result.samples_used < 6);
        assert_eq!(result.baseline, 800);
    }

    #[test]
    fn zero_samples_is_degenerate_not_fatal() {
        let mut delay = CountingDelay::default();
        let result = calibrate(&mut Constant(1000), &mut delay, params(0));
        assert_eq!(result.baseline, 0);
        assert_eq!(result.threshold, 120);
        assert!(matches!(
            result.check_plausible(1, 4094),
            Err(GasMonitorError::SensorUnavailable { .. })
        ));
    }

    #[test]
    fn huge_offset_saturates() {
        let mut delay = CountingDelay::default();
        let result = calibrate(
            &mut Constant(1000),
            &mut delay,
            CalibrationParams {
                threshold_offset: u32::MAX,
                ..params(5)
            },
        );
        assert_eq!(result.baseline, 1000);
        assert_eq!(result.threshold, u32::MAX);
    }

    #[test]
    fn plausibility_window() {
        let ok = CalibrationResult { baseline: 1000, threshold: 1120, samples_used: 50 };
        assert!(ok.check_plausible(1, 4094).is_ok());

        let stuck_high = CalibrationResult { baseline: 4095, threshold: 4215, samples_used: 50 };
        assert_eq!(
            stuck_high.check_plausible(1, 4094),
            Err(GasMonitorError::CalibrationImplausible { baseline: 4095, floor: 1, ceiling: 4094 })
        );
    }
}
