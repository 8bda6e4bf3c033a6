//! Simulated hardware for running the monitor on a host
//!
//! - [`SimulatedSensor`]: an MQ-6 that reads a noisy baseline, or a leak
//!   level while a leak is switched on
//! - [`LogPin`]: an output pin that logs level changes
//! - [`StdDelay`]: `DelayNs` over `thread::sleep`

use std::convert::Infallible;
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use log::info;
use vayuveer_core::AnalogSensor;

/// Largest 12-bit ADC count
const ADC_MAX: u16 = 4095;

/// Noisy gas sensor with a switchable leak
pub struct SimulatedSensor {
    baseline: u16,
    noise: u16,
    leak: Option<u16>,
    seed: u32,
}

impl SimulatedSensor {
    pub fn new(baseline: u16, noise: u16) -> Self {
        Self {
            baseline,
            noise,
            leak: None,
            seed: 42,
        }
    }

    /// Switch the leak on at `level`, or off with `None`
    pub fn set_leak(&mut self, level: Option<u16>) {
        if level != self.leak {
            match level {
                Some(level) => info!("Simulated leak started at {}", level),
                None => info!("Simulated leak stopped"),
            }
        }
        self.leak = level;
    }

    // xorshift32; reproducible runs matter more than quality here
    fn next_random(&mut self) -> u32 {
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.seed = x;
        x
    }

    fn jitter(&mut self) -> i32 {
        if self.noise == 0 {
            return 0;
        }
        let span = u32::from(self.noise) * 2 + 1;
        (self.next_random() % span) as i32 - i32::from(self.noise)
    }
}

impl AnalogSensor for SimulatedSensor {
    type Error = Infallible;

    fn read_raw(&mut self) -> nb::Result<u16, Self::Error> {
        let level = self.leak.unwrap_or(self.baseline);
        let raw = (i32::from(level) + self.jitter()).clamp(0, i32::from(ADC_MAX));
        Ok(raw as u16)
    }
}

/// Output pin that logs its level
pub struct LogPin {
    name: &'static str,
    high: Option<bool>,
}

impl LogPin {
    pub fn new(name: &'static str) -> Self {
        Self { name, high: None }
    }

    fn set(&mut self, high: bool) {
        if self.high != Some(high) {
            info!("{} {}", self.name, if high { "ON" } else { "OFF" });
        }
        self.high = Some(high);
    }
}

impl ErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

/// Blocking delay on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
