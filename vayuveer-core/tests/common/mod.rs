//! Common fakes for the monitor integration tests
//!
//! This module provides:
//! - A scripted gas sensor that replays readings and faults
//! - Recording indicators, chat channel and remote store
//! - A link that can be switched off and refuse to reconnect
//! - A delay that advances a [`ManualTime`] instead of sleeping
//!
//! The monitor owns every fake; tests inspect them through the monitor's
//! accessors after stepping it.

#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use vayuveer_core::{
    ChatNotifier, Connectivity, GasMonitor, Indicators, ManualTime, MonitorConfig, RemoteStore,
    Report, Reporter, ThresholdPayload, TickOutcome,
};

pub mod scenarios;

/// Calibration time under the default config: 15 s warm-up plus 50 x 50 ms
pub const STARTUP_MS: u64 = 15_000 + 50 * 50;

/// Default loop spacing
pub const LOOP_MS: u64 = 400;

/// Read failure injected by [`ScriptedSensor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault;

/// Replays queued readings, then repeats the steady value
pub struct ScriptedSensor {
    queue: VecDeque<Result<u16, SensorFault>>,
    steady: u16,
    reads: usize,
}

impl ScriptedSensor {
    pub fn steady(value: u16) -> Self {
        Self {
            queue: VecDeque::new(),
            steady: value,
            reads: 0,
        }
    }

    /// Queue `times` copies of `raw`; the last queued value becomes steady
    pub fn then(mut self, raw: u16, times: usize) -> Self {
        for _ in 0..times {
            self.queue.push_back(Ok(raw));
        }
        self.steady = raw;
        self
    }

    /// Queue `times` read failures
    pub fn then_fail(mut self, times: usize) -> Self {
        for _ in 0..times {
            self.queue.push_back(Err(SensorFault));
        }
        self
    }

    pub fn set_steady(&mut self, value: u16) {
        self.steady = value;
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl vayuveer_core::AnalogSensor for ScriptedSensor {
    type Error = SensorFault;

    fn read_raw(&mut self) -> nb::Result<u16, Self::Error> {
        self.reads += 1;
        match self.queue.pop_front() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(fault)) => Err(nb::Error::Other(fault)),
            None => Ok(self.steady),
        }
    }
}

/// Remembers the last level of each output
#[derive(Debug, Default)]
pub struct RecordingIndicators {
    pub alert: bool,
    pub safe: bool,
    pub buzzer: bool,
    pub writes: usize,
}

impl Indicators for RecordingIndicators {
    fn set_alert(&mut self, on: bool) {
        self.alert = on;
        self.writes += 1;
    }

    fn set_safe(&mut self, on: bool) {
        self.safe = on;
        self.writes += 1;
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer = on;
        self.writes += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingChat {
    pub sent: Vec<String>,
    pub fail: bool,
}

impl ChatNotifier for RecordingChat {
    type Error = u16;

    fn send_message(&mut self, text: &str) -> Result<(), u16> {
        if self.fail {
            return Err(502);
        }
        self.sent.push(text.to_string());
        Ok(())
    }
}

/// In-memory store; `threshold: None` answers every fetch with a 404
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub reports: Vec<Report>,
    pub threshold: Option<String>,
    pub fetches: usize,
    pub fail_puts: bool,
}

impl RecordingStore {
    pub fn with_threshold(body: &str) -> Self {
        Self {
            threshold: Some(body.to_string()),
            ..Self::default()
        }
    }
}

impl RemoteStore for RecordingStore {
    type Error = u16;

    fn put_state(&mut self, report: &Report) -> Result<(), u16> {
        if self.fail_puts {
            return Err(500);
        }
        self.reports.push(*report);
        Ok(())
    }

    fn fetch_threshold(&mut self) -> Result<ThresholdPayload, u16> {
        self.fetches += 1;
        match &self.threshold {
            Some(body) => ThresholdPayload::try_from(body.as_str()).map_err(|_| 413),
            None => Err(404),
        }
    }
}

/// Link whose state the test controls
#[derive(Debug)]
pub struct SwitchableLink {
    pub up: bool,
    pub reconnect_works: bool,
    pub reconnects: usize,
}

impl SwitchableLink {
    pub fn online() -> Self {
        Self {
            up: true,
            reconnect_works: true,
            reconnects: 0,
        }
    }

    pub fn dead() -> Self {
        Self {
            up: false,
            reconnect_works: false,
            reconnects: 0,
        }
    }
}

impl Connectivity for SwitchableLink {
    fn is_connected(&self) -> bool {
        self.up
    }

    fn reconnect(&mut self) {
        self.reconnects += 1;
        if self.reconnect_works {
            self.up = true;
        }
    }
}

/// Delay that advances a manual clock
pub struct ManualDelay<'a> {
    clock: &'a ManualTime,
    pending_ns: u64,
}

impl<'a> ManualDelay<'a> {
    pub fn new(clock: &'a ManualTime) -> Self {
        Self {
            clock,
            pending_ns: 0,
        }
    }
}

impl DelayNs for ManualDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.pending_ns += u64::from(ns);
        self.clock.advance(self.pending_ns / 1_000_000);
        self.pending_ns %= 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
    }
}

pub type Rig<'a> = GasMonitor<
    ScriptedSensor,
    RecordingIndicators,
    &'a ManualTime,
    RecordingChat,
    RecordingStore,
    SwitchableLink,
>;

/// Build a monitor with the default config
pub fn rig<'a>(
    clock: &'a ManualTime,
    sensor: ScriptedSensor,
    store: RecordingStore,
    link: SwitchableLink,
) -> Rig<'a> {
    let reporter = Reporter::new(RecordingChat::default(), store, link);
    GasMonitor::new(
        sensor,
        RecordingIndicators::default(),
        clock,
        reporter,
        MonitorConfig::default(),
    )
    .expect("default config is valid")
}

/// Build and start a monitor on a live link
pub fn started<'a>(clock: &'a ManualTime, sensor: ScriptedSensor, store: RecordingStore) -> Rig<'a> {
    let mut monitor = rig(clock, sensor, store, SwitchableLink::online());
    monitor.start(&mut ManualDelay::new(clock));
    monitor
}

/// Advance one loop period and tick
pub fn step(monitor: &mut Rig<'_>, clock: &ManualTime) -> TickOutcome {
    clock.advance(LOOP_MS);
    monitor.tick()
}

/// Tick `count` times, returning every outcome
pub fn run(monitor: &mut Rig<'_>, clock: &ManualTime, count: usize) -> Vec<TickOutcome> {
    (0..count).map(|_| step(monitor, clock)).collect()
}
