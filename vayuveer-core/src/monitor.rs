//! The monitor context
//!
//! [`GasMonitor`] owns everything the alarm loop touches: the sensor, the
//! indicators, the clock, the reporter, the smoothing window, the threshold
//! synchronizer and the alarm machine. There are no globals; a test builds a
//! monitor from fakes and steps it tick by tick.
//!
//! ## Lifecycle
//!
//! 1. [`GasMonitor::start`] runs once: indicators off, calibration, window
//!    re-seeded with the baseline, SAFE indicators, a `Starting` report and
//!    an initial threshold pull.
//! 2. [`GasMonitor::tick`] runs forever with a fixed delay in between:
//!    reconnect if needed, pull the threshold when due, sample, evaluate,
//!    report.
//!
//! Remote calls are synchronous and may block a tick until they time out.
//! The `vayuveer-connectors` crate has a queued reporter for deployments
//! where that latency matters.

use embedded_hal::delay::DelayNs;

use crate::{
    alarm::{AlarmAction, AlarmMachine, AlarmState, StatusLabel},
    buffer::SampleWindow,
    calibration::{calibrate, CalibrationParams, CalibrationResult},
    config::MonitorConfig,
    constants::SMOOTHING_WINDOW,
    errors::MonitorResult,
    hal::{AnalogSensor, Indicators},
    reporter::{self, ChatNotifier, Connectivity, Delivery, RemoteStore, Report, Reporter},
    threshold::{SyncOutcome, ThresholdSync},
    time::{TimeSource, Timestamp},
};

/// Everything that happened in one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Tick time
    pub timestamp: Timestamp,
    /// Raw reading, `None` if the sensor failed this tick
    pub raw: Option<u16>,
    /// Smoothed reading after this tick
    pub smoothed: u16,
    /// Pseudo-ppm of the smoothed reading
    pub ppm: f32,
    /// Threshold used for the evaluation
    pub threshold: u32,
    /// State after evaluation
    pub state: AlarmState,
    /// What the alarm machine asked for
    pub action: AlarmAction,
    /// Result of the threshold pull, if one was due
    pub sync: Option<SyncOutcome>,
}

/// Gas-leak monitor context
///
/// `N` is the smoothing window length.
pub struct GasMonitor<S, I, T, C, R, L, const N: usize = SMOOTHING_WINDOW> {
    sensor: S,
    indicators: I,
    clock: T,
    reporter: Reporter<C, R, L>,
    config: MonitorConfig,

    window: SampleWindow<N>,
    threshold: ThresholdSync,
    alarm: AlarmMachine,
    calibration: Option<CalibrationResult>,
}

impl<S, I, T, C, R, L, const N: usize> GasMonitor<S, I, T, C, R, L, N>
where
    S: AnalogSensor,
    I: Indicators,
    T: TimeSource,
    C: ChatNotifier,
    R: RemoteStore,
    L: Connectivity,
{
    /// Build a monitor; call [`GasMonitor::start`] before ticking
    pub fn new(
        sensor: S,
        indicators: I,
        clock: T,
        reporter: Reporter<C, R, L>,
        config: MonitorConfig,
    ) -> MonitorResult<Self> {
        config.validate()?;

        let now = clock.now();
        Ok(Self {
            sensor,
            indicators,
            clock,
            reporter,
            threshold: ThresholdSync::new(
                config.threshold_offset,
                config.threshold_sync_interval_ms,
                now,
            ),
            alarm: AlarmMachine::new(config.report_interval_ms, now),
            config,
            window: SampleWindow::new(),
            calibration: None,
        })
    }

    /// Calibrate and announce; blocks for the warm-up and sampling time
    pub fn start<D: DelayNs>(&mut self, delay: &mut D) -> CalibrationResult {
        self.indicators.all_off();

        let result = calibrate(
            &mut self.sensor,
            delay,
            CalibrationParams::from(&self.config),
        );

        let plausible =
            result.check_plausible(self.config.baseline_floor, self.config.baseline_ceiling);
        if let Err(_e) = plausible {
            log_warn!("Calibration looks implausible, continuing anyway: {}", _e);
        }

        self.window.reseed(result.baseline);

        let now = self.clock.now();
        self.threshold = ThresholdSync::new(
            result.threshold,
            self.config.threshold_sync_interval_ms,
            now,
        );
        self.alarm = AlarmMachine::new(self.config.report_interval_ms, now);
        self.indicators.show(AlarmState::Safe);
        self.calibration = Some(result);

        self.reporter
            .report_state(&Report::new(0.0, StatusLabel::Starting, now));

        let fetched = self.reporter.fetch_threshold();
        self.threshold.apply(fetched, self.clock.now());

        result
    }

    /// One iteration of the control loop
    pub fn tick(&mut self) -> TickOutcome {
        self.reporter.ensure_link();

        let sync = if self.threshold.is_due(self.clock.now()) {
            let fetched = self.reporter.fetch_threshold();
            Some(self.threshold.apply(fetched, self.clock.now()))
        } else {
            None
        };

        let now = self.clock.now();
        let raw = match nb::block!(self.sensor.read_raw()) {
            Ok(raw) => Some(raw),
            Err(_e) => {
                log_warn!("Sensor read failed, skipping evaluation: {:?}", _e);
                None
            }
        };

        let threshold = self.threshold.active();

        let Some(raw) = raw else {
            let smoothed = self.window.average();
            return TickOutcome {
                timestamp: now,
                raw: None,
                smoothed,
                ppm: self.config.pseudo_ppm(smoothed),
                threshold,
                state: self.alarm.state(),
                action: AlarmAction::Idle,
                sync,
            };
        };

        let smoothed = self.window.push(raw);
        let ppm = self.config.pseudo_ppm(smoothed);

        log_debug!(
            "Raw={} | ADC={} | V={:.2}V | PPM={:.1} | Base={} | Threshold={}",
            raw,
            smoothed,
            self.config.voltage(smoothed),
            ppm,
            self.baseline(),
            threshold
        );

        let action = self.alarm.evaluate(smoothed, threshold, now);
        self.carry_out(action, ppm, now);

        TickOutcome {
            timestamp: now,
            raw: Some(raw),
            smoothed,
            ppm,
            threshold,
            state: self.alarm.state(),
            action,
            sync,
        }
    }

    fn carry_out(&mut self, action: AlarmAction, ppm: f32, now: Timestamp) {
        match action {
            AlarmAction::Entered(state) => {
                log_info!("Alarm state changed to {}", state.name());
                self.indicators.show(state);

                let message = match state {
                    AlarmState::Alert => reporter::alert_message(ppm),
                    AlarmState::Safe => reporter::all_clear_message(),
                };
                self.announce(&message);

                let report = Report::new(ppm, StatusLabel::entering(state), now);
                self.reporter.report_state(&report);
            }
            AlarmAction::Heartbeat(label) => {
                self.reporter.report_state(&Report::new(ppm, label, now));
            }
            AlarmAction::Idle => {}
        }
    }

    fn announce(&mut self, message: &str) {
        if self.reporter.notify_chat(message) == Delivery::Skipped {
            log_warn!("Offline, chat notification dropped");
        }
    }

    /// Calibrated baseline, 0 before [`GasMonitor::start`]
    pub fn baseline(&self) -> u16 {
        self.calibration.map(|c| c.baseline).unwrap_or(0)
    }

    /// Result of the last [`GasMonitor::start`]
    pub fn calibration(&self) -> Option<&CalibrationResult> {
        self.calibration.as_ref()
    }

    /// Threshold currently in force
    pub fn threshold(&self) -> u32 {
        self.threshold.active()
    }

    /// Current alarm state
    pub fn state(&self) -> AlarmState {
        self.alarm.state()
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Smoothing window
    pub fn window(&self) -> &SampleWindow<N> {
        &self.window
    }

    /// Sensor access, e.g. for a simulator to inject readings
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Indicator outputs
    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    /// Remote reporter
    pub fn reporter(&self) -> &Reporter<C, R, L> {
        &self.reporter
    }

    /// Remote reporter, mutably
    pub fn reporter_mut(&mut self) -> &mut Reporter<C, R, L> {
        &mut self.reporter
    }
}
