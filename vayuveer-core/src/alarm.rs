//! SAFE/ALERT state machine
//!
//! Each tick the smoothed reading is compared against the active threshold:
//!
//! ```text
//!            smoothed >= threshold
//!   ┌──────┐ ─────────────────────▶ ┌───────┐
//!   │ SAFE │                        │ ALERT │
//!   └──────┘ ◀───────────────────── └───────┘
//!            smoothed <  threshold
//! ```
//!
//! Equality counts as ALERT. An edge transition asks for indicators, one chat
//! message and one immediate store report. Staying in a state asks only for a
//! heartbeat store report, and only once `report_interval_ms` has passed since
//! the previous report of any kind.
//!
//! The machine itself performs no I/O; it returns an [`AlarmAction`] and the
//! monitor carries it out. That keeps the timing rules testable on their own.

use crate::time::{elapsed_ms, Timestamp};

/// Alarm state driven by the smoothed reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmState {
    /// Reading below threshold
    #[default]
    Safe,
    /// Reading at or above threshold
    Alert,
}

impl AlarmState {
    /// Target state for a smoothed reading against a threshold
    pub fn classify(smoothed: u16, threshold: u32) -> Self {
        if u32::from(smoothed) >= threshold {
            AlarmState::Alert
        } else {
            AlarmState::Safe
        }
    }

    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            AlarmState::Safe => "SAFE",
            AlarmState::Alert => "ALERT",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AlarmState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name())
    }
}

/// Status label written to the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    /// Boot report sent once after calibration
    Starting,
    /// Edge into ALERT
    LeakDetected,
    /// Heartbeat while in ALERT
    LeakOngoing,
    /// Edge into SAFE
    Safe,
    /// Heartbeat while in SAFE
    SafeSteady,
}

impl StatusLabel {
    /// Label as stored remotely
    ///
    /// `Safe` and `SafeSteady` share a wire label; the dashboard keys on the
    /// string and never distinguished the two.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::Starting => "Starting",
            StatusLabel::LeakDetected => "LEAK DETECTED",
            StatusLabel::LeakOngoing => "LEAK ONGOING",
            StatusLabel::Safe | StatusLabel::SafeSteady => "SAFE",
        }
    }

    /// Check if this label marks a state transition
    pub const fn is_edge(&self) -> bool {
        matches!(self, StatusLabel::LeakDetected | StatusLabel::Safe)
    }

    /// Label for an edge into `state`
    pub const fn entering(state: AlarmState) -> Self {
        match state {
            AlarmState::Alert => StatusLabel::LeakDetected,
            AlarmState::Safe => StatusLabel::Safe,
        }
    }

    /// Label for a heartbeat while remaining in `state`
    pub const fn remaining(state: AlarmState) -> Self {
        match state {
            AlarmState::Alert => StatusLabel::LeakOngoing,
            AlarmState::Safe => StatusLabel::SafeSteady,
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StatusLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What the monitor must do after an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmAction {
    /// State changed: drive indicators, notify chat, report immediately
    Entered(AlarmState),
    /// State unchanged and the report interval elapsed: report only
    Heartbeat(StatusLabel),
    /// Nothing to do this tick
    Idle,
}

impl AlarmAction {
    /// Store label for this action, if it produces a report
    pub const fn status_label(&self) -> Option<StatusLabel> {
        match self {
            AlarmAction::Entered(state) => Some(StatusLabel::entering(*state)),
            AlarmAction::Heartbeat(label) => Some(*label),
            AlarmAction::Idle => None,
        }
    }
}

/// Edge-triggered alarm with throttled heartbeat reports
#[derive(Debug, Clone)]
pub struct AlarmMachine {
    state: AlarmState,

    /// Time of the last report of any kind (edge or heartbeat)
    last_report: Timestamp,

    report_interval_ms: u64,
}

impl AlarmMachine {
    /// Starts in SAFE with the report clock at `now`
    pub fn new(report_interval_ms: u64, now: Timestamp) -> Self {
        Self {
            state: AlarmState::Safe,
            last_report: now,
            report_interval_ms,
        }
    }

    /// Current state
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Timestamp of the last edge or heartbeat
    pub fn last_report(&self) -> Timestamp {
        self.last_report
    }

    /// Restart the heartbeat clock, e.g. after an out-of-band report
    pub fn mark_reported(&mut self, now: Timestamp) {
        self.last_report = now;
    }

    /// Compare `smoothed` against `threshold` and decide what to do
    pub fn evaluate(&mut self, smoothed: u16, threshold: u32, now: Timestamp) -> AlarmAction {
        let target = AlarmState::classify(smoothed, threshold);

        if target != self.state {
            self.state = target;
            self.last_report = now;
            return AlarmAction::Entered(target);
        }

        if elapsed_ms(self.last_report, now) >= self.report_interval_ms {
            self.last_report = now;
            return AlarmAction::Heartbeat(StatusLabel::remaining(self.state));
        }

        AlarmAction::Idle
    }
}

/// Linear proxy for gas concentration
///
/// `smoothed / full_scale * reference_voltage * scale`. This is the sensor
/// voltage in millivolts under the default scale; it is NOT a calibrated LPG
/// concentration and must not be presented as one.
pub fn pseudo_ppm(smoothed: u16, full_scale: u16, reference_voltage: f32, scale: f32) -> f32 {
    if full_scale == 0 {
        return 0.0;
    }
    let voltage = f32::from(smoothed) / f32::from(full_scale) * reference_voltage;
    voltage * scale
}
