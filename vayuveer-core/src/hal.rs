//! Hardware collaborators
//!
//! The monitor never touches registers. It reads the gas sensor through
//! [`AnalogSensor`] and drives the alert LED, safe LED and buzzer through
//! [`Indicators`]. On real hardware [`PinIndicators`] maps the three outputs
//! onto `embedded-hal` GPIO pins.

use embedded_hal::digital::{OutputPin, PinState};

use crate::alarm::AlarmState;

/// One-shot analog reader for the gas sensor
///
/// Follows the `nb` convention: an ADC that needs time for a conversion
/// returns `WouldBlock` and is polled again.
pub trait AnalogSensor {
    /// Read failure reported by the driver
    type Error: core::fmt::Debug;

    /// Read one raw ADC count
    fn read_raw(&mut self) -> nb::Result<u16, Self::Error>;
}

impl<T: AnalogSensor + ?Sized> AnalogSensor for &mut T {
    type Error = T::Error;

    fn read_raw(&mut self) -> nb::Result<u16, Self::Error> {
        (**self).read_raw()
    }
}

/// Local alarm outputs
pub trait Indicators {
    /// Red alert LED
    fn set_alert(&mut self, on: bool);

    /// Green safe LED
    fn set_safe(&mut self, on: bool);

    /// Audible alarm
    fn set_buzzer(&mut self, on: bool);

    /// Drive all three outputs for `state`
    fn show(&mut self, state: AlarmState) {
        let alert = state == AlarmState::Alert;
        self.set_alert(alert);
        self.set_safe(!alert);
        self.set_buzzer(alert);
    }

    /// Everything off (used before calibration)
    fn all_off(&mut self) {
        self.set_alert(false);
        self.set_safe(false);
        self.set_buzzer(false);
    }
}

/// [`Indicators`] over three GPIO output pins
pub struct PinIndicators<A, S, B> {
    alert: A,
    safe: S,
    buzzer: B,
}

impl<A, S, B> PinIndicators<A, S, B>
where
    A: OutputPin,
    S: OutputPin,
    B: OutputPin,
{
    /// Red LED, green LED and buzzer, in that order
    pub fn new(alert: A, safe: S, buzzer: B) -> Self {
        Self { alert, safe, buzzer }
    }

    /// Give the pins back
    pub fn release(self) -> (A, S, B) {
        (self.alert, self.safe, self.buzzer)
    }
}

// A pin write that fails cannot be retried usefully from the alarm loop;
// it is logged and the next edge drives the pin again.
fn drive<P: OutputPin>(pin: &mut P, on: bool, _name: &str) {
    if let Err(_e) = pin.set_state(PinState::from(on)) {
        log_warn!("Failed to drive {} pin: {:?}", _name, _e);
    }
}

impl<A, S, B> Indicators for PinIndicators<A, S, B>
where
    A: OutputPin,
    S: OutputPin,
    B: OutputPin,
{
    fn set_alert(&mut self, on: bool) {
        drive(&mut self.alert, on, "alert");
    }

    fn set_safe(&mut self, on: bool) {
        drive(&mut self.safe, on, "safe");
    }

    fn set_buzzer(&mut self, on: bool) {
        drive(&mut self.buzzer, on, "buzzer");
    }
}
