//! Sensor Front-End Constants
//!
//! The MQ-6 analog output is wired to a 12-bit ESP32 ADC channel. Readings
//! are raw counts; nothing here converts them to a true gas concentration.

// ===== ADC GEOMETRY =====

/// Largest raw count the 12-bit ADC produces.
pub const ADC_FULL_SCALE: u16 = 4095;

/// ADC reference voltage (V) at 11 dB attenuation.
pub const REFERENCE_VOLTAGE_V: f32 = 3.3;

/// Multiplier from volts to the reported pseudo-ppm figure.
///
/// The product `V * 1000` is a proxy used by the dashboard. It is NOT a
/// calibrated LPG concentration; MQ-6 response is non-linear and depends on
/// temperature, humidity and the load resistor.
pub const PPM_SCALE: f32 = 1000.0;

// ===== SMOOTHING =====

/// Number of raw readings in the moving-average window.
///
/// At the default 400 ms loop delay this averages over ~3.2 s.
pub const SMOOTHING_WINDOW: usize = 8;

// ===== CALIBRATION =====

/// Readings averaged to establish the clean-air baseline.
pub const CALIBRATION_SAMPLES: u16 = 50;

/// Counts above the baseline at which the alarm triggers.
pub const DEFAULT_THRESHOLD_OFFSET: u32 = 120;

/// Lowest baseline a connected, heated MQ-6 produces.
///
/// A baseline of 0 means a floating or shorted input.
pub const BASELINE_FLOOR: u16 = 1;

/// Highest baseline a working sensor produces.
///
/// A baseline at full scale means the ADC is saturated.
pub const BASELINE_CEILING: u16 = ADC_FULL_SCALE - 1;

// ===== REMOTE PAYLOADS =====

/// Longest threshold body accepted from the remote store (bytes).
pub const MAX_THRESHOLD_BODY: usize = 32;

/// Capacity of a formatted chat message (bytes).
pub const MAX_CHAT_MESSAGE: usize = 128;
