//! Fixed-Size Moving-Average Window for Raw Sensor Readings
//!
//! ## Overview
//!
//! MQ-series sensors are noisy: individual ADC reads jump by tens of counts
//! even in clean air. The alarm decision is therefore made on a running mean
//! of the last `N` raw readings, held in a ring buffer whose size is fixed at
//! compile time through const generics.
//!
//! ## Design Rationale
//!
//! ### Array + Cursor + Fill Count
//!
//! The window is three fields and no allocation:
//! - O(1) insertion (overwrites the oldest slot)
//! - O(N) mean, with N small (8 by default)
//! - Zero heap allocations
//!
//! The fill count matters only before the window has seen `N` readings. Until
//! then the mean is taken over the filled slots, so an unseeded window does
//! not average in phantom zeros.
//!
//! ### Re-seeding
//!
//! After calibration every slot is overwritten with the baseline. The first
//! readings of normal operation are then averaged against clean air instead
//! of against whatever was sampled during heater warm-up.
//!
//! ### Memory Layout
//!
//! ```text
//! SampleWindow<8> after 10 pushes (r0..r9):
//! ┌────┬────┬────┬────┬────┬────┬────┬────┐
//! │ r8 │ r9 │ r2 │ r3 │ r4 │ r5 │ r6 │ r7 │
//! └────┴────┴────┴────┴────┴────┴────┴────┘
//!            ↑
//!            └── cursor = 2 (next write, currently the oldest)
//!
//! Total size = 2 * N + 2 * usize bytes
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use vayuveer_core::buffer::SampleWindow;
//!
//! let mut window: SampleWindow<4> = SampleWindow::new();
//! window.reseed(1000);
//!
//! assert_eq!(window.push(1400), 1100); // (3 * 1000 + 1400) / 4
//! assert_eq!(window.push(1400), 1200);
//! ```

/// Fixed-size ring buffer of raw ADC readings with a truncated running mean
///
/// ## Type Parameter
///
/// - `N`: window length. Must be at least 1; this is checked at compile time.
///
/// ## Internal Invariants
///
/// - `cursor < N`
/// - `filled <= N`
/// - once `filled == N` it never decreases (there is no `clear`)
#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize> {
    slots: [u16; N],

    /// Index where the next write will occur
    cursor: usize,

    /// Number of slots holding real readings
    filled: usize,
}

impl<const N: usize> SampleWindow<N> {
    const NON_EMPTY: () = assert!(N >= 1, "SampleWindow needs at least one slot");

    /// Creates an empty window
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::NON_EMPTY;
        Self {
            slots: [0; N],
            cursor: 0,
            filled: 0,
        }
    }

    /// Creates a window with every slot set to `value`
    pub fn seeded(value: u16) -> Self {
        let mut window = Self::new();
        window.reseed(value);
        window
    }

    /// Overwrites every slot with `value` and marks the window full
    pub fn reseed(&mut self, value: u16) {
        self.slots = [value; N];
        self.cursor = 0;
        self.filled = N;
    }

    /// Adds a raw reading and returns the new smoothed value
    ///
    /// The oldest slot is overwritten once the window is full.
    pub fn push(&mut self, raw: u16) -> u16 {
        self.slots[self.cursor] = raw;
        self.cursor = (self.cursor + 1) % N;

        if self.filled < N {
            self.filled += 1;
        }

        self.average()
    }

    /// Truncated mean of the filled slots, 0 for an empty window
    pub fn average(&self) -> u16 {
        if self.filled == 0 {
            return 0;
        }

        // Before the first wrap the readings occupy 0..filled.
        let sum: u32 = self.slots[..self.filled].iter().map(|&r| u32::from(r)).sum();
        (sum / self.filled as u32) as u16
    }

    /// Number of slots holding readings
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Check if nothing has been pushed or seeded yet
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Check if every slot holds a reading
    pub fn is_full(&self) -> bool {
        self.filled == N
    }

    /// Window length
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
