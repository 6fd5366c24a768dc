//! The display side: strip frames, the [`DisplaySink`] capability, and two sinks.
//!
//! - [`FrameSink`] keeps frames in memory (previews, tests, console output).
//! - [`StripSink`] writes frames to any [`SmartLedsWrite`] driver, after gamma correction
//!   and current limiting.
//!
//! A tracker talks to its sink once per refresh: [`DisplaySink::clear_all`], then
//! [`DisplaySink::set`] for every LED, then [`DisplaySink::show`]. Nothing reaches the LEDs
//! before `show`, so a viewer never sees a half-drawn frame.

/// Predefined RGB color constants from the `smart_leds` crate.
///
/// Common colors include `RED`, `LIME`, `BLUE`, `YELLOW`, `WHITE`, `BLACK`, `CYAN`, `MAGENTA`, `ORANGE`, `PURPLE`.
#[doc(inline)]
pub use smart_leds::colors;

use core::ops::{Deref, DerefMut};

use smart_leds::{RGB8, SmartLedsWrite};

use crate::{Error, Result};

/// Color of an LED that is off.
pub const OFF: RGB8 = RGB8::new(0, 0, 0);

// ============================================================================
// Display Frame
// ============================================================================

/// One color per LED, in strip order.
///
/// Frames deref to `[RGB8; N]`, so you can read or change pixels directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayFrame<const N: usize>(pub [RGB8; N]);

impl<const N: usize> DisplayFrame<N> {
    /// Number of LEDs in this frame.
    pub const LEN: usize = N;

    /// Create a new blank (all off) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([OFF; N])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: RGB8) -> Self {
        Self([color; N])
    }

    /// Number of LEDs that are not off.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.0.iter().filter(|color| **color != OFF).count()
    }
}

impl<const N: usize> Deref for DisplayFrame<N> {
    type Target = [RGB8; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for DisplayFrame<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> From<[RGB8; N]> for DisplayFrame<N> {
    fn from(array: [RGB8; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> From<DisplayFrame<N>> for [RGB8; N] {
    fn from(frame: DisplayFrame<N>) -> Self {
        frame.0
    }
}

impl<const N: usize> Default for DisplayFrame<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Display Sink
// ============================================================================

/// Something that can show a frame of LED colors.
///
/// `clear_all` and `set` only stage changes; `show` makes them visible all at once.
pub trait DisplaySink {
    /// Stage every LED as off.
    fn clear_all(&mut self);

    /// Stage LED `index` as `color`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the sink has no LED `index`.
    fn set(&mut self, index: u16, color: RGB8) -> Result<()>;

    /// Make the staged frame visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying driver fails.
    async fn show(&mut self) -> Result<()>;
}

fn stage<const N: usize>(frame: &mut DisplayFrame<N>, index: u16, color: RGB8) -> Result<()> {
    let pixel = frame
        .get_mut(usize::from(index))
        .ok_or(Error::IndexOutOfBounds { index, len: N })?;
    *pixel = color;
    Ok(())
}

/// In-memory sink that remembers the last frame shown.
///
/// ```rust
/// use embassy_futures::block_on;
/// use geo_led::led_strip::{DisplaySink, FrameSink, OFF, colors};
///
/// let mut sink = FrameSink::<15>::new();
/// sink.clear_all();
/// sink.set(7, colors::RED)?;
/// assert_eq!(sink.shown()[7], OFF); // not shown yet
///
/// block_on(sink.show())?;
/// assert_eq!(sink.shown()[7], colors::RED);
/// assert_eq!(sink.show_count(), 1);
/// # Ok::<(), geo_led::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct FrameSink<const N: usize> {
    staged: DisplayFrame<N>,
    shown: DisplayFrame<N>,
    show_count: usize,
}

impl<const N: usize> FrameSink<N> {
    /// Create a sink with every LED off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            staged: DisplayFrame::new(),
            shown: DisplayFrame::new(),
            show_count: 0,
        }
    }

    /// The most recently shown frame.
    #[must_use]
    pub const fn shown(&self) -> &DisplayFrame<N> {
        &self.shown
    }

    /// How many times [`DisplaySink::show`] has been called.
    #[must_use]
    pub const fn show_count(&self) -> usize {
        self.show_count
    }
}

impl<const N: usize> DisplaySink for FrameSink<N> {
    fn clear_all(&mut self) {
        self.staged = DisplayFrame::new();
    }

    fn set(&mut self, index: u16, color: RGB8) -> Result<()> {
        stage(&mut self.staged, index, color)
    }

    async fn show(&mut self) -> Result<()> {
        self.shown = self.staged;
        self.show_count = self.show_count.saturating_add(1);
        Ok(())
    }
}

// ============================================================================
// Gamma Correction
// ============================================================================

/// Gamma correction mode for LED strips.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Gamma {
    /// Linear gamma (no correction). Gamma = 1.0
    Linear,
    /// Standard gamma 2.2 correction for perceived brightness.
    #[default]
    Gamma2_2,
}

/// Default gamma correction curve for [`StripSink`] (`Gamma::Gamma2_2`).
pub const GAMMA_DEFAULT: Gamma = Gamma::Gamma2_2;

/// Gamma 2.2 lookup table for 8-bit values.
/// Pre-computed to avoid floating point math: corrected = (value/255)^2.2 * 255
const GAMMA_2_2_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

/// Brightness limit expressed as a current budget.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Current {
    /// Limit brightness to stay within a specific milliamp budget.
    ///
    /// The maximum brightness is chosen so the worst case (all LEDs white at full brightness,
    /// about 60 mA each) stays within this limit. A 15-LED grid draws 900 mA at full
    /// brightness; `Current::Milliamps(90)` caps brightness near 25/255.
    Milliamps(u16),
    /// No limit; brightness stays at 100%.
    Unlimited,
}

impl Default for Current {
    fn default() -> Self {
        MAX_CURRENT_DEFAULT
    }
}

/// Default current budget for [`StripSink`] (`Current::Milliamps(90)`).
pub const MAX_CURRENT_DEFAULT: Current = Current::Milliamps(90);

/// Worst-case draw of one WS2812 LED at full white, in milliamps.
const LED_WORST_CASE_MA: u32 = 60;

impl Current {
    /// Maximum brightness (0–255) that keeps `led_count` LEDs within this budget.
    #[must_use]
    pub const fn max_brightness(self, led_count: usize) -> u8 {
        let worst_case_ma = (led_count as u32) * LED_WORST_CASE_MA;
        match self {
            Self::Milliamps(ma) if worst_case_ma > 0 => {
                let scale = (ma as u32 * 255) / worst_case_ma;
                if scale > 255 { 255 } else { scale as u8 }
            }
            Self::Milliamps(_) | Self::Unlimited => 255,
        }
    }
}

/// Generate a combined gamma correction and brightness scaling lookup table.
///
/// `combo_table[input_value]` gives the value written to the LED.
#[must_use]
pub const fn generate_combo_table(gamma: Gamma, max_brightness: u8) -> [u8; 256] {
    let mut result = [0u8; 256];
    let mut index = 0;
    while index < 256 {
        let gamma_corrected = match gamma {
            Gamma::Linear => index as u8,
            Gamma::Gamma2_2 => GAMMA_2_2_TABLE[index],
        };
        // Apply brightness scaling: (value * brightness) / 255
        let scaled = ((gamma_corrected as u16 * max_brightness as u16) / 255) as u8;
        result[index] = scaled;
        index += 1;
    }
    result
}

fn corrected(color: RGB8, combo_table: &[u8; 256]) -> RGB8 {
    let lookup = |channel: u8| {
        combo_table
            .get(usize::from(channel))
            .copied()
            .unwrap_or(channel)
    };
    RGB8::new(lookup(color.r), lookup(color.g), lookup(color.b))
}

// ============================================================================
// Strip Sink
// ============================================================================

/// Sink that drives a WS2812-style strip of `N` LEDs through a [`SmartLedsWrite`] driver.
///
/// Frames are staged in memory and written on [`DisplaySink::show`], after gamma correction
/// and brightness limiting.
pub struct StripSink<D, const N: usize> {
    driver: D,
    staged: DisplayFrame<N>,
    combo_table: [u8; 256],
}

impl<D, const N: usize> StripSink<D, N>
where
    D: SmartLedsWrite,
    RGB8: Into<D::Color>,
{
    /// Wrap `driver` with the default gamma and current budget.
    #[must_use]
    pub const fn new(driver: D) -> Self {
        Self::with_correction(driver, GAMMA_DEFAULT, MAX_CURRENT_DEFAULT)
    }

    /// Wrap `driver` with an explicit gamma curve and current budget.
    #[must_use]
    pub const fn with_correction(driver: D, gamma: Gamma, max_current: Current) -> Self {
        Self {
            driver,
            staged: DisplayFrame::new(),
            combo_table: generate_combo_table(gamma, max_current.max_brightness(N)),
        }
    }

    /// The wrapped driver.
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Unwrap the driver.
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }
}

impl<D, const N: usize> DisplaySink for StripSink<D, N>
where
    D: SmartLedsWrite,
    RGB8: Into<D::Color>,
{
    fn clear_all(&mut self) {
        self.staged = DisplayFrame::new();
    }

    fn set(&mut self, index: u16, color: RGB8) -> Result<()> {
        stage(&mut self.staged, index, color)
    }

    async fn show(&mut self) -> Result<()> {
        let combo_table = &self.combo_table;
        self.driver
            .write(self.staged.iter().map(|color| corrected(*color, combo_table)))
            .map_err(|_| Error::DisplayWrite)
    }
}
