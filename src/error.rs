//! Crate-wide error type.

use derive_more::{Display, Error};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong while configuring or running a tracker.
///
/// Configuration errors come out of constructors ([`GridSize::new`](crate::geo::GridSize::new),
/// [`Roster::new`](crate::roster::Roster::new), [`Tracker::new`](crate::tracker::Tracker::new), ...),
/// so a tracker with bad settings can never be built.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Grid width or height is zero.
    #[display("grid width and height must both be at least 1")]
    EmptyGrid,

    /// Grid has more cells than a `u16` LED index can address.
    #[display("grid of {width}x{height} cells is too large to address")]
    GridTooLarge {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },

    /// Grid cell count does not match the LED count of the strip.
    #[display("grid has {cells} cells but the strip has {leds} LEDs")]
    GridSizeMismatch {
        /// Cells in the configured grid.
        cells: usize,
        /// LEDs in the strip.
        leds: usize,
    },

    /// The serpentine wiring does not map every cell to exactly one LED.
    #[display("LED wiring does not cover every cell exactly once")]
    LayoutNotBijective,

    /// Distance scale is zero, negative, or not finite.
    #[display("scale must be a positive, finite number of degrees per cell")]
    InvalidScale,

    /// Reference point is not a valid latitude/longitude.
    #[display("reference point is not a valid latitude/longitude")]
    InvalidReference,

    /// Refresh interval is zero.
    #[display("refresh interval must be longer than zero")]
    ZeroRefreshInterval,

    /// Roster has no entities.
    #[display("roster must list at least one entity")]
    EmptyRoster,

    /// More entities than the fixed capacity.
    #[display("too many entities (at most {max})")]
    TooManyEntities {
        /// Capacity.
        max: usize,
    },

    /// An entity has an empty name.
    #[display("every entity needs a name")]
    UnnamedEntity,

    /// Two entities share a name, or one entity was placed twice.
    #[display("entity '{name}' appears more than once")]
    DuplicateEntity {
        /// The repeated name.
        name: &'static str,
    },

    /// An entity's color is black, which the strip shows as off.
    #[display("entity '{name}' has no color (black is off)")]
    MissingColor {
        /// The entity without a color.
        name: &'static str,
    },

    /// Two entities share a color and could not be told apart.
    #[display("entities '{first}' and '{second}' have the same color")]
    IndistinguishableColors {
        /// First entity.
        first: &'static str,
        /// Second entity.
        second: &'static str,
    },

    /// LED index is past the end of the strip.
    #[display("LED index {index} is outside a strip of {len} LEDs")]
    IndexOutOfBounds {
        /// Requested index.
        index: u16,
        /// Strip length.
        len: usize,
    },

    /// No position for this entity this cycle.
    #[display("position of '{name}' is unavailable")]
    PositionUnavailable {
        /// The entity.
        name: &'static str,
    },

    /// A location record could not be parsed.
    #[display("location record must look like 'Name: latitude, longitude'")]
    MalformedLocation,

    /// The LED driver rejected a frame.
    #[display("LED driver failed to write the frame")]
    DisplayWrite,
}
