//! Projection of latitude/longitude onto a small rectangular grid.
//!
//! The projection is a flat, local approximation around a reference point: one grid cell
//! spans a fixed number of degrees in both directions. There is no spherical correction, so it
//! only makes sense for areas a few cells across.
//!
//! ```text
//! 5×3 grid, reference point in the middle cell:
//!
//!            lon -   lon +
//!   lat +   (0,0) (1,0) (2,0) (3,0) (4,0)
//!           (0,1) (1,1) [2,1] (3,1) (4,1)
//!   lat -   (0,2) (1,2) (2,2) (3,2) (4,2)
//! ```

use crate::{Error, Result};

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPosition {
    /// Degrees north of the equator (negative is south).
    pub latitude: f64,
    /// Degrees east of Greenwich (negative is west).
    pub longitude: f64,
}

impl GeoPosition {
    /// Create a position from latitude and longitude in decimal degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `true` if both coordinates are finite and within their geographic ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Degrees of latitude (and of longitude) covered by one grid cell.
///
/// ```rust
/// use geo_led::geo::Scale;
///
/// let scale = Scale::cells_per_degree(36.0)?;
/// assert_eq!(scale, Scale::degrees_per_cell(1.0 / 36.0)?);
/// # Ok::<(), geo_led::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale(f64);

impl Scale {
    /// Scale from the number of degrees one cell spans.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] unless `degrees` is positive and finite.
    pub fn degrees_per_cell(degrees: f64) -> Result<Self> {
        if degrees.is_finite() && degrees > 0.0 {
            Ok(Self(degrees))
        } else {
            Err(Error::InvalidScale)
        }
    }

    /// Scale from the number of cells per degree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] unless `cells` is positive and finite.
    pub fn cells_per_degree(cells: f64) -> Result<Self> {
        if cells.is_finite() && cells > 0.0 {
            Self::degrees_per_cell(1.0 / cells)
        } else {
            Err(Error::InvalidScale)
        }
    }

    /// Degrees spanned by one cell.
    #[must_use]
    pub const fn degrees(self) -> f64 {
        self.0
    }
}

/// A cell of the grid. `(0, 0)` is the top-left corner, `x` grows to the right and `y` grows
/// downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
}

impl GridCell {
    /// Create a cell from column and row.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Width and height of the LED grid, both at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    width: u16,
    height: u16,
}

impl GridSize {
    /// Create a grid size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGrid`] if either dimension is zero, and
    /// [`Error::GridTooLarge`] if the cells cannot all be numbered with a `u16`.
    pub const fn new(width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyGrid);
        }
        if (width as u32) * (height as u32) > u16::MAX as u32 {
            return Err(Error::GridTooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(self) -> u16 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(self) -> u16 {
        self.height
    }

    /// Number of cells (and of LEDs).
    #[must_use]
    pub const fn len(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Always `false`; a grid has at least one cell.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// `true` if `cell` lies inside the grid.
    #[must_use]
    pub const fn contains(self, cell: GridCell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Every cell, row by row from the top-left corner.
    pub fn cells(self) -> impl Iterator<Item = GridCell> {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| GridCell::new(x, y)))
    }
}

/// Project `position` onto `grid`, with `reference` landing in the center cell.
///
/// Moving north moves toward row 0 and moving east moves toward the last column. Offsets are
/// rounded to the nearest cell with ties going to the even cell (so `2.5` becomes `2` and
/// `3.5` becomes `4`). Positions beyond the grid saturate to the nearest edge cell; this
/// function never fails.
///
/// ```rust
/// use geo_led::geo::{GeoPosition, GridCell, GridSize, Scale, project};
///
/// let reference = GeoPosition::new(55.743_800_6, 12.528_225_3);
/// let scale = Scale::degrees_per_cell(1.0 / 36.0)?;
/// let grid = GridSize::new(5, 3)?;
///
/// assert_eq!(project(reference, reference, scale, grid), GridCell::new(2, 1));
///
/// let far_north_east = GeoPosition::new(80.0, 100.0);
/// assert_eq!(project(far_north_east, reference, scale, grid), GridCell::new(4, 0));
/// # Ok::<(), geo_led::Error>(())
/// ```
#[must_use]
pub fn project(
    position: GeoPosition,
    reference: GeoPosition,
    scale: Scale,
    grid: GridSize,
) -> GridCell {
    let offset_x = (position.longitude - reference.longitude) / scale.degrees();
    let offset_y = (position.latitude - reference.latitude) / scale.degrees();

    let center_x = f64::from(grid.width - 1) / 2.0;
    let center_y = f64::from(grid.height - 1) / 2.0;

    let x = round_half_even(offset_x + center_x);
    let y = round_half_even(center_y - offset_y);

    GridCell::new(saturate(x, grid.width), saturate(y, grid.height))
}

/// Round to the nearest integer, ties to even. `as` saturates at the `i64` range and maps NaN
/// to zero, so any input yields some integer.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp,
    reason = "saturating float-to-int conversion; ties are exact halves"
)]
fn round_half_even(value: f64) -> i64 {
    let truncated = value as i64;
    let floor = if (truncated as f64) > value {
        truncated.saturating_sub(1)
    } else {
        truncated
    };
    let remainder = value - floor as f64;
    if remainder > 0.5 || (remainder == 0.5 && floor % 2 != 0) {
        floor.saturating_add(1)
    } else {
        floor
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped into 0..extent first"
)]
fn saturate(value: i64, extent: u16) -> u16 {
    value.clamp(0, i64::from(extent - 1)) as u16
}
