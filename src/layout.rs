//! Serpentine wiring between grid cells and LED strip indices.
//!
//! The panel is one strip snaked across the rows. Row 0 starts at the top-right corner and
//! runs right-to-left, row 1 runs left-to-right, and so on. The direction is fixed by how the
//! strip is soldered; changing it without rewiring the panel lights the wrong LEDs.
//!
//! ```text
//! 5×3 panel, LED index at each (x, y):
//!
//!   LED4  LED3  LED2  LED1  LED0     row 0: right-to-left
//!   LED5  LED6  LED7  LED8  LED9     row 1: left-to-right
//!   LED14 LED13 LED12 LED11 LED10    row 2: right-to-left
//! ```

use crate::geo::{GridCell, GridSize};
use crate::{Error, Result};

/// LED strip index of `cell` on a panel `width` cells wide.
///
/// Panics if `cell.x` is not below `width` or if row `cell.y` lies past the last LED a `u16`
/// can number.
///
/// ```rust
/// use geo_led::geo::GridCell;
/// use geo_led::layout::to_index;
///
/// const CENTER: u16 = to_index(GridCell::new(2, 1), 5);
/// const _: () = assert!(CENTER == 7); // Compile-time assert
/// assert_eq!(to_index(GridCell::new(0, 0), 5), 4);
/// assert_eq!(to_index(GridCell::new(4, 2), 5), 10);
/// ```
#[must_use]
#[allow(clippy::cast_lossless, reason = "u32::from is not const")]
pub const fn to_index(cell: GridCell, width: u16) -> u16 {
    assert!(cell.x < width, "column out of bounds");
    assert!(
        (cell.y as u32 + 1) * width as u32 <= u16::MAX as u32 + 1,
        "row out of bounds"
    );
    let row_start = cell.y * width;
    if cell.y % 2 == 0 {
        // Even row: right-to-left
        row_start + (width - 1 - cell.x)
    } else {
        // Odd row: left-to-right
        row_start + cell.x
    }
}

/// Grid cell wired to LED `index` on a panel `width` cells wide. Inverse of [`to_index`].
///
/// ```rust
/// use geo_led::geo::GridCell;
/// use geo_led::layout::{to_cell, to_index};
///
/// assert_eq!(to_cell(7, 5), GridCell::new(2, 1));
/// assert_eq!(to_index(to_cell(13, 5), 5), 13);
/// ```
#[must_use]
pub const fn to_cell(index: u16, width: u16) -> GridCell {
    assert!(width > 0, "width must be positive");
    let y = index / width;
    let offset = index % width;
    let x = if y % 2 == 0 { width - 1 - offset } else { offset };
    GridCell::new(x, y)
}

/// Check that the wiring maps the cells of `grid` one-to-one onto the `N` LEDs of a strip.
///
/// # Errors
///
/// Returns [`Error::GridSizeMismatch`] if `grid` does not have exactly `N` cells and
/// [`Error::LayoutNotBijective`] if any LED is reached twice or not at all.
pub fn check_bijection<const N: usize>(grid: GridSize) -> Result<()> {
    if grid.len() != N {
        return Err(Error::GridSizeMismatch {
            cells: grid.len(),
            leds: N,
        });
    }

    let mut seen = [false; N];
    for cell in grid.cells() {
        let slot = seen
            .get_mut(usize::from(to_index(cell, grid.width())))
            .ok_or(Error::LayoutNotBijective)?;
        if *slot {
            return Err(Error::LayoutNotBijective);
        }
        *slot = true;
    }

    if seen.iter().all(|covered| *covered) {
        Ok(())
    } else {
        Err(Error::LayoutNotBijective)
    }
}

/// Cell-by-row view of a strip: `rows[y][x]` is the LED index of cell `(x, y)`.
///
/// Useful for drawing a strip-ordered frame as the panel looks.
pub fn index_rows(grid: GridSize) -> impl Iterator<Item = impl Iterator<Item = u16>> {
    let width = grid.width();
    (0..grid.height()).map(move |y| (0..width).map(move |x| to_index(GridCell::new(x, y), width)))
}
