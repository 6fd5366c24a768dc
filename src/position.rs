//! Where entity positions come from.
//!
//! A [`PositionSource`] is asked once per refresh for each entity's current position. Any
//! error means "unavailable this time": the entity is left off that frame and the others are
//! drawn as usual.
//!
//! Sources shipped here:
//! - [`FixedPositions`]: positions held in memory and updated by the caller.
//! - [`FilePositionSource`](file_source::FilePositionSource) (`host` feature): one text file per entity.

#[cfg(feature = "host")]
pub mod file_source;

use heapless::Vec;

use crate::geo::GeoPosition;
use crate::roster::Entity;
use crate::{Error, Result};

/// Something that can report the current position of an entity.
pub trait PositionSource {
    /// Current position of `entity`.
    ///
    /// # Errors
    ///
    /// Any error means the position is unavailable for this refresh.
    async fn position(&mut self, entity: &Entity) -> Result<GeoPosition>;
}

/// A parsed location record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocationRecord<'a> {
    /// The name written in the record.
    pub name: &'a str,
    /// The position written in the record.
    pub position: GeoPosition,
}

/// Parse a location record of the form `Name: latitude, longitude`.
///
/// Whitespace around each part is ignored. The record must contain exactly one `:` and
/// exactly one `,`.
///
/// ```rust
/// use geo_led::geo::GeoPosition;
/// use geo_led::position::parse_location_record;
///
/// let record = parse_location_record("Thor: 55.7438006, 12.5282253")?;
/// assert_eq!(record.name, "Thor");
/// assert_eq!(record.position, GeoPosition::new(55.743_800_6, 12.528_225_3));
///
/// assert!(parse_location_record("Thor 55.7, 12.5").is_err());
/// # Ok::<(), geo_led::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::MalformedLocation`] if the record does not have that shape or either
/// coordinate is not a number.
pub fn parse_location_record(record: &str) -> Result<LocationRecord<'_>> {
    let (name, coordinates) = record.split_once(':').ok_or(Error::MalformedLocation)?;
    let (latitude, longitude) = coordinates
        .split_once(',')
        .ok_or(Error::MalformedLocation)?;
    if coordinates.contains(':') || longitude.contains(',') {
        return Err(Error::MalformedLocation);
    }

    let latitude = latitude
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::MalformedLocation)?;
    let longitude = longitude
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::MalformedLocation)?;

    Ok(LocationRecord {
        name: name.trim(),
        position: GeoPosition::new(latitude, longitude),
    })
}

/// In-memory positions for up to `E` entities, keyed by entity name.
///
/// ```rust
/// use embassy_futures::block_on;
/// use geo_led::colors;
/// use geo_led::geo::GeoPosition;
/// use geo_led::position::{FixedPositions, PositionSource};
/// use geo_led::roster::Entity;
///
/// let thor = Entity::new("Thor", colors::LIME);
/// let mut positions = FixedPositions::<3>::new();
/// assert!(block_on(positions.position(&thor)).is_err());
///
/// positions.set("Thor", GeoPosition::new(55.74, 12.53))?;
/// assert_eq!(block_on(positions.position(&thor))?, GeoPosition::new(55.74, 12.53));
/// # Ok::<(), geo_led::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct FixedPositions<const E: usize> {
    positions: Vec<(&'static str, GeoPosition), E>,
}

impl<const E: usize> FixedPositions<E> {
    /// Create a source with no positions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    /// Set (or replace) the position of entity `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyEntities`] if `E` other entities already have positions.
    pub fn set(&mut self, name: &'static str, position: GeoPosition) -> Result<()> {
        if let Some(slot) = self.positions.iter_mut().find(|(known, _)| *known == name) {
            slot.1 = position;
            return Ok(());
        }
        self.positions
            .push((name, position))
            .map_err(|_| Error::TooManyEntities { max: E })
    }

    /// Forget the position of entity `name`, making it unavailable.
    pub fn clear(&mut self, name: &str) {
        self.positions.retain(|(known, _)| *known != name);
    }
}

impl<const E: usize> PositionSource for FixedPositions<E> {
    async fn position(&mut self, entity: &Entity) -> Result<GeoPosition> {
        self.positions
            .iter()
            .find(|(known, _)| *known == entity.name())
            .map(|(_, position)| *position)
            .ok_or(Error::PositionUnavailable {
                name: entity.name(),
            })
    }
}
