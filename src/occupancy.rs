//! Grouping of entities that land on the same LED.

use heapless::Vec;

use crate::geo::{GridCell, GridSize};
use crate::layout::to_index;
use crate::roster::Entity;
use crate::{Error, Result};

/// The entities sharing one LED, in the order they were placed. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGroup<const E: usize> {
    index: u16,
    occupants: Vec<Entity, E>,
}

impl<const E: usize> OccupancyGroup<E> {
    /// LED index of the group.
    #[must_use]
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Occupants in placement order.
    #[must_use]
    pub fn occupants(&self) -> &[Entity] {
        &self.occupants
    }

    /// `true` if more than one entity is on this LED.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.occupants.len() > 1
    }
}

/// Sparse map from LED index to the entities on it, for a strip of `N` LEDs and at most `E`
/// entities. Only occupied LEDs have a group; groups are kept in order of first occupancy.
///
/// ```rust
/// use geo_led::colors;
/// use geo_led::geo::{GridCell, GridSize};
/// use geo_led::occupancy::Occupancy;
/// use geo_led::roster::Entity;
///
/// let thor = Entity::new("Thor", colors::LIME);
/// let mira = Entity::new("Mira", colors::RED);
/// let grid = GridSize::new(5, 3)?;
///
/// let occupancy = Occupancy::<15, 3>::aggregate(
///     [(thor, GridCell::new(2, 1)), (mira, GridCell::new(2, 1))],
///     grid,
/// )?;
/// assert_eq!(occupancy.len(), 1);
/// assert_eq!(occupancy.get(7).map(|group| group.occupants()), Some(&[thor, mira][..]));
/// # Ok::<(), geo_led::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy<const N: usize, const E: usize> {
    groups: Vec<OccupancyGroup<E>, N>,
}

impl<const N: usize, const E: usize> Occupancy<N, E> {
    /// An occupancy with no groups.
    #[must_use]
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Group placed entities by the LED their cell is wired to.
    ///
    /// # Errors
    ///
    /// See [`Occupancy::insert`]. A cell outside `grid` is reported as
    /// [`Error::IndexOutOfBounds`].
    pub fn aggregate<I>(placements: I, grid: GridSize) -> Result<Self>
    where
        I: IntoIterator<Item = (Entity, GridCell)>,
    {
        let mut occupancy = Self::new();
        for (entity, cell) in placements {
            if !grid.contains(cell) {
                return Err(Error::IndexOutOfBounds {
                    index: cell.y.saturating_mul(grid.width()).saturating_add(cell.x),
                    len: N,
                });
            }
            occupancy.insert(entity, to_index(cell, grid.width()))?;
        }
        Ok(occupancy)
    }

    /// Add `entity` to the group at LED `index`, creating the group if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not below `N`,
    /// [`Error::DuplicateEntity`] if the entity was already placed, and
    /// [`Error::TooManyEntities`] if a group is full.
    pub fn insert(&mut self, entity: Entity, index: u16) -> Result<()> {
        if usize::from(index) >= N {
            return Err(Error::IndexOutOfBounds { index, len: N });
        }
        if self
            .groups
            .iter()
            .flat_map(|group| group.occupants.iter())
            .any(|placed| placed.name() == entity.name())
        {
            return Err(Error::DuplicateEntity {
                name: entity.name(),
            });
        }

        if let Some(group) = self.groups.iter_mut().find(|group| group.index == index) {
            return group
                .occupants
                .push(entity)
                .map_err(|_| Error::TooManyEntities { max: E });
        }

        let mut occupants = Vec::new();
        occupants
            .push(entity)
            .map_err(|_| Error::TooManyEntities { max: E })?;
        self.groups
            .push(OccupancyGroup { index, occupants })
            .map_err(|_| Error::IndexOutOfBounds { index, len: N })
    }

    /// The group at LED `index`, if any entity is there.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&OccupancyGroup<E>> {
        self.groups.iter().find(|group| group.index == index)
    }

    /// Occupied LEDs in order of first occupancy.
    pub fn iter(&self) -> impl Iterator<Item = &OccupancyGroup<E>> {
        self.groups.iter()
    }

    /// Number of occupied LEDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` if no LED is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<const N: usize, const E: usize> Default for Occupancy<N, E> {
    fn default() -> Self {
        Self::new()
    }
}
