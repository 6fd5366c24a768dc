//! The fixed set of tracked entities and their display colors.

use heapless::Vec;
use itertools::Itertools;
use smart_leds::RGB8;

use crate::{Error, Result};

/// A tracked entity: a unique name and the color its LED shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    name: &'static str,
    color: RGB8,
}

impl Entity {
    /// Create an entity.
    #[must_use]
    pub const fn new(name: &'static str, color: RGB8) -> Self {
        Self { name, color }
    }

    /// The entity's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The entity's display color.
    #[must_use]
    pub const fn color(&self) -> RGB8 {
        self.color
    }
}

/// Validated list of up to `E` entities, kept in declaration order.
///
/// Declaration order is the order positions are fetched in each cycle, and so the order
/// colors take turns on a shared LED.
///
/// ```rust
/// use geo_led::colors;
/// use geo_led::roster::{Entity, Roster};
///
/// let roster = Roster::<3>::new(&[
///     Entity::new("Thor", colors::LIME),
///     Entity::new("Mira", colors::RED),
///     Entity::new("Stefan", colors::BLUE),
/// ])?;
/// assert_eq!(roster.get("Mira").map(|entity| entity.color()), Some(colors::RED));
/// # Ok::<(), geo_led::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster<const E: usize> {
    entities: Vec<Entity, E>,
}

impl<const E: usize> Roster<E> {
    /// Build a roster.
    ///
    /// # Errors
    ///
    /// Fails if the list is empty or longer than `E`, or if an entity is unnamed, black,
    /// or shares its name or color with another entity.
    pub fn new(entities: &[Entity]) -> Result<Self> {
        if entities.is_empty() {
            return Err(Error::EmptyRoster);
        }

        for entity in entities {
            if entity.name.trim().is_empty() {
                return Err(Error::UnnamedEntity);
            }
            if entity.color == RGB8::default() {
                return Err(Error::MissingColor { name: entity.name });
            }
        }

        for (first, second) in entities.iter().tuple_combinations() {
            if first.name == second.name {
                return Err(Error::DuplicateEntity { name: second.name });
            }
            if first.color == second.color {
                return Err(Error::IndistinguishableColors {
                    first: first.name,
                    second: second.name,
                });
            }
        }

        let entities =
            Vec::from_slice(entities).map_err(|()| Error::TooManyEntities { max: E })?;
        Ok(Self { entities })
    }

    /// Entities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Look up an entity by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always `false`; a roster has at least one entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
