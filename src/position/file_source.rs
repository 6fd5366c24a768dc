//! Positions read from one text file per entity.

use std::fs;
use std::path::{Path, PathBuf};

use super::{PositionSource, parse_location_record};
use crate::geo::GeoPosition;
use crate::roster::Entity;
use crate::{Error, Result};

/// Reads each entity's position from its own file on every refresh.
///
/// Each file holds a single record, `Name: latitude, longitude`, as written by whatever
/// collects the positions. A missing, unreadable, or malformed file makes that entity
/// unavailable for the refresh; the file is simply read again next time.
///
/// ```rust,no_run
/// use geo_led::position::file_source::FilePositionSource;
///
/// let source = FilePositionSource::new()
///     .with_file("Thor", "thor_location.txt")
///     .with_file("Mira", "mira_position.txt");
/// assert_eq!(source.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct FilePositionSource {
    files: Vec<(&'static str, PathBuf)>,
}

impl FilePositionSource {
    /// Create a source with no files.
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Read entity `name`'s position from `path`. A later call for the same name replaces
    /// the path.
    #[must_use]
    pub fn with_file(mut self, name: &'static str, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if let Some(slot) = self.files.iter_mut().find(|(known, _)| *known == name) {
            slot.1 = path;
        } else {
            self.files.push((name, path));
        }
        self
    }

    /// The file for entity `name`, if one was given.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, path)| path.as_path())
    }

    /// Number of entities with a file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` if no files were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl PositionSource for FilePositionSource {
    async fn position(&mut self, entity: &Entity) -> Result<GeoPosition> {
        let unavailable = Error::PositionUnavailable {
            name: entity.name(),
        };
        let path = self.path(entity.name()).ok_or(unavailable)?;
        let contents = fs::read_to_string(path).map_err(|_| unavailable)?;
        let record = parse_location_record(contents.trim())?;
        Ok(record.position)
    }
}
