#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for location records and file-backed positions.

use std::error::Error as StdError;
use std::fs;

use embassy_futures::block_on;
use embassy_time::Instant;
use geo_led::geo::{GeoPosition, GridSize, Scale};
use geo_led::led_strip::FrameSink;
use geo_led::position::file_source::FilePositionSource;
use geo_led::position::{PositionSource, parse_location_record};
use geo_led::roster::{Entity, Roster};
use geo_led::tracker::{Tracker, TrackerConfig};
use geo_led::{Error, colors};

const THOR: Entity = Entity::new("Thor", colors::LIME);
const MIRA: Entity = Entity::new("Mira", colors::RED);
const STEFAN: Entity = Entity::new("Stefan", colors::BLUE);

#[test]
fn record_parses_with_loose_whitespace() -> Result<(), Error> {
    let record = parse_location_record("  Mira :55.75 ,   12.5  ")?;
    assert_eq!(record.name, "Mira");
    assert_eq!(record.position, GeoPosition::new(55.75, 12.5));

    let negative = parse_location_record("Stefan: -33.8688, 151.2093")?;
    assert_eq!(negative.position, GeoPosition::new(-33.8688, 151.2093));
    Ok(())
}

#[test]
fn malformed_records_are_rejected() {
    for record in [
        "",
        "Thor",
        "Thor 55.7, 12.5",
        "Thor: 55.7 12.5",
        "Thor: 55.7, 12.5, 3.0",
        "Thor: 55.7: 12.5, 1.0",
        "Thor: north, 12.5",
        "Thor: 55.7, ",
    ] {
        assert_eq!(
            parse_location_record(record),
            Err(Error::MalformedLocation),
            "{record:?}"
        );
    }
}

#[test]
fn file_source_reads_current_file_contents() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let thor_path = dir.path().join("thor_location.txt");
    fs::write(&thor_path, "Thor: 55.7438006, 12.5282253\n")?;

    let mut source = FilePositionSource::new().with_file("Thor", &thor_path);
    assert_eq!(
        block_on(source.position(&THOR))?,
        GeoPosition::new(55.743_800_6, 12.528_225_3)
    );

    // Files are read again on every lookup.
    fs::write(&thor_path, "Thor: 55.80, 12.60")?;
    assert_eq!(
        block_on(source.position(&THOR))?,
        GeoPosition::new(55.80, 12.60)
    );
    Ok(())
}

#[test]
fn name_inside_the_record_is_not_checked() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mira_position.txt");
    fs::write(&path, "Someone else: 1.5, 2.5")?;

    let mut source = FilePositionSource::new().with_file("Mira", &path);
    assert_eq!(block_on(source.position(&MIRA))?, GeoPosition::new(1.5, 2.5));
    Ok(())
}

#[test]
fn missing_or_bad_files_are_unavailable() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let garbled = dir.path().join("stefan_location.txt");
    fs::write(&garbled, "not a location")?;

    let mut source = FilePositionSource::new()
        .with_file("Thor", dir.path().join("does_not_exist.txt"))
        .with_file("Stefan", &garbled);

    assert_eq!(
        block_on(source.position(&THOR)),
        Err(Error::PositionUnavailable { name: "Thor" })
    );
    assert_eq!(
        block_on(source.position(&MIRA)),
        Err(Error::PositionUnavailable { name: "Mira" })
    );
    assert_eq!(
        block_on(source.position(&STEFAN)),
        Err(Error::MalformedLocation)
    );
    Ok(())
}

#[test]
fn with_file_replaces_an_earlier_path() {
    let source = FilePositionSource::new()
        .with_file("Thor", "a.txt")
        .with_file("Mira", "b.txt")
        .with_file("Thor", "c.txt");
    assert_eq!(source.len(), 2);
    assert_eq!(
        source.path("Thor").and_then(|path| path.to_str()),
        Some("c.txt")
    );
    assert!(source.path("Stefan").is_none());
}

#[test]
fn tracker_refreshes_from_files() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let thor_path = dir.path().join("thor_location.txt");
    let stefan_path = dir.path().join("stefan_location.txt");
    fs::write(&thor_path, "Thor: 55.7438006, 12.5282253")?;
    fs::write(&stefan_path, "Stefan: 55.7438006, 12.5837809")?; // two cells east

    let mut source = FilePositionSource::new()
        .with_file("Thor", &thor_path)
        .with_file("Mira", dir.path().join("mira_position.txt"))
        .with_file("Stefan", &stefan_path);

    let config = TrackerConfig::new(
        GridSize::new(5, 3)?,
        GeoPosition::new(55.743_800_6, 12.528_225_3),
        Scale::degrees_per_cell(1.0 / 36.0)?,
        Roster::new(&[THOR, MIRA, STEFAN])?,
    )?;
    let mut tracker = Tracker::<15, 3>::new(config)?;
    let mut sink = FrameSink::<15>::new();

    let report = block_on(tracker.refresh(&mut source, &mut sink, Instant::from_secs(0)))?;

    assert_eq!(report.absent(), &["Mira"]);
    assert_eq!(sink.shown()[7], colors::LIME);
    assert_eq!(sink.shown()[9], colors::BLUE);
    assert_eq!(sink.shown().lit_count(), 2);
    Ok(())
}
