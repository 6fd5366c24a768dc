#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Host-level tests for configuring a tracker and running refresh cycles.

use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use geo_led::geo::{GeoPosition, GridSize, Scale};
use geo_led::led_strip::{DisplaySink, FrameSink, OFF};
use geo_led::position::{FixedPositions, PositionSource};
use geo_led::roster::{Entity, Roster};
use geo_led::tracker::{
    REFRESH_INTERVAL_DEFAULT, RefreshState, ShutdownSignal, Tracker, TrackerConfig,
};
use geo_led::{Error, colors};
use smart_leds::RGB8;

const REFERENCE: GeoPosition = GeoPosition::new(55.743_800_6, 12.528_225_3);
const CELL: f64 = 1.0 / 36.0;

const THOR: Entity = Entity::new("Thor", colors::LIME);
const MIRA: Entity = Entity::new("Mira", colors::RED);
const STEFAN: Entity = Entity::new("Stefan", colors::BLUE);

fn config() -> TrackerConfig<3> {
    TrackerConfig::new(
        GridSize::new(5, 3).expect("5x3 is a valid grid"),
        REFERENCE,
        Scale::degrees_per_cell(CELL).expect("valid scale"),
        Roster::new(&[THOR, MIRA, STEFAN]).expect("valid roster"),
    )
    .expect("valid config")
}

fn tracker() -> Tracker<15, 3> {
    Tracker::new(config()).expect("15 LEDs match a 5x3 grid")
}

fn offset(cells_north: f64, cells_east: f64) -> GeoPosition {
    GeoPosition::new(
        REFERENCE.latitude + cells_north * CELL,
        REFERENCE.longitude + cells_east * CELL,
    )
}

#[test]
fn refresh_lights_each_placed_entity() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut positions = FixedPositions::<3>::new();
    positions.set("Thor", REFERENCE)?;
    positions.set("Stefan", offset(1.0, 1.0))?;
    let mut sink = FrameSink::<15>::new();

    let report = block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(0)))?;

    // Thor is at (2, 1) -> LED 7; Stefan is at (3, 0) -> LED 1.
    assert_eq!(sink.shown()[7], colors::LIME);
    assert_eq!(sink.shown()[1], colors::BLUE);
    assert_eq!(sink.shown().lit_count(), 2);
    assert_eq!(sink.show_count(), 1);

    assert_eq!(report.placed(), &["Thor", "Stefan"]);
    assert_eq!(report.absent(), &["Mira"]);
    assert_eq!(report.lit(), 2);
    assert_eq!(report.shared(), 0);
    assert_eq!(tracker.state(), RefreshState::Idle);
    Ok(())
}

#[test]
fn shared_led_alternates_between_refreshes() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut positions = FixedPositions::<3>::new();
    positions.set("Thor", offset(-1.0, -2.0))?;
    positions.set("Mira", offset(-1.2, -1.9))?;
    let mut sink = FrameSink::<15>::new();

    // Both are at (0, 2) -> LED 14.
    let report = block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(20)))?;
    assert_eq!(report.shared(), 1);
    assert_eq!(sink.shown()[14], colors::LIME);

    block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(21)))?;
    assert_eq!(sink.shown()[14], colors::RED);

    block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(22)))?;
    assert_eq!(sink.shown()[14], colors::LIME);
    assert_eq!(sink.shown().lit_count(), 1);
    Ok(())
}

#[test]
fn render_is_deterministic_within_a_second() -> Result<(), Error> {
    let tracker = tracker();
    let positions = [(THOR, REFERENCE), (MIRA, REFERENCE), (STEFAN, offset(-1.0, 0.0))];

    let first = tracker.render(positions, Instant::from_millis(7_000))?;
    let again = tracker.render(positions, Instant::from_millis(7_900))?;
    assert_eq!(first, again);
    assert_eq!(first[7], colors::RED); // second 7 is odd: Mira's turn
    assert_eq!(first[12], colors::BLUE);
    Ok(())
}

#[test]
fn entity_moving_away_leaves_its_old_led_dark() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut positions = FixedPositions::<3>::new();
    let mut sink = FrameSink::<15>::new();

    positions.set("Mira", REFERENCE)?;
    block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(0)))?;
    assert_eq!(sink.shown()[7], colors::RED);

    positions.set("Mira", offset(0.0, 2.0))?;
    block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(5)))?;
    assert_eq!(sink.shown()[7], OFF);
    assert_eq!(sink.shown()[9], colors::RED);

    positions.clear("Mira");
    let report = block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(10)))?;
    assert_eq!(sink.shown().lit_count(), 0);
    assert_eq!(report.absent(), &["Thor", "Mira", "Stefan"]);
    Ok(())
}

#[test]
fn invalid_positions_are_skipped() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut positions = FixedPositions::<3>::new();
    positions.set("Thor", GeoPosition::new(123.0, 0.0))?;
    positions.set("Mira", GeoPosition::new(f64::NAN, 12.5))?;
    positions.set("Stefan", REFERENCE)?;
    let mut sink = FrameSink::<15>::new();

    let report = block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(0)))?;

    assert_eq!(report.placed(), &["Stefan"]);
    assert_eq!(report.absent(), &["Thor", "Mira"]);
    assert_eq!(sink.shown()[7], colors::BLUE);
    assert_eq!(sink.shown().lit_count(), 1);
    Ok(())
}

/// Source where every lookup fails.
struct Offline;

impl PositionSource for Offline {
    async fn position(&mut self, entity: &Entity) -> Result<GeoPosition, Error> {
        Err(Error::PositionUnavailable {
            name: entity.name(),
        })
    }
}

#[test]
fn all_sources_failing_still_shows_a_blank_frame() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut sink = FrameSink::<15>::new();
    let report = block_on(tracker.refresh(&mut Offline, &mut sink, Instant::from_secs(0)))?;
    assert_eq!(sink.show_count(), 1);
    assert_eq!(sink.shown().lit_count(), 0);
    assert_eq!(report.lit(), 0);
    assert!(report.placed().is_empty());
    Ok(())
}

/// Sink whose driver always fails.
#[derive(Default)]
struct BrokenSink {
    cleared: bool,
    set_calls: usize,
}

impl DisplaySink for BrokenSink {
    fn clear_all(&mut self) {
        self.cleared = true;
    }

    fn set(&mut self, _index: u16, _color: RGB8) -> Result<(), Error> {
        self.set_calls += 1;
        Ok(())
    }

    async fn show(&mut self) -> Result<(), Error> {
        Err(Error::DisplayWrite)
    }
}

#[test]
fn sink_errors_propagate_and_leave_tracker_idle() {
    let mut tracker = tracker();
    let mut positions = FixedPositions::<3>::new();
    let mut sink = BrokenSink::default();

    let result = block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(0)));

    assert_eq!(result, Err(Error::DisplayWrite));
    assert_eq!(tracker.state(), RefreshState::Idle);
    assert!(sink.cleared);
    assert_eq!(sink.set_calls, 15);
}

#[test]
fn run_does_nothing_once_shutdown_is_signaled() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut positions = FixedPositions::<3>::new();
    let mut sink = FrameSink::<15>::new();
    let shutdown = ShutdownSignal::new();
    shutdown.signal(());

    block_on(tracker.run(&mut positions, &mut sink, &shutdown))?;

    assert_eq!(sink.show_count(), 0);
    assert_eq!(tracker.state(), RefreshState::Idle);
    Ok(())
}

/// Source that asks the tracker to stop the first time it is queried.
struct StopAfterFirstLookup<'a> {
    shutdown: &'a ShutdownSignal,
    lookups: usize,
}

impl PositionSource for StopAfterFirstLookup<'_> {
    async fn position(&mut self, _entity: &Entity) -> Result<GeoPosition, Error> {
        self.lookups += 1;
        self.shutdown.signal(());
        Ok(REFERENCE)
    }
}

#[test]
fn run_finishes_the_current_refresh_then_stops() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut sink = FrameSink::<15>::new();
    let shutdown = ShutdownSignal::new();
    let mut source = StopAfterFirstLookup {
        shutdown: &shutdown,
        lookups: 0,
    };

    block_on(tracker.run(&mut source, &mut sink, &shutdown))?;

    assert_eq!(source.lookups, 3);
    assert_eq!(sink.show_count(), 1);
    assert_eq!(sink.shown().lit_count(), 1);
    assert_eq!(tracker.state(), RefreshState::Idle);
    Ok(())
}

/// Source that is offline and asks the tracker to stop after the first refresh.
struct OfflineThenStop<'a> {
    shutdown: &'a ShutdownSignal,
}

impl PositionSource for OfflineThenStop<'_> {
    async fn position(&mut self, entity: &Entity) -> Result<GeoPosition, Error> {
        self.shutdown.signal(());
        Offline.position(entity).await
    }
}

#[test]
fn run_reports_absent_entities() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut sink = FrameSink::<15>::new();
    let shutdown = ShutdownSignal::new();
    let mut source = OfflineThenStop {
        shutdown: &shutdown,
    };
    assert!(tracker.last_report().absent().is_empty());

    let mut absent_per_refresh = Vec::new();
    block_on(tracker.run_with(&mut source, &mut sink, &shutdown, |report| {
        absent_per_refresh.push(report.absent().to_vec());
    }))?;

    assert_eq!(absent_per_refresh, [vec!["Thor", "Mira", "Stefan"]]);
    assert_eq!(tracker.last_report().absent(), &["Thor", "Mira", "Stefan"]);
    assert!(tracker.last_report().placed().is_empty());
    assert_eq!(sink.shown().lit_count(), 0);
    Ok(())
}

#[test]
fn last_report_keeps_the_latest_successful_refresh() -> Result<(), Error> {
    let mut tracker = tracker();
    let mut positions = FixedPositions::<3>::new();
    positions.set("Mira", REFERENCE)?;

    let mut sink = FrameSink::<15>::new();
    block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(0)))?;
    assert_eq!(tracker.last_report().placed(), &["Mira"]);
    assert_eq!(tracker.last_report().absent(), &["Thor", "Stefan"]);

    positions.set("Thor", REFERENCE)?;
    let mut broken = BrokenSink::default();
    let failed = block_on(tracker.refresh(&mut positions, &mut broken, Instant::from_secs(1)));
    assert_eq!(failed, Err(Error::DisplayWrite));
    assert_eq!(tracker.last_report().placed(), &["Mira"]);
    Ok(())
}

#[test]
fn tracker_needs_one_led_per_cell() {
    assert_eq!(
        Tracker::<16, 3>::new(config()).map(|_| ()),
        Err(Error::GridSizeMismatch {
            cells: 15,
            leds: 16
        })
    );
}

#[test]
fn config_defaults_and_validation() -> Result<(), Error> {
    let config = config();
    assert_eq!(config.refresh_interval(), REFRESH_INTERVAL_DEFAULT);
    assert_eq!(REFRESH_INTERVAL_DEFAULT, Duration::from_secs(5));
    assert_eq!(config.grid(), GridSize::new(5, 3)?);
    assert_eq!(config.reference(), REFERENCE);
    assert_eq!(config.roster().len(), 3);

    let faster = config.clone().with_refresh_interval(Duration::from_millis(250))?;
    assert_eq!(faster.refresh_interval(), Duration::from_millis(250));
    assert_eq!(
        config.with_refresh_interval(Duration::from_ticks(0)),
        Err(Error::ZeroRefreshInterval)
    );

    assert_eq!(
        TrackerConfig::new(
            GridSize::new(5, 3)?,
            GeoPosition::new(91.0, 0.0),
            Scale::degrees_per_cell(CELL)?,
            Roster::<3>::new(&[THOR])?,
        ),
        Err(Error::InvalidReference)
    );
    Ok(())
}

#[test]
fn roster_validation() {
    assert_eq!(Roster::<3>::new(&[]), Err(Error::EmptyRoster));
    assert_eq!(
        Roster::<3>::new(&[Entity::new("  ", colors::RED)]),
        Err(Error::UnnamedEntity)
    );
    assert_eq!(
        Roster::<3>::new(&[Entity::new("Ghost", colors::BLACK)]),
        Err(Error::MissingColor { name: "Ghost" })
    );
    assert_eq!(
        Roster::<3>::new(&[THOR, Entity::new("Thor", colors::ORANGE)]),
        Err(Error::DuplicateEntity { name: "Thor" })
    );
    assert_eq!(
        Roster::<3>::new(&[THOR, Entity::new("Twin", colors::LIME)]),
        Err(Error::IndistinguishableColors {
            first: "Thor",
            second: "Twin"
        })
    );
    assert_eq!(
        Roster::<2>::new(&[THOR, MIRA, STEFAN]),
        Err(Error::TooManyEntities { max: 2 })
    );

    let roster = Roster::<4>::new(&[STEFAN, THOR]).expect("valid roster");
    let names: Vec<&str> = roster.iter().map(Entity::name).collect();
    assert_eq!(names, ["Stefan", "Thor"]);
    assert_eq!(roster.get("Thor"), Some(&THOR));
    assert_eq!(roster.get("Mira"), None);
}
