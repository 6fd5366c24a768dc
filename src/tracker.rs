//! The refresh cycle: fetch positions, place entities on the grid, and show one frame.
//!
//! A [`Tracker`] is either [`Idle`](RefreshState::Idle), waiting for the next refresh, or
//! [`Rendering`](RefreshState::Rendering) a frame. Each refresh:
//!
//! 1. asks the [`PositionSource`] for every entity, in roster order, skipping any that are
//!    unavailable or report an impossible position;
//! 2. projects each position to a grid cell and groups entities by LED;
//! 3. resolves a color for every occupied LED (all other LEDs are off);
//! 4. hands the whole frame to the [`DisplaySink`]: clear, set every LED, show.
//!
//! [`Tracker::run`] repeats this every refresh interval until a shutdown is signaled.
//!
//! # Example
//!
//! ```rust
//! use embassy_futures::block_on;
//! use embassy_time::Instant;
//! use geo_led::colors;
//! use geo_led::geo::{GeoPosition, GridSize, Scale};
//! use geo_led::led_strip::FrameSink;
//! use geo_led::position::FixedPositions;
//! use geo_led::roster::{Entity, Roster};
//! use geo_led::tracker::{Tracker, TrackerConfig};
//!
//! let reference = GeoPosition::new(55.743_800_6, 12.528_225_3);
//! let roster = Roster::<3>::new(&[
//!     Entity::new("Thor", colors::LIME),
//!     Entity::new("Mira", colors::RED),
//!     Entity::new("Stefan", colors::BLUE),
//! ])?;
//! let config = TrackerConfig::new(
//!     GridSize::new(5, 3)?,
//!     reference,
//!     Scale::degrees_per_cell(1.0 / 36.0)?,
//!     roster,
//! )?;
//! let mut tracker = Tracker::<15, 3>::new(config)?;
//!
//! let mut positions = FixedPositions::<3>::new();
//! positions.set("Thor", reference)?;
//! positions.set("Mira", reference)?;
//!
//! let mut sink = FrameSink::<15>::new();
//! let report = block_on(tracker.refresh(&mut positions, &mut sink, Instant::from_secs(11)))?;
//!
//! assert_eq!(sink.shown()[7], colors::RED); // Thor and Mira share LED 7; second 11 is Mira's
//! assert_eq!(report.absent(), &["Stefan"]);
//! # Ok::<(), geo_led::Error>(())
//! ```

use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

use crate::arbiter::resolve;
use crate::geo::{GeoPosition, GridCell, GridSize, Scale, project};
use crate::layout::check_bijection;
use crate::led_strip::{DisplayFrame, DisplaySink};
use crate::occupancy::Occupancy;
use crate::position::PositionSource;
use crate::roster::{Entity, Roster};
use crate::{Error, Result};

/// Default time between refreshes (5 seconds).
pub const REFRESH_INTERVAL_DEFAULT: Duration = Duration::from_secs(5);

/// Signal used to stop [`Tracker::run`].
pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

/// Validated settings for a [`Tracker`] with up to `E` entities.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig<const E: usize> {
    grid: GridSize,
    reference: GeoPosition,
    scale: Scale,
    refresh_interval: Duration,
    roster: Roster<E>,
}

impl<const E: usize> TrackerConfig<E> {
    /// Settings with the [default refresh interval](REFRESH_INTERVAL_DEFAULT).
    ///
    /// `reference` is the position shown in the center cell; `scale` is how many degrees one
    /// cell spans.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if `reference` is not a valid position.
    pub fn new(
        grid: GridSize,
        reference: GeoPosition,
        scale: Scale,
        roster: Roster<E>,
    ) -> Result<Self> {
        if !reference.is_valid() {
            return Err(Error::InvalidReference);
        }
        Ok(Self {
            grid,
            reference,
            scale,
            refresh_interval: REFRESH_INTERVAL_DEFAULT,
            roster,
        })
    }

    /// Replace the refresh interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroRefreshInterval`] if `refresh_interval` is zero.
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Result<Self> {
        if refresh_interval == Duration::from_ticks(0) {
            return Err(Error::ZeroRefreshInterval);
        }
        self.refresh_interval = refresh_interval;
        Ok(self)
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Position shown in the center cell.
    #[must_use]
    pub const fn reference(&self) -> GeoPosition {
        self.reference
    }

    /// Degrees per cell.
    #[must_use]
    pub const fn scale(&self) -> Scale {
        self.scale
    }

    /// Time between refreshes.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Tracked entities.
    #[must_use]
    pub const fn roster(&self) -> &Roster<E> {
        &self.roster
    }
}

/// What a [`Tracker`] is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshState {
    /// Waiting for the next refresh.
    Idle,
    /// Fetching positions and drawing a frame.
    Rendering,
}

/// Summary of one refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport<const E: usize> {
    placed: Vec<&'static str, E>,
    absent: Vec<&'static str, E>,
    lit: usize,
    shared: usize,
}

impl<const E: usize> FrameReport<E> {
    /// Entities drawn this refresh, in roster order.
    #[must_use]
    pub fn placed(&self) -> &[&'static str] {
        &self.placed
    }

    /// Entities left off this refresh because their position was unavailable or invalid.
    #[must_use]
    pub fn absent(&self) -> &[&'static str] {
        &self.absent
    }

    /// Number of LEDs lit.
    #[must_use]
    pub const fn lit(&self) -> usize {
        self.lit
    }

    /// Number of LEDs shared by more than one entity.
    #[must_use]
    pub const fn shared(&self) -> usize {
        self.shared
    }
}

/// Draws the positions of up to `E` entities on a grid of `N` LEDs.
///
/// See the [module documentation](mod@crate::tracker) for an example.
#[derive(Clone, Debug)]
pub struct Tracker<const N: usize, const E: usize> {
    config: TrackerConfig<E>,
    state: RefreshState,
    last_report: FrameReport<E>,
}

impl<const N: usize, const E: usize> Tracker<N, E> {
    /// Create an idle tracker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GridSizeMismatch`] if the grid does not have exactly `N` cells, and
    /// [`Error::LayoutNotBijective`] if the wiring does not reach every LED once.
    pub fn new(config: TrackerConfig<E>) -> Result<Self> {
        check_bijection::<N>(config.grid)?;
        info!(
            "Tracker::new: {}x{} grid, {} entities",
            config.grid.width(),
            config.grid.height(),
            config.roster.len()
        );
        Ok(Self {
            config,
            state: RefreshState::Idle,
            last_report: FrameReport::default(),
        })
    }

    /// The tracker's settings.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig<E> {
        &self.config
    }

    /// Whether a refresh is in progress.
    #[must_use]
    pub const fn state(&self) -> RefreshState {
        self.state
    }

    /// Summary of the most recent successful refresh (empty before the first one).
    ///
    /// After [`Tracker::run`] returns, this tells which entities were left off the last frame.
    #[must_use]
    pub const fn last_report(&self) -> &FrameReport<E> {
        &self.last_report
    }

    /// Grid cell for `position`.
    #[must_use]
    pub fn cell(&self, position: GeoPosition) -> GridCell {
        project(
            position,
            self.config.reference,
            self.config.scale,
            self.config.grid,
        )
    }

    /// Group entities by the LED their position falls on. Order is kept, so the first
    /// entity given is the first to show on a shared LED.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntity`] if an entity is given twice and
    /// [`Error::TooManyEntities`] if more than `E` share an LED.
    pub fn occupancy<I>(&self, positions: I) -> Result<Occupancy<N, E>>
    where
        I: IntoIterator<Item = (Entity, GeoPosition)>,
    {
        Occupancy::aggregate(
            positions
                .into_iter()
                .map(|(entity, position)| (entity, self.cell(position))),
            self.config.grid,
        )
    }

    /// The frame for `positions` at `now`, without touching any display.
    ///
    /// The same positions and the same whole second always give the same frame.
    ///
    /// # Errors
    ///
    /// See [`Tracker::occupancy`].
    pub fn render<I>(&self, positions: I, now: Instant) -> Result<DisplayFrame<N>>
    where
        I: IntoIterator<Item = (Entity, GeoPosition)>,
    {
        Ok(compose_frame(&self.occupancy(positions)?, now))
    }

    /// Run one refresh at `now`: fetch every position from `source` and show the frame on
    /// `sink`. The tracker is [`Rendering`](RefreshState::Rendering) while this runs and
    /// [`Idle`](RefreshState::Idle) afterwards, even on error.
    ///
    /// # Errors
    ///
    /// Unavailable positions are not errors; they are listed in the returned report.
    /// Errors from `sink` are returned.
    pub async fn refresh<P, D>(
        &mut self,
        source: &mut P,
        sink: &mut D,
        now: Instant,
    ) -> Result<FrameReport<E>>
    where
        P: PositionSource,
        D: DisplaySink,
    {
        self.state = RefreshState::Rendering;
        let result = self.render_to(source, sink, now).await;
        self.state = RefreshState::Idle;
        if let Ok(report) = &result {
            self.last_report.clone_from(report);
        }
        result
    }

    /// Refresh now, then every refresh interval, until `shutdown` is signaled.
    ///
    /// `shutdown` is checked before each refresh and also ends the wait between refreshes.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Tracker::refresh`].
    pub async fn run<P, D>(
        &mut self,
        source: &mut P,
        sink: &mut D,
        shutdown: &ShutdownSignal,
    ) -> Result<()>
    where
        P: PositionSource,
        D: DisplaySink,
    {
        self.run_with(source, sink, shutdown, |_| {}).await
    }

    /// Like [`Tracker::run`], calling `on_report` after every refresh.
    ///
    /// Use this to surface entities whose positions were unavailable, for example by printing
    /// [`FrameReport::absent`] on a host.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Tracker::refresh`].
    pub async fn run_with<P, D, F>(
        &mut self,
        source: &mut P,
        sink: &mut D,
        shutdown: &ShutdownSignal,
        mut on_report: F,
    ) -> Result<()>
    where
        P: PositionSource,
        D: DisplaySink,
        F: FnMut(&FrameReport<E>),
    {
        info!(
            "Tracker::run: refreshing every {} ms",
            self.config.refresh_interval.as_millis()
        );
        while !shutdown.signaled() {
            let report = self.refresh(source, sink, Instant::now()).await?;
            on_report(&report);
            match select(shutdown.wait(), Timer::after(self.config.refresh_interval)).await {
                Either::First(()) => break,
                Either::Second(()) => {}
            }
        }
        info!("Tracker::run: shutdown requested");
        Ok(())
    }

    async fn render_to<P, D>(
        &self,
        source: &mut P,
        sink: &mut D,
        now: Instant,
    ) -> Result<FrameReport<E>>
    where
        P: PositionSource,
        D: DisplaySink,
    {
        let mut report = FrameReport::default();
        let mut placements: Vec<(Entity, GeoPosition), E> = Vec::new();

        for entity in self.config.roster.iter() {
            match source.position(entity).await {
                Ok(position) if position.is_valid() => {
                    placements.push((*entity, position)).map_err(too_many::<_, E>)?;
                    report.placed.push(entity.name()).map_err(too_many::<_, E>)?;
                }
                Ok(_) => {
                    warn!("Tracker: {} reported an invalid position", entity.name());
                    report.absent.push(entity.name()).map_err(too_many::<_, E>)?;
                }
                Err(error) => {
                    warn!("Tracker: skipping {}: {}", entity.name(), error);
                    report.absent.push(entity.name()).map_err(too_many::<_, E>)?;
                }
            }
        }

        let occupancy = self.occupancy(placements)?;
        let frame = compose_frame(&occupancy, now);
        report.lit = occupancy.len();
        report.shared = occupancy.iter().filter(|group| group.is_shared()).count();

        sink.clear_all();
        for (color, index) in frame.iter().zip(0..) {
            sink.set(index, *color)?;
        }
        sink.show().await?;

        debug!(
            "Tracker: {} LEDs lit, {} shared, {} entities absent",
            report.lit,
            report.shared,
            report.absent.len()
        );
        Ok(report)
    }
}

fn too_many<T, const E: usize>(_rejected: T) -> Error {
    Error::TooManyEntities { max: E }
}

/// Frame with every occupied LED colored for `now` and every other LED off.
#[must_use]
pub fn compose_frame<const N: usize, const E: usize>(
    occupancy: &Occupancy<N, E>,
    now: Instant,
) -> DisplayFrame<N> {
    let mut frame = DisplayFrame::new();
    for group in occupancy.iter() {
        if let (Some(color), Some(pixel)) = (
            resolve(group.occupants(), now),
            frame.get_mut(usize::from(group.index())),
        ) {
            *pixel = color;
        }
    }
    frame
}
