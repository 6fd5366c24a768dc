#![allow(missing_docs)]
#![cfg(feature = "host")]
//! Track three people from location files and draw the grid in the terminal.
//!
//! ```text
//! cargo run --bin host_tracker -- <dir-with-location-files>
//! ```
//!
//! The directory should hold `thor_location.txt`, `mira_position.txt` and
//! `stefan_location.txt`, each one line like `Thor: 55.7438006, 12.5282253`. Edit the files
//! while this runs to move people around. Set `GEO_LED_SECONDS` to stop after that many
//! seconds.

use std::env;
use std::path::PathBuf;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use geo_led::geo::{GeoPosition, GridSize, Scale};
use geo_led::layout::index_rows;
use geo_led::led_strip::{DisplayFrame, DisplaySink, OFF};
use geo_led::position::file_source::FilePositionSource;
use geo_led::roster::{Entity, Roster};
use geo_led::tracker::{ShutdownSignal, Tracker, TrackerConfig};
use geo_led::{Error, Result, colors};
use smart_leds::RGB8;

const WIDTH: u16 = 5;
const HEIGHT: u16 = 3;
const LED_COUNT: usize = WIDTH as usize * HEIGHT as usize;

static SHUTDOWN: ShutdownSignal = ShutdownSignal::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    if let Err(err) = inner_main(spawner).await {
        eprintln!("host_tracker: {err}");
        std::process::exit(1);
    }
}

async fn inner_main(spawner: Spawner) -> Result<()> {
    let dir = env::args().nth(1).map_or_else(|| PathBuf::from("."), PathBuf::from);
    let grid = GridSize::new(WIDTH, HEIGHT)?;

    let roster = Roster::<3>::new(&[
        Entity::new("Thor", colors::LIME),
        Entity::new("Mira", colors::RED),
        Entity::new("Stefan", colors::BLUE),
    ])?;
    let config = TrackerConfig::new(
        grid,
        GeoPosition::new(55.743_800_6, 12.528_225_3),
        Scale::degrees_per_cell(1.0 / 36.0)?,
        roster,
    )?;
    let mut tracker = Tracker::<LED_COUNT, 3>::new(config)?;

    let mut source = FilePositionSource::new()
        .with_file("Thor", dir.join("thor_location.txt"))
        .with_file("Mira", dir.join("mira_position.txt"))
        .with_file("Stefan", dir.join("stefan_location.txt"));
    let mut sink = TerminalSink::new(grid);

    if let Some(seconds) = env::var("GEO_LED_SECONDS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
    {
        if let Err(err) = spawner.spawn(stop_after(Duration::from_secs(seconds))) {
            eprintln!("host_tracker: could not start timer: {err:?}");
        }
    }

    println!(
        "Watching {} (refresh every {} s)",
        dir.display(),
        tracker.config().refresh_interval().as_secs()
    );
    tracker
        .run_with(&mut source, &mut sink, &SHUTDOWN, |report| {
            if !report.absent().is_empty() {
                println!("no location for {}", report.absent().join(", "));
            }
        })
        .await
}

#[embassy_executor::task]
async fn stop_after(duration: Duration) {
    Timer::after(duration).await;
    SHUTDOWN.signal(());
}

/// Draws each frame as colored blocks, laid out the way the panel looks.
struct TerminalSink {
    grid: GridSize,
    staged: DisplayFrame<LED_COUNT>,
}

impl TerminalSink {
    const fn new(grid: GridSize) -> Self {
        Self {
            grid,
            staged: DisplayFrame::new(),
        }
    }
}

impl DisplaySink for TerminalSink {
    fn clear_all(&mut self) {
        self.staged = DisplayFrame::new();
    }

    fn set(&mut self, index: u16, color: RGB8) -> Result<()> {
        let pixel = self
            .staged
            .get_mut(usize::from(index))
            .ok_or(Error::IndexOutOfBounds {
                index,
                len: LED_COUNT,
            })?;
        *pixel = color;
        Ok(())
    }

    async fn show(&mut self) -> Result<()> {
        println!();
        for row in index_rows(self.grid) {
            let line: String = row
                .map(|index| {
                    block(
                        self.staged
                            .get(usize::from(index))
                            .copied()
                            .unwrap_or(OFF),
                    )
                })
                .collect();
            println!("{line}");
        }
        Ok(())
    }
}

fn block(color: RGB8) -> String {
    if color == OFF {
        " . ".to_owned()
    } else {
        format!("\x1b[48;2;{};{};{}m   \x1b[0m", color.r, color.g, color.b)
    }
}
