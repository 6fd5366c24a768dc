#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]
//! Track three simulated walkers on a 5×3 WS2812 panel wired to GPIO 18 of a Pico 1.

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program, RgbColorOrder};
use embassy_time::{Duration, Instant, Timer};
use geo_led::arbiter::tick;
use geo_led::geo::{GeoPosition, GridSize, Scale};
use geo_led::led_strip::{
    Current, DisplayFrame, DisplaySink, GAMMA_DEFAULT, generate_combo_table,
};
use geo_led::position::PositionSource;
use geo_led::roster::{Entity, Roster};
use geo_led::tracker::{ShutdownSignal, Tracker, TrackerConfig};
use geo_led::{Error, Result, colors};
use smart_leds::RGB8;
use {defmt_rtt as _, panic_probe as _};

const WIDTH: u16 = 5;
const HEIGHT: u16 = 3;
const LED_COUNT: usize = WIDTH as usize * HEIGHT as usize;
const REFERENCE: GeoPosition = GeoPosition::new(55.743_800_6, 12.528_225_3);
const DEGREES_PER_CELL: f64 = 1.0 / 36.0;

// Brightness cap for a USB-powered panel.
const COMBO_TABLE: [u8; 256] =
    generate_combo_table(GAMMA_DEFAULT, Current::Milliamps(250).max_brightness(LED_COUNT));

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

static SHUTDOWN: ShutdownSignal = ShutdownSignal::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let driver = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_18, &program);
    let mut sink = PioSink::new(driver);

    let roster = Roster::<3>::new(&[
        Entity::new("Thor", colors::LIME),
        Entity::new("Mira", colors::RED),
        Entity::new("Stefan", colors::BLUE),
    ])?;
    let config = TrackerConfig::new(
        GridSize::new(WIDTH, HEIGHT)?,
        REFERENCE,
        Scale::degrees_per_cell(DEGREES_PER_CELL)?,
        roster,
    )?
    .with_refresh_interval(Duration::from_secs(1))?;
    let mut tracker = Tracker::<LED_COUNT, 3>::new(config)?;

    let mut walkers = Walkers;
    loop {
        tracker.run(&mut walkers, &mut sink, &SHUTDOWN).await?;
        // Nothing signals shutdown here; idle if something ever does.
        Timer::after(Duration::from_secs(1)).await;
    }
}

/// Strip sink backed by the PIO WS2812 driver.
struct PioSink<'d, ORDER: RgbColorOrder> {
    driver: PioWs2812<'d, PIO0, 0, LED_COUNT, ORDER>,
    staged: DisplayFrame<LED_COUNT>,
}

impl<'d, ORDER: RgbColorOrder> PioSink<'d, ORDER> {
    const fn new(driver: PioWs2812<'d, PIO0, 0, LED_COUNT, ORDER>) -> Self {
        Self {
            driver,
            staged: DisplayFrame::new(),
        }
    }
}

impl<ORDER: RgbColorOrder> DisplaySink for PioSink<'_, ORDER> {
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
        let mut corrected = self.staged;
        for color in corrected.iter_mut() {
            color.r = COMBO_TABLE[usize::from(color.r)];
            color.g = COMBO_TABLE[usize::from(color.g)];
            color.b = COMBO_TABLE[usize::from(color.b)];
        }
        self.driver.write(&corrected).await;
        Ok(())
    }
}

/// Walkers pacing square loops around the reference point, one cell per second.
///
/// Thor and Mira walk the same loop half a lap apart; Stefan stands still for a few seconds
/// every lap, which makes him unavailable.
struct Walkers;

// Cell offsets (north, east) of one lap around the center cell.
const LAP: [(f64, f64); 8] = [
    (1.0, -1.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
    (0.0, -1.0),
];

impl PositionSource for Walkers {
    async fn position(&mut self, entity: &Entity) -> Result<GeoPosition> {
        let step = tick(Instant::now()) as usize;
        let (phase, scale) = match entity.name() {
            "Thor" => (0, 1.0),
            "Mira" => (LAP.len() / 2, 1.0),
            _ if step % LAP.len() < 3 => {
                return Err(Error::PositionUnavailable {
                    name: entity.name(),
                });
            }
            _ => (1, 2.0),
        };
        let (north, east) = LAP[(step + phase) % LAP.len()];
        Ok(GeoPosition::new(
            REFERENCE.latitude + north * DEGREES_PER_CELL,
            REFERENCE.longitude + east * scale * DEGREES_PER_CELL,
        ))
    }
}
