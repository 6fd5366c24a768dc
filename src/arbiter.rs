//! Choosing the color of an LED that one or more entities share.
//!
//! A lone entity always shows its own color. When several entities share an LED, their colors
//! take turns, one per whole second of the clock, in the order the entities were placed:
//!
//! ```text
//! occupants [Thor, Mira], clock seconds:
//!   10  11  12  13  14
//!   Thor Mira Thor Mira Thor
//! ```
//!
//! The result depends only on the occupants and the instant passed in, so rendering the same
//! group twice within one second gives the same color.
//!
//! The turn phase follows the `embassy_time` clock: on the host it counts from process start,
//! on the Pico from boot, not from the Unix epoch.

use embassy_time::{Duration, Instant};
use smart_leds::RGB8;

use crate::roster::Entity;

/// How long each occupant of a shared LED keeps the color.
pub const TURN_DURATION: Duration = Duration::from_secs(1);

/// Whole-second tick of `now`; each tick is one turn on a shared LED.
#[must_use]
pub const fn tick(now: Instant) -> u64 {
    now.as_ticks() / TURN_DURATION.as_ticks()
}

/// Color to show for `occupants` at `now`, or `None` if there are no occupants.
///
/// ```rust
/// use embassy_time::Instant;
/// use geo_led::arbiter::resolve;
/// use geo_led::colors;
/// use geo_led::roster::Entity;
///
/// let shared = [Entity::new("Thor", colors::LIME), Entity::new("Mira", colors::RED)];
/// assert_eq!(resolve(&shared, Instant::from_secs(10)), Some(colors::LIME));
/// assert_eq!(resolve(&shared, Instant::from_secs(11)), Some(colors::RED));
/// assert_eq!(resolve(&shared[..1], Instant::from_secs(11)), Some(colors::LIME));
/// ```
#[must_use]
pub fn resolve(occupants: &[Entity], now: Instant) -> Option<RGB8> {
    match occupants {
        [] => None,
        [only] => Some(only.color()),
        shared => {
            let turn = tick(now) % shared.len() as u64;
            usize::try_from(turn)
                .ok()
                .and_then(|turn| shared.get(turn))
                .map(Entity::color)
        }
    }
}
