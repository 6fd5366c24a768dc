//! Show where a small group of people are on a tiny LED grid.
//!
//! Each tracked person (an [`Entity`](roster::Entity)) has a name and a color. Every few
//! seconds a [`Tracker`](tracker::Tracker) asks a [`PositionSource`](position::PositionSource)
//! where everyone is, projects each latitude/longitude onto a grid centered on a reference
//! point, and lights one LED per occupied cell. When several people share a cell, their
//! colors take turns, one second each.
//!
//! The grid is a single LED strip snaked across the rows (see [`layout`]). Frames go to a
//! [`DisplaySink`](led_strip::DisplaySink): a WS2812 strip on a Pico, or an in-memory frame
//! for previews and tests.
//!
//! # Glossary
//!
//! - **Reference point:** the latitude/longitude shown in the center cell.
//! - **Scale:** degrees of latitude or longitude per grid cell.
//! - **Serpentine wiring:** the strip runs right-to-left on even rows and left-to-right on
//!   odd rows.
//! - **Turn:** one second during which a shared LED shows one occupant's color.
//!
//! # Features
//!
//! - `host` (default): std builds, tests, PNG previews and file-backed positions.
//! - `defmt`: log through `defmt`.
//! - `embedded`: the Pico 1 demo. Build it with
//!   `cargo build --bin pico_tracker --no-default-features --features embedded --target thumbv6m-none-eabi`.
#![cfg_attr(not(feature = "host"), no_std)]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

#[cfg(all(feature = "host", feature = "embedded"))]
compile_error!("Cannot enable both 'host' and 'embedded' features simultaneously");

// Must come first so the logging macros are visible in every module below.
#[macro_use]
mod fmt;

pub mod arbiter;
mod error;
pub mod geo;
pub mod layout;
pub mod led_strip;
pub mod occupancy;
pub mod position;
pub mod roster;
#[cfg(feature = "host")]
pub mod to_png;
pub mod tracker;

pub use crate::error::{Error, Result};
#[doc(inline)]
pub use smart_leds::colors;
