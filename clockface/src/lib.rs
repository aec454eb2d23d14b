//! # Clockface
//!
//! An event-driven, auto-fitting text clock widget engine for Rust.
//!
//! Clockface renders the current time or date as text on a pluggable
//! surface, refreshes it on tick and timezone notifications, and animates
//! transitions between displayed values. It is designed as a library that a
//! front-end (a terminal, an embedded display, a GUI view) drives by
//! implementing one trait.
//!
//! ## Core Concepts
//!
//! - **SystemClock**: a periodic ticker that acts as the single source of
//!   tick signals, aligned to the wall-clock period boundary.
//! - **ClockTextController**: the display-update state machine. It commits
//!   text only when it actually changed, coordinates the two-phase
//!   exit/enter transition with each commit, and re-derives the surface's
//!   line budget whenever the visible line count changes.
//! - **Faces**: a face turns an instant in a timezone into display text.
//!   Faces are injected capabilities, not subclasses; supply your own by
//!   implementing `TimeFormatter`.
//! - **Event-Driven**: ticks, timezone changes and animation completions
//!   are all delivered as discrete events on one dispatcher, and observers
//!   subscribe to the resulting `DisplayEvent` stream.
//! - **Configuration-Driven**: tick cadence, face, default timezone and
//!   animation specs are defined at startup via a `ClockfaceConfig` object,
//!   often loaded from a TOML file.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use clockface::prelude::*;
//!
//! struct NullSurface;
//!
//! impl TextSurface for NullSurface {
//!     fn current_text(&self) -> Option<String> { None }
//!     fn set_text(&mut self, _text: &str) {}
//!     fn set_max_lines(&mut self, _lines: usize) {}
//!     fn play_animation(&mut self, _animation: AnimationId) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create a default configuration.
//!     let config = ClockfaceConfig::default();
//!
//!     // 2. Create the engine over a surface.
//!     let engine = ClockfaceEngine::new(config, |_driver, _pair| NullSurface);
//!
//!     // 3. Subscribe to an event stream before starting the engine.
//!     let mut display = engine.subscribe_display_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = display.recv().await {
//!             println!("Display event: {:?}", event);
//!         }
//!     });
//!
//!     // 4. Run the engine. It will shut down on Ctrl+C.
//!     engine.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Clockface Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


// Declare all the modules in the crate.
pub mod animation;
pub mod common;
pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod faces;
pub mod surface;
pub mod time;

/// A prelude module for easy importing of the most common Clockface types.
pub mod prelude {
    pub use crate::animation::{AnimationPair, AnimationSpec};
    pub use crate::common::AnimationId;
    pub use crate::config::{
        AnimationConfig, ClockfaceConfig, FaceConfig, TickResolution,
    };
    pub use crate::controller::{count_text_lines, ClockTextController, ZonePolicy};
    pub use crate::engine::ClockfaceEngine;
    pub use crate::events::{ClockSignal, DisplayEvent, SurfaceEvent};
    pub use crate::faces::TimeFormatter;
    pub use crate::surface::{AnimationDriver, TextSurface};
    pub use crate::time::TickEvent;
}
