//! Defines all public event types flowing through the Clockface engine.
//!
//! This module acts as the public API for the engine's event system. The
//! dispatcher feeds [`ClockSignal`]s and [`SurfaceEvent`]s into the display
//! state machine, and observers subscribe to the resulting [`DisplayEvent`]
//! stream.

use crate::common::AnimationId;
use crate::time::TickEvent;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// External notifications that may require the displayed text to refresh.
///
/// Every variant carries the instant it was stamped with, so the state
/// machine never has to consult a clock of its own.
#[derive(Debug, Clone)]
pub enum ClockSignal {
    /// A periodic tick from the `SystemClock`.
    Tick(Arc<TickEvent>),
    /// The wall clock was set to a different time.
    TimeChanged { timestamp: DateTime<Utc> },
    /// The system timezone changed. Ignored for zone selection while an
    /// explicit override is pinned, but the display still re-evaluates.
    TimezoneChanged {
        zone_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl ClockSignal {
    /// The instant this signal was stamped with.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClockSignal::Tick(tick) => tick.timestamp,
            ClockSignal::TimeChanged { timestamp } => *timestamp,
            ClockSignal::TimezoneChanged { timestamp, .. } => *timestamp,
        }
    }
}

/// Feedback from the rendering surface.
#[derive(Debug, Clone)]
pub enum SurfaceEvent {
    /// A previously requested animation finished playing.
    AnimationFinished { animation: AnimationId },
}

/// Observable outcomes of the display state machine.
#[derive(Debug, Clone)]
pub enum DisplayEvent {
    /// New text became the authoritative displayed text.
    Committed { text: String, lines: usize },
    /// An animated transition started; the commit will happen when the exit
    /// animation finishes.
    TransitionStarted { from: String, to: String },
    /// A newer candidate replaced the pending text of an in-flight
    /// transition before it could commit.
    TransitionSuperseded { superseded: String, candidate: String },
}
