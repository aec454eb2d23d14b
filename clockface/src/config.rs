//! Defines all configuration structures for the Clockface engine.
//!
//! These structs are designed to be deserialized from a configuration file
//! (e.g., a TOML file) using `serde`. This allows the widget's behavior,
//! including its tick cadence, default timezone, face and transition
//! animations, to be defined externally from the application code.

use crate::animation::AnimationSpec;
use crate::faces::{CasualFace, DigitalFace, PatternFace, StackedFace, TimeFormatter};
use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The top-level configuration for the `ClockfaceEngine`.
///
/// This struct is the entry point for all engine settings. It is typically
/// loaded from a TOML file at application startup via [`ClockfaceConfig::load`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClockfaceConfig {
    /// The tick cadence of the `SystemClock` driving display refreshes.
    #[serde(default)]
    pub resolution: TickResolution,

    /// The timezone used until a timezone-changed notification or an
    /// explicit override arrives. Uses the string names from the IANA Time
    /// Zone Database (e.g., "America/New_York"). Defaults to UTC.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,

    /// Which concrete face turns instants into display text.
    #[serde(default)]
    pub face: FaceConfig,

    /// Transition animation settings.
    #[serde(default)]
    pub animation: AnimationConfig,
}

/// Defines the operational cadence of the `SystemClock`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickResolution {
    /// One tick per minute. Suitable for faces without seconds.
    Minute,
    /// One tick per second. Suitable for faces that display seconds.
    Second,
    /// A user-defined tick period in milliseconds.
    Custom { millis: u64 },
}

impl TickResolution {
    /// The period between consecutive ticks.
    pub fn period(&self) -> Duration {
        match self {
            TickResolution::Minute => Duration::from_secs(60),
            TickResolution::Second => Duration::from_secs(1),
            TickResolution::Custom { millis } => Duration::from_millis(*millis),
        }
    }
}

/// Selects and parameterizes the concrete face.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FaceConfig {
    /// A plain digital clock, e.g. "10:30".
    Digital {
        #[serde(default)]
        show_seconds: bool,
    },
    /// A free-form strftime pattern.
    Pattern { pattern: String },
    /// Time above the date on two lines.
    Stacked {
        #[serde(default = "default_time_pattern")]
        time_pattern: String,
        #[serde(default = "default_date_pattern")]
        date_pattern: String,
    },
    /// Human-phrased time, e.g. "half past" over "ten".
    Casual,
}

impl FaceConfig {
    /// Builds the formatter this configuration describes.
    pub fn build(&self) -> Box<dyn TimeFormatter> {
        match self {
            FaceConfig::Digital { show_seconds } => Box::new(DigitalFace::new(*show_seconds)),
            FaceConfig::Pattern { pattern } => Box::new(PatternFace::new(pattern.clone())),
            FaceConfig::Stacked {
                time_pattern,
                date_pattern,
            } => Box::new(StackedFace::new(time_pattern.clone(), date_pattern.clone())),
            FaceConfig::Casual => Box::new(CasualFace),
        }
    }
}

/// Configuration for the exit/enter transition pair.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    /// Whether text changes play the animated two-phase transition.
    /// When false, new text is committed instantly.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// The animation played on the outgoing text.
    #[serde(default = "default_exit")]
    pub exit: AnimationSpec,

    /// The animation played on the incoming text.
    #[serde(default = "default_enter")]
    pub enter: AnimationSpec,
}

// --- Default value functions for serde ---

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_time_pattern() -> String {
    "%H:%M".to_string()
}

fn default_date_pattern() -> String {
    "%a %e %b".to_string()
}

fn default_true() -> bool {
    true
}

fn default_exit() -> AnimationSpec {
    AnimationSpec::new("push-out-left", 180)
}

fn default_enter() -> AnimationSpec {
    AnimationSpec::new("push-in-right", 180)
}

impl Default for TickResolution {
    fn default() -> Self {
        TickResolution::Minute
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        FaceConfig::Digital {
            show_seconds: false,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exit: default_exit(),
            enter: default_enter(),
        }
    }
}

impl Default for ClockfaceConfig {
    fn default() -> Self {
        Self {
            resolution: TickResolution::default(),
            timezone: default_timezone(),
            face: FaceConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl ClockfaceConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid config in {}", path.display()))
    }
}
