//! Pattern-driven faces built on chrono's strftime formatting.

use super::TimeFormatter;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// A plain digital clock, e.g. "10:30".
pub struct DigitalFace {
    pattern: &'static str,
}

impl DigitalFace {
    pub fn new(show_seconds: bool) -> Self {
        Self {
            pattern: if show_seconds { "%H:%M:%S" } else { "%H:%M" },
        }
    }
}

impl TimeFormatter for DigitalFace {
    fn format(&self, instant: DateTime<Utc>, zone: Tz) -> String {
        instant.with_timezone(&zone).format(self.pattern).to_string()
    }
}

/// A free-form strftime pattern face.
pub struct PatternFace {
    pattern: String,
}

impl PatternFace {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl TimeFormatter for PatternFace {
    fn format(&self, instant: DateTime<Utc>, zone: Tz) -> String {
        instant.with_timezone(&zone).format(&self.pattern).to_string()
    }
}

/// Time above the date on two lines.
pub struct StackedFace {
    time_pattern: String,
    date_pattern: String,
}

impl StackedFace {
    pub fn new(time_pattern: impl Into<String>, date_pattern: impl Into<String>) -> Self {
        Self {
            time_pattern: time_pattern.into(),
            date_pattern: date_pattern.into(),
        }
    }
}

impl TimeFormatter for StackedFace {
    fn format(&self, instant: DateTime<Utc>, zone: Tz) -> String {
        let local = instant.with_timezone(&zone);
        format!(
            "{}\n{}",
            local.format(&self.time_pattern),
            local.format(&self.date_pattern)
        )
    }
}
