//! Contains the concrete clock faces.
//!
//! A face is the capability that turns an instant into the text the widget
//! displays. The display state machine holds a face as an injected trait
//! object and never depends on any concrete implementation, so applications
//! can supply their own.

mod casual;
mod digital;

pub use casual::CasualFace;
pub use digital::{DigitalFace, PatternFace, StackedFace};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Turns an instant in a timezone into display text.
///
/// Implementations may return multi-line text (embedded `'\n'`), which
/// drives the widget's line-count recomputation. The function is expected to
/// be pure: same instant and zone, same text.
pub trait TimeFormatter: Send + Sync {
    fn format(&self, instant: DateTime<Utc>, zone: Tz) -> String;
}
