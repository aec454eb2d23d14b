//! Defines the transition animation registry.
//!
//! Animations are opaque to the display state machine: the controller only
//! holds the ids of its exit/enter pair and asks the surface to play them.
//! The specs behind the ids (label, duration) belong to whoever renders
//! them.

use crate::common::AnimationId;
use crate::config::AnimationConfig;
use serde::Deserialize;
use slotmap::SlotMap;
use std::time::Duration;

/// A registry of animation specs keyed by [`AnimationId`].
pub type AnimationSet = SlotMap<AnimationId, AnimationSpec>;

/// Describes one transition animation.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationSpec {
    /// A renderer-meaningful style name, e.g. "push-out-left".
    pub label: String,
    /// Playback length in milliseconds.
    pub duration_ms: u64,
}

impl AnimationSpec {
    pub fn new(label: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            label: label.into(),
            duration_ms,
        }
    }

    /// Playback length as a `Duration`.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// The two animations gating an animated text commit.
///
/// The exit animation plays on the outgoing text; its completion is the sole
/// trigger for committing the pending text, after which the enter animation
/// plays on the incoming text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationPair {
    pub exit: AnimationId,
    pub enter: AnimationId,
}

/// Registers the configured exit/enter specs and returns their pair of ids.
pub fn register_pair(set: &mut AnimationSet, config: &AnimationConfig) -> AnimationPair {
    AnimationPair {
        exit: set.insert(config.exit.clone()),
        enter: set.insert(config.enter.clone()),
    }
}
