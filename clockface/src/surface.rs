//! The contract between the display state machine and whatever renders it.

use crate::animation::AnimationSet;
use crate::common::AnimationId;
use crate::events::SurfaceEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// An auto-fitting text rendering capability.
///
/// The surface is the single source of truth for the currently rendered
/// text. It is expected to recompute its font scale from the current
/// max-line budget and content whenever either changes, which is why the
/// state machine pushes the line budget before the text whenever the budget
/// changes.
///
/// `play_animation` is fire-and-forget: completion is reported later as a
/// [`SurfaceEvent::AnimationFinished`], never through a nested callback.
pub trait TextSurface {
    /// The currently rendered text, or `None` if nothing was ever rendered.
    fn current_text(&self) -> Option<String>;

    /// Renders the given text. An empty string clears the surface.
    fn set_text(&mut self, text: &str);

    /// Updates the maximum number of visible lines used for auto-fitting.
    fn set_max_lines(&mut self, lines: usize);

    /// Starts playing the given animation on the rendered text.
    fn play_animation(&mut self, animation: AnimationId);
}

/// Plays animation specs asynchronously on behalf of a surface.
///
/// A surface implementation that has no native animation subsystem can hand
/// each `play_animation` call to a driver: the driver sleeps for the spec's
/// duration on a spawned task and then reports completion on the surface
/// event channel, where the engine dispatcher picks it up.
#[derive(Clone)]
pub struct AnimationDriver {
    specs: Arc<AnimationSet>,
    events: broadcast::Sender<SurfaceEvent>,
}

impl AnimationDriver {
    pub fn new(specs: Arc<AnimationSet>, events: broadcast::Sender<SurfaceEvent>) -> Self {
        Self { specs, events }
    }

    /// Looks up a spec, e.g. so a renderer can style by label.
    pub fn spec(&self, animation: AnimationId) -> Option<&crate::animation::AnimationSpec> {
        self.specs.get(animation)
    }

    /// Schedules completion of the given animation after its duration.
    pub fn play(&self, animation: AnimationId) {
        let duration = self
            .specs
            .get(animation)
            .map(|spec| spec.duration())
            .unwrap_or_default();
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            events.send(SurfaceEvent::AnimationFinished { animation }).ok();
        });
    }
}
