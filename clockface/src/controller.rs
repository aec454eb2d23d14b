//! The display-update state machine at the heart of the widget.
//!
//! `ClockTextController` owns the authoritative displayed text and decides,
//! on every incoming signal, whether the text must change and how: instantly,
//! or through a two-phase exit/enter animation whose exit completion is the
//! sole trigger for the commit. It also re-derives the surface's visible
//! line budget whenever content changes, so auto-fit sizing is always
//! evaluated against the new text's actual line count.

use crate::animation::AnimationPair;
use crate::common::AnimationId;
use crate::events::{ClockSignal, DisplayEvent};
use crate::faces::TimeFormatter;
use crate::surface::TextSurface;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::broadcast;
use tracing::warn;

/// Number of visible lines in `text`: line breaks plus one.
pub fn count_text_lines(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// Which timezone drives the displayed time.
///
/// A pinned zone is sticky: system timezone-change notifications do not
/// alter it. Only another explicit pin, or reverting to `FollowSystem`,
/// changes the active zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonePolicy {
    /// Track the zone reported by system timezone-change notifications.
    FollowSystem,
    /// A caller-pinned zone.
    Pinned(Tz),
}

/// The transition machine, advanced by discrete events.
///
/// At most one transition is in flight at any time. A newer candidate
/// arriving while `Exiting` supersedes the pending one instead of starting
/// a second animation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Transition {
    Idle,
    Exiting { pending: String },
}

/// The display-update state machine.
///
/// Invariant: `current_text` always reflects the last text committed to the
/// surface, never an in-flight candidate held by an exit animation.
pub struct ClockTextController<S: TextSurface> {
    surface: S,
    face: Box<dyn TimeFormatter>,
    animations: AnimationPair,
    animations_enabled: bool,
    zone: ZonePolicy,
    system_zone: Tz,
    last_instant: DateTime<Utc>,
    current_text: String,
    transition: Transition,
    attached: bool,
}

impl<S: TextSurface> ClockTextController<S> {
    /// Creates a detached controller following `system_zone`.
    pub fn new(
        surface: S,
        face: Box<dyn TimeFormatter>,
        animations: AnimationPair,
        system_zone: Tz,
        animations_enabled: bool,
    ) -> Self {
        Self {
            surface,
            face,
            animations,
            animations_enabled,
            zone: ZonePolicy::FollowSystem,
            system_zone,
            last_instant: DateTime::<Utc>::MIN_UTC,
            current_text: String::new(),
            transition: Transition::Idle,
            attached: false,
        }
    }

    /// The last text committed to the surface.
    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The timezone currently driving the display.
    pub fn active_zone(&self) -> Tz {
        match self.zone {
            ZonePolicy::Pinned(zone) => zone,
            ZonePolicy::FollowSystem => self.system_zone,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Marks the widget attached and shows the current time immediately,
    /// without waiting for the next tick. No-op when already attached.
    pub fn attach(&mut self, now: DateTime<Utc>, events: &broadcast::Sender<DisplayEvent>) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.last_instant = now;
        self.refresh(events);
    }

    /// Marks the widget detached. Any in-flight transition is abandoned and
    /// a late animation completion is ignored until the next attach. No-op
    /// when already detached.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.transition = Transition::Idle;
    }

    /// Pins the display to `zone`, or reverts to following the system zone
    /// when `None`, then re-evaluates the display immediately.
    ///
    /// Identifiers are accepted unconditionally: an id that is not a known
    /// IANA zone name pins UTC instead of failing.
    pub fn set_time_zone(&mut self, zone: Option<&str>, events: &broadcast::Sender<DisplayEvent>) {
        self.zone = match zone {
            Some(id) => ZonePolicy::Pinned(parse_zone(id)),
            None => ZonePolicy::FollowSystem,
        };
        self.refresh(events);
    }

    /// Toggles the animated path for future text changes. A transition
    /// already in flight keeps the behavior it started with.
    pub fn set_animations_enabled(&mut self, enabled: bool) {
        self.animations_enabled = enabled;
    }

    /// Feeds one external notification into the state machine. Signals
    /// arriving while detached are ignored.
    pub fn handle_signal(&mut self, signal: &ClockSignal, events: &broadcast::Sender<DisplayEvent>) {
        if !self.attached {
            return;
        }
        self.last_instant = signal.timestamp();
        if let ClockSignal::TimezoneChanged { zone_id, .. } = signal {
            // A pinned zone is sticky against system notifications.
            if self.zone == ZonePolicy::FollowSystem {
                self.system_zone = parse_zone(zone_id);
            }
        }
        self.refresh(events);
    }

    /// Advances the transition machine when an animation finishes.
    ///
    /// Only the exit animation is a state edge: its completion commits the
    /// pending candidate (unless superseded back to the committed text) and
    /// starts the enter animation. Completions delivered after detach are
    /// suppressed.
    pub fn animation_finished(
        &mut self,
        animation: AnimationId,
        events: &broadcast::Sender<DisplayEvent>,
    ) {
        if !self.attached || animation != self.animations.exit {
            return;
        }
        let pending = match std::mem::replace(&mut self.transition, Transition::Idle) {
            Transition::Exiting { pending } => pending,
            Transition::Idle => return,
        };
        if pending != self.current_text {
            self.commit(pending, events);
        }
        self.surface.play_animation(self.animations.enter);
    }

    /// Formats the stored instant in the active zone and feeds the result
    /// to the text-commit procedure.
    fn refresh(&mut self, events: &broadcast::Sender<DisplayEvent>) {
        if !self.attached {
            return;
        }
        let text = self.face.format(self.last_instant, self.active_zone());
        self.apply_text(text, events);
    }

    fn apply_text(&mut self, text: String, events: &broadcast::Sender<DisplayEvent>) {
        if let Transition::Exiting { pending } = &mut self.transition {
            // The newest candidate wins the pending commit; no second exit
            // animation starts.
            if *pending != text {
                events
                    .send(DisplayEvent::TransitionSuperseded {
                        superseded: std::mem::replace(pending, text.clone()),
                        candidate: text,
                    })
                    .ok();
            }
            return;
        }
        if text == self.current_text {
            return;
        }
        if self.animations_enabled {
            events
                .send(DisplayEvent::TransitionStarted {
                    from: self.current_text.clone(),
                    to: text.clone(),
                })
                .ok();
            self.transition = Transition::Exiting { pending: text };
            self.surface.play_animation(self.animations.exit);
        } else {
            self.commit(text, events);
        }
    }

    /// Makes `text` the authoritative displayed text.
    ///
    /// The surface recomputes its font scale from the current line budget
    /// and content, so when the visible line count changes the old text is
    /// cleared before the new budget is pushed; setting text against a stale
    /// budget would size it for the old content.
    fn commit(&mut self, text: String, events: &broadcast::Sender<DisplayEvent>) {
        let rendered = self.surface.current_text();
        let past_lines = rendered.as_deref().map_or(0, count_text_lines);
        let new_lines = count_text_lines(&text);
        if past_lines != new_lines {
            if rendered.is_some() {
                self.surface.set_text("");
            }
            self.surface.set_max_lines(new_lines);
        }
        self.surface.set_text(&text);
        self.current_text = text;
        events
            .send(DisplayEvent::Committed {
                text: self.current_text.clone(),
                lines: new_lines,
            })
            .ok();
    }
}

fn parse_zone(zone_id: &str) -> Tz {
    zone_id.parse().unwrap_or_else(|_| {
        warn!("Unknown timezone id '{}', falling back to UTC.", zone_id);
        Tz::UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{register_pair, AnimationSet};
    use crate::config::AnimationConfig;
    use crate::time::TickEvent;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum SurfaceCall {
        SetText(String),
        SetMaxLines(usize),
        Play(AnimationId),
    }

    #[derive(Default)]
    struct RecordingSurface {
        text: Option<String>,
        max_lines: usize,
        calls: Vec<SurfaceCall>,
    }

    impl TextSurface for RecordingSurface {
        fn current_text(&self) -> Option<String> {
            self.text.clone()
        }

        fn set_text(&mut self, text: &str) {
            self.text = Some(text.to_string());
            self.calls.push(SurfaceCall::SetText(text.to_string()));
        }

        fn set_max_lines(&mut self, lines: usize) {
            self.max_lines = lines;
            self.calls.push(SurfaceCall::SetMaxLines(lines));
        }

        fn play_animation(&mut self, animation: AnimationId) {
            self.calls.push(SurfaceCall::Play(animation));
        }
    }

    struct FnFace<F>(F);

    impl<F> TimeFormatter for FnFace<F>
    where
        F: Fn(DateTime<Utc>, Tz) -> String + Send + Sync,
    {
        fn format(&self, instant: DateTime<Utc>, zone: Tz) -> String {
            (self.0)(instant, zone)
        }
    }

    type TestController = ClockTextController<RecordingSurface>;

    fn controller_with<F>(
        face: F,
        animations_enabled: bool,
    ) -> (TestController, AnimationPair, broadcast::Sender<DisplayEvent>)
    where
        F: Fn(DateTime<Utc>, Tz) -> String + Send + Sync + 'static,
    {
        let mut set = AnimationSet::with_key();
        let pair = register_pair(&mut set, &AnimationConfig::default());
        let (events, _rx) = broadcast::channel(32);
        let controller = ClockTextController::new(
            RecordingSurface::default(),
            Box::new(FnFace(face)),
            pair,
            Tz::UTC,
            animations_enabled,
        );
        (controller, pair, events)
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn tick_at(timestamp: DateTime<Utc>) -> ClockSignal {
        ClockSignal::Tick(Arc::new(TickEvent {
            tick_count: 0,
            timestamp,
        }))
    }

    fn hh_mm(instant: DateTime<Utc>, zone: Tz) -> String {
        instant.with_timezone(&zone).format("%H:%M").to_string()
    }

    #[test]
    fn first_commit_sets_line_budget_before_text() {
        let (mut controller, _, events) = controller_with(hh_mm, false);
        controller.attach(at(10, 30), &events);
        assert_eq!(
            controller.surface().calls,
            vec![
                SurfaceCall::SetMaxLines(1),
                SurfaceCall::SetText("10:30".into())
            ]
        );
        assert_eq!(controller.current_text(), "10:30");
    }

    #[test]
    fn growing_line_count_clears_before_rebudgeting() {
        let face = |instant: DateTime<Utc>, _: Tz| {
            if instant.timestamp() == at(10, 30).timestamp() {
                "10:30".to_string()
            } else {
                "10:30\nAM".to_string()
            }
        };
        let (mut controller, _, events) = controller_with(face, false);
        controller.attach(at(10, 30), &events);
        controller.surface_mut().calls.clear();

        controller.handle_signal(&tick_at(at(10, 31)), &events);
        assert_eq!(
            controller.surface().calls,
            vec![
                SurfaceCall::SetText(String::new()),
                SurfaceCall::SetMaxLines(2),
                SurfaceCall::SetText("10:30\nAM".into())
            ]
        );
    }

    #[test]
    fn unchanged_line_count_sets_text_directly() {
        let face = |instant: DateTime<Utc>, zone: Tz| format!("{}\nAM", hh_mm(instant, zone));
        let (mut controller, _, events) = controller_with(face, false);
        controller.attach(at(10, 30), &events);
        controller.surface_mut().calls.clear();

        controller.handle_signal(&tick_at(at(10, 31)), &events);
        assert_eq!(
            controller.surface().calls,
            vec![SurfaceCall::SetText("10:31\nAM".into())]
        );
    }

    #[test]
    fn identical_render_is_a_no_op() {
        let (mut controller, _, events) = controller_with(hh_mm, false);
        controller.attach(at(10, 30), &events);
        controller.surface_mut().calls.clear();

        let mut rx = events.subscribe();
        controller.handle_signal(&tick_at(at(10, 30)), &events);
        assert!(controller.surface().calls.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn animated_commit_waits_for_exit_completion() {
        let (mut controller, pair, events) = controller_with(hh_mm, true);
        controller.attach(at(10, 30), &events);

        // Only the exit animation has played; nothing is committed yet.
        assert_eq!(controller.surface().calls, vec![SurfaceCall::Play(pair.exit)]);
        assert_eq!(controller.current_text(), "");

        controller.surface_mut().calls.clear();
        controller.animation_finished(pair.exit, &events);
        assert_eq!(
            controller.surface().calls,
            vec![
                SurfaceCall::SetMaxLines(1),
                SurfaceCall::SetText("10:30".into()),
                SurfaceCall::Play(pair.enter)
            ]
        );
        assert_eq!(controller.current_text(), "10:30");

        // The enter animation finishing is not a state edge.
        controller.surface_mut().calls.clear();
        controller.animation_finished(pair.enter, &events);
        assert!(controller.surface().calls.is_empty());
    }

    #[test]
    fn animated_and_instant_paths_commit_the_same_state() {
        let (mut instant, _, events_a) = controller_with(hh_mm, false);
        instant.attach(at(10, 30), &events_a);
        instant.handle_signal(&tick_at(at(10, 31)), &events_a);

        let (mut animated, pair, events_b) = controller_with(hh_mm, true);
        animated.attach(at(10, 30), &events_b);
        animated.animation_finished(pair.exit, &events_b);
        animated.handle_signal(&tick_at(at(10, 31)), &events_b);
        animated.animation_finished(pair.exit, &events_b);

        assert_eq!(instant.current_text(), animated.current_text());
        assert_eq!(instant.surface().text, animated.surface().text);
        assert_eq!(instant.surface().max_lines, animated.surface().max_lines);
    }

    #[test]
    fn pinned_zone_is_sticky_against_system_notifications() {
        let face = |instant: DateTime<Utc>, zone: Tz| {
            instant.with_timezone(&zone).format("%H:%M %z").to_string()
        };
        let (mut controller, _, events) = controller_with(face, false);
        controller.attach(at(12, 0), &events);
        assert_eq!(controller.current_text(), "12:00 +0000");

        controller.set_time_zone(Some("America/New_York"), &events);
        assert_eq!(controller.current_text(), "07:00 -0500");

        // Ignored while pinned.
        controller.handle_signal(
            &ClockSignal::TimezoneChanged {
                zone_id: "Europe/Paris".to_string(),
                timestamp: at(12, 0),
            },
            &events,
        );
        assert_eq!(controller.active_zone(), chrono_tz::America::New_York);
        assert_eq!(controller.current_text(), "07:00 -0500");

        // Reverting to the system zone picks notifications back up.
        controller.set_time_zone(None, &events);
        assert_eq!(controller.current_text(), "12:00 +0000");
        controller.handle_signal(
            &ClockSignal::TimezoneChanged {
                zone_id: "Europe/Paris".to_string(),
                timestamp: at(12, 0),
            },
            &events,
        );
        assert_eq!(controller.current_text(), "13:00 +0100");
    }

    #[test]
    fn unknown_zone_id_pins_utc() {
        let (mut controller, _, events) = controller_with(hh_mm, false);
        controller.attach(at(10, 30), &events);
        controller.set_time_zone(Some("Not/AZone"), &events);
        assert_eq!(controller.active_zone(), Tz::UTC);
        assert_eq!(controller.current_text(), "10:30");
    }

    #[test]
    fn attach_is_idempotent() {
        let (mut controller, _, events) = controller_with(hh_mm, false);
        controller.attach(at(10, 30), &events);
        controller.surface_mut().calls.clear();

        controller.attach(at(11, 45), &events);
        assert!(controller.surface().calls.is_empty());
        assert_eq!(controller.current_text(), "10:30");
    }

    #[test]
    fn signals_are_ignored_while_detached() {
        let (mut controller, _, events) = controller_with(hh_mm, false);
        controller.handle_signal(&tick_at(at(10, 30)), &events);
        assert!(controller.surface().calls.is_empty());

        controller.attach(at(10, 30), &events);
        controller.detach();
        controller.detach();
        controller.surface_mut().calls.clear();
        controller.handle_signal(&tick_at(at(10, 31)), &events);
        assert!(controller.surface().calls.is_empty());
    }

    #[test]
    fn detach_suppresses_late_animation_completion() {
        let (mut controller, pair, events) = controller_with(hh_mm, true);
        controller.attach(at(10, 30), &events);
        controller.detach();
        controller.surface_mut().calls.clear();

        controller.animation_finished(pair.exit, &events);
        assert!(controller.surface().calls.is_empty());
        assert_eq!(controller.current_text(), "");
    }

    #[test]
    fn newer_candidate_supersedes_pending_transition() {
        let (mut controller, pair, events) = controller_with(hh_mm, true);
        let mut rx = events.subscribe();
        controller.attach(at(10, 30), &events);

        controller.handle_signal(&tick_at(at(10, 31)), &events);

        // Still a single exit animation in flight.
        assert_eq!(controller.surface().calls, vec![SurfaceCall::Play(pair.exit)]);
        let mut superseded = None;
        while let Ok(event) = rx.try_recv() {
            if let DisplayEvent::TransitionSuperseded {
                superseded: old,
                candidate,
            } = event
            {
                superseded = Some((old, candidate));
            }
        }
        assert_eq!(superseded, Some(("10:30".into(), "10:31".into())));

        controller.surface_mut().calls.clear();
        controller.animation_finished(pair.exit, &events);
        assert_eq!(controller.current_text(), "10:31");
        assert_eq!(
            controller.surface().calls,
            vec![
                SurfaceCall::SetMaxLines(1),
                SurfaceCall::SetText("10:31".into()),
                SurfaceCall::Play(pair.enter)
            ]
        );
    }

    #[test]
    fn superseding_back_to_committed_text_skips_the_commit() {
        // Alternates between two texts by minute parity.
        use chrono::Timelike;
        let face = |instant: DateTime<Utc>, _: Tz| {
            if instant.minute() % 2 == 0 {
                "A".to_string()
            } else {
                "B".to_string()
            }
        };
        let (mut controller, pair, events) = controller_with(face, true);
        controller.attach(at(10, 30), &events);
        controller.animation_finished(pair.exit, &events);
        assert_eq!(controller.current_text(), "A");

        controller.handle_signal(&tick_at(at(10, 31)), &events);
        controller.handle_signal(&tick_at(at(10, 32)), &events);
        controller.surface_mut().calls.clear();

        // Pending text equals the committed text again: no commit, but the
        // text still re-enters visually.
        controller.animation_finished(pair.exit, &events);
        assert_eq!(controller.current_text(), "A");
        assert_eq!(controller.surface().calls, vec![SurfaceCall::Play(pair.enter)]);
    }

    #[test]
    fn time_changed_signal_refreshes_the_display() {
        let (mut controller, _, events) = controller_with(hh_mm, false);
        controller.attach(at(10, 30), &events);
        controller.surface_mut().calls.clear();

        controller.handle_signal(
            &ClockSignal::TimeChanged {
                timestamp: at(18, 5),
            },
            &events,
        );
        assert_eq!(controller.current_text(), "18:05");
    }

    #[test]
    fn toggling_animations_affects_only_future_transitions() {
        let (mut controller, pair, events) = controller_with(hh_mm, true);
        controller.attach(at(10, 30), &events);
        controller.set_animations_enabled(false);

        // The in-flight transition still completes through its animation.
        controller.animation_finished(pair.exit, &events);
        assert_eq!(controller.current_text(), "10:30");

        // The next change commits instantly.
        controller.surface_mut().calls.clear();
        controller.handle_signal(&tick_at(at(10, 31)), &events);
        assert_eq!(
            controller.surface().calls,
            vec![SurfaceCall::SetText("10:31".into())]
        );
    }
}
