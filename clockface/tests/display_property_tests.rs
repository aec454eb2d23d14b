use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use clockface::animation::{register_pair, AnimationPair, AnimationSet};
use clockface::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;
use tokio::sync::broadcast;

/// A surface that records its state for end-of-run comparison.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ProbeSurface {
    text: Option<String>,
    max_lines: usize,
    set_text_calls: usize,
}

impl TextSurface for ProbeSurface {
    fn current_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
        self.set_text_calls += 1;
    }

    fn set_max_lines(&mut self, lines: usize) {
        self.max_lines = lines;
    }

    fn play_animation(&mut self, _animation: AnimationId) {}
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

fn controller_for(
    first: String,
    second: String,
    animations_enabled: bool,
) -> (
    ClockTextController<ProbeSurface>,
    AnimationPair,
    broadcast::Sender<DisplayEvent>,
) {
    let mut set = AnimationSet::with_key();
    let pair = register_pair(&mut set, &AnimationConfig::default());
    let (events, _rx) = broadcast::channel(64);
    let t0 = t0();
    let face = move |instant: DateTime<Utc>, _: Tz| {
        if instant == t0 {
            first.clone()
        } else {
            second.clone()
        }
    };
    let controller = ClockTextController::new(
        ProbeSurface::default(),
        Box::new(FnFace(face)),
        pair,
        Tz::UTC,
        animations_enabled,
    );
    (controller, pair, events)
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap()
}

fn t1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 31, 0).unwrap()
}

fn tick_at(timestamp: DateTime<Utc>) -> ClockSignal {
    ClockSignal::Tick(Arc::new(TickEvent {
        tick_count: 0,
        timestamp,
    }))
}

proptest! {
    /// `count_text_lines` is exactly line breaks plus one.
    #[test]
    fn line_count_law(text in any::<String>()) {
        let newlines = text.chars().filter(|c| *c == '\n').count();
        prop_assert_eq!(count_text_lines(&text), newlines + 1);
    }

    /// A tick that formats to the already-displayed text produces zero
    /// surface churn, for all formatted strings.
    #[test]
    fn repeated_render_is_idempotent(text in any::<String>()) {
        let (mut controller, _, events) = controller_for(text.clone(), text, false);
        controller.attach(t0(), &events);
        let after_first = controller.surface().clone();

        controller.handle_signal(&tick_at(t0()), &events);
        prop_assert_eq!(controller.surface(), &after_first);
    }

    /// Disabling animations and committing instantly ends in the same state
    /// as the full exit, commit, enter sequence, for all input pairs.
    #[test]
    fn animated_path_commits_the_same_state(first in any::<String>(), second in any::<String>()) {
        let (mut instant, _, events_a) = controller_for(first.clone(), second.clone(), false);
        instant.attach(t0(), &events_a);
        instant.handle_signal(&tick_at(t1()), &events_a);

        let (mut animated, pair, events_b) = controller_for(first, second, true);
        animated.attach(t0(), &events_b);
        animated.animation_finished(pair.exit, &events_b);
        animated.handle_signal(&tick_at(t1()), &events_b);
        animated.animation_finished(pair.exit, &events_b);

        prop_assert_eq!(instant.current_text(), animated.current_text());
        prop_assert_eq!(&instant.surface().text, &animated.surface().text);
        prop_assert_eq!(instant.surface().max_lines, animated.surface().max_lines);
    }
}
