//! The master ticker that acts as the single source of tick signals.

use crate::config::TickResolution;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// One tick of the master clock.
#[derive(Debug, Clone)]
pub struct TickEvent {
    /// Monotonically increasing tick counter, starting at 1.
    pub tick_count: u64,
    /// The wall-clock instant this tick was stamped with.
    pub timestamp: DateTime<Utc>,
}

/// A spawned task that broadcasts an `Arc<TickEvent>` every period until a
/// shutdown signal is received.
///
/// The first tick is aligned to the next period boundary of the wall clock,
/// so a per-minute clock ticks on the minute rather than at an arbitrary
/// offset from startup.
pub struct SystemClock {
    resolution: TickResolution,
    tick_sender: broadcast::Sender<Arc<TickEvent>>,
}

impl SystemClock {
    /// Creates a new `SystemClock` that publishes on the given channel.
    pub fn new(resolution: TickResolution, tick_sender: broadcast::Sender<Arc<TickEvent>>) -> Self {
        Self {
            resolution,
            tick_sender,
        }
    }

    /// Runs the ticker loop until the shutdown channel fires.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let period = self.resolution.period();
        let start = Instant::now() + delay_until_boundary(Utc::now(), period);
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut tick_count: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    tick_count += 1;
                    let event = Arc::new(TickEvent {
                        tick_count,
                        timestamp: Utc::now(),
                    });
                    // A send error only means nobody is subscribed right now.
                    self.tick_sender.send(event).ok();
                }
            }
        }
        debug!("SystemClock stopped after {} ticks.", tick_count);
    }
}

/// How long to wait so the first tick lands on a wall-clock multiple of
/// `period`. Periods longer than an hour align to the hour.
fn delay_until_boundary(now: DateTime<Utc>, period: Duration) -> Duration {
    let period_ms = period.as_millis().min(3_600_000) as i64;
    if period_ms == 0 {
        return Duration::ZERO;
    }
    let into_period = now.timestamp_millis().rem_euclid(period_ms);
    if into_period == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis((period_ms - into_period) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn boundary_delay_reaches_next_minute() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 42).unwrap();
        let delay = delay_until_boundary(now, Duration::from_secs(60));
        assert_eq!(delay, Duration::from_secs(18));
    }

    #[test]
    fn boundary_delay_is_zero_on_the_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 31, 0).unwrap();
        assert_eq!(
            delay_until_boundary(now, Duration::from_secs(60)),
            Duration::ZERO
        );
    }

    #[test]
    fn boundary_delay_handles_subsecond_periods() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 42).unwrap();
        assert_eq!(
            delay_until_boundary(now, Duration::from_millis(250)),
            Duration::ZERO
        );
    }
}
