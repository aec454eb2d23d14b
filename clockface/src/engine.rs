//! The engine that wires the clock, the notifier channels and the surface
//! into the display state machine.

use crate::animation::{register_pair, AnimationPair, AnimationSet};
use crate::config::ClockfaceConfig;
use crate::controller::ClockTextController;
use crate::events::{ClockSignal, DisplayEvent, SurfaceEvent};
use crate::surface::{AnimationDriver, TextSurface};
use crate::time::{SystemClock, TickEvent};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, trace};

/// The main Clockface engine.
///
/// This struct is the central point of control. It owns the event channels,
/// spawns the `SystemClock`, and drives the dispatcher loop that feeds
/// ticks, notifier signals and animation completions into the display state
/// machine one event at a time. The `Engine` is designed to be cloned and
/// shared across tasks, providing a handle to the running instance.
pub struct ClockfaceEngine<S: TextSurface> {
    config: Arc<ClockfaceConfig>,
    controller: Arc<RwLock<ClockTextController<S>>>,
    tick_sender: broadcast::Sender<Arc<TickEvent>>,
    signal_sender: broadcast::Sender<ClockSignal>,
    surface_sender: broadcast::Sender<SurfaceEvent>,
    display_sender: broadcast::Sender<DisplayEvent>,
    shutdown_sender: broadcast::Sender<()>,
}

impl<S: TextSurface> Clone for ClockfaceEngine<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            controller: self.controller.clone(),
            tick_sender: self.tick_sender.clone(),
            signal_sender: self.signal_sender.clone(),
            surface_sender: self.surface_sender.clone(),
            display_sender: self.display_sender.clone(),
            shutdown_sender: self.shutdown_sender.clone(),
        }
    }
}

// Core implementation block for construction and the event loop.
impl<S: TextSurface + Send + Sync + 'static> ClockfaceEngine<S> {
    /// Creates a new `ClockfaceEngine` with the given configuration.
    ///
    /// The surface is built by `make_surface`, which receives the
    /// [`AnimationDriver`] for asynchronous animation playback and the
    /// [`AnimationPair`] the controller will ask it to play.
    pub fn new<F>(config: ClockfaceConfig, make_surface: F) -> Self
    where
        F: FnOnce(AnimationDriver, AnimationPair) -> S,
    {
        const CHANNEL_CAPACITY: usize = 256;
        let (tick_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (signal_sender, _) = broadcast::channel(64);
        let (surface_sender, _) = broadcast::channel(64);
        let (display_sender, _) = broadcast::channel(64);
        let (shutdown_sender, _) = broadcast::channel(1);

        let mut animations = AnimationSet::with_key();
        let pair = register_pair(&mut animations, &config.animation);
        let driver = AnimationDriver::new(Arc::new(animations), surface_sender.clone());
        let surface = make_surface(driver, pair);

        let controller = ClockTextController::new(
            surface,
            config.face.build(),
            pair,
            config.timezone,
            config.animation.enabled,
        );

        Self {
            config: Arc::new(config),
            controller: Arc::new(RwLock::new(controller)),
            tick_sender,
            signal_sender,
            surface_sender,
            display_sender,
            shutdown_sender,
        }
    }

    /// Runs the engine until a Ctrl+C signal or an explicit [`shutdown`]
    /// call is received.
    ///
    /// This method will:
    /// 1. Spawn the `SystemClock` task.
    /// 2. Spawn the dispatcher task that feeds events into the controller.
    /// 3. Wait for a shutdown trigger and broadcast it to all tasks.
    ///
    /// [`shutdown`]: ClockfaceEngine::shutdown
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("ClockfaceEngine starting up...");

        let clock = SystemClock::new(self.config.resolution.clone(), self.tick_sender.clone());
        let clock_shutdown_rx = self.shutdown_sender.subscribe();
        tokio::spawn(async move { clock.run(clock_shutdown_rx).await });

        let dispatcher = self.clone();
        let dispatcher_shutdown_rx = self.shutdown_sender.subscribe();
        tokio::spawn(async move { dispatcher.dispatcher_loop(dispatcher_shutdown_rx).await });

        info!(
            "Engine running at {:?}. Press Ctrl+C to shut down.",
            self.config.resolution
        );
        let mut shutdown_rx = self.shutdown_sender.subscribe();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Broadcasting to all tasks...");
                self.shutdown_sender.send(()).ok();
            }
            _ = shutdown_rx.recv() => {}
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        info!("ClockfaceEngine has shut down.");
        Ok(())
    }

    #[doc(hidden)]
    async fn dispatcher_loop(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut tick_rx = self.tick_sender.subscribe();
        let mut signal_rx = self.signal_sender.subscribe();
        let mut surface_rx = self.surface_sender.subscribe();

        self.controller
            .write()
            .await
            .attach(Utc::now(), &self.display_sender);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                Ok(tick) = tick_rx.recv() => {
                    trace!("Tick #{} received.", tick.tick_count);
                    self.controller
                        .write()
                        .await
                        .handle_signal(&ClockSignal::Tick(tick), &self.display_sender);
                }
                Ok(signal) = signal_rx.recv() => {
                    self.controller
                        .write()
                        .await
                        .handle_signal(&signal, &self.display_sender);
                }
                Ok(event) = surface_rx.recv() => {
                    match event {
                        SurfaceEvent::AnimationFinished { animation } => {
                            self.controller
                                .write()
                                .await
                                .animation_finished(animation, &self.display_sender);
                        }
                    }
                }
            }
        }
        self.controller.write().await.detach();
    }
}

// Public API implementation block.
impl<S: TextSurface + Send + Sync + 'static> ClockfaceEngine<S> {
    /// Attaches the widget, showing the current time immediately. No-op if
    /// already attached. The dispatcher attaches automatically on startup.
    pub async fn attach(&self) {
        self.controller
            .write()
            .await
            .attach(Utc::now(), &self.display_sender);
    }

    /// Detaches the widget; subsequent signals are ignored until the next
    /// attach. No-op if already detached.
    pub async fn detach(&self) {
        self.controller.write().await.detach();
    }

    /// Pins the display to the given zone id, or reverts to following the
    /// system zone when `None`. Takes effect immediately.
    pub async fn set_time_zone(&self, zone: Option<&str>) {
        self.controller
            .write()
            .await
            .set_time_zone(zone, &self.display_sender);
    }

    /// Toggles the animated transition path for future text changes.
    pub async fn set_animations_enabled(&self, enabled: bool) {
        self.controller.write().await.set_animations_enabled(enabled);
    }

    /// The last text committed to the surface.
    pub async fn current_text(&self) -> String {
        self.controller.read().await.current_text().to_string()
    }

    /// Injects a time-changed notification, e.g. after the wall clock was
    /// adjusted.
    pub fn notify_time_changed(&self) {
        self.signal_sender
            .send(ClockSignal::TimeChanged {
                timestamp: Utc::now(),
            })
            .ok();
    }

    /// Injects a system timezone-change notification. Ignored for zone
    /// selection while an explicit override is pinned.
    pub fn notify_timezone_changed(&self, zone_id: &str) {
        self.signal_sender
            .send(ClockSignal::TimezoneChanged {
                zone_id: zone_id.to_string(),
                timestamp: Utc::now(),
            })
            .ok();
    }

    /// Subscribes to the `DisplayEvent` stream.
    pub fn subscribe_display_events(&self) -> broadcast::Receiver<DisplayEvent> {
        self.display_sender.subscribe()
    }

    /// Subscribes to the raw tick stream.
    pub fn subscribe_tick_events(&self) -> broadcast::Receiver<Arc<TickEvent>> {
        self.tick_sender.subscribe()
    }

    /// Stops a running engine.
    pub fn shutdown(&self) {
        self.shutdown_sender.send(()).ok();
    }
}
