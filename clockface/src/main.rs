use anyhow::Result;
use clockface::prelude::*;
use colored::Colorize;
use tracing::info;

/// A surface that writes committed text to stdout and delegates animation
/// playback to the driver.
struct ConsoleSurface {
    driver: AnimationDriver,
    text: Option<String>,
}

impl TextSurface for ConsoleSurface {
    fn current_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
        for line in text.lines() {
            println!("    {}", line.cyan().bold());
        }
    }

    fn set_max_lines(&mut self, lines: usize) {
        info!("Line budget is now {}.", lines);
    }

    fn play_animation(&mut self, animation: AnimationId) {
        self.driver.play(animation);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    // 2. Create a custom configuration for the engine.
    let config = ClockfaceConfig {
        resolution: TickResolution::Second,
        face: FaceConfig::Digital { show_seconds: true },
        ..Default::default()
    };

    // 3. Create the engine over a console-backed surface.
    let engine = ClockfaceEngine::new(config, |driver, _pair| ConsoleSurface {
        driver,
        text: None,
    });

    // 4. Spawn concurrent tasks to listen to the event streams.
    spawn_event_listeners(&engine);

    // 5. Run the engine.
    engine.run().await?;

    Ok(())
}

/// Spawns tasks subscribing to the engine's event streams.
fn spawn_event_listeners(engine: &ClockfaceEngine<ConsoleSurface>) {
    let mut display_rx = engine.subscribe_display_events();
    tokio::spawn(async move {
        while let Ok(event) = display_rx.recv().await {
            info!("[DISPLAY] => {:?}", event);
        }
    });

    let mut tick_rx = engine.subscribe_tick_events();
    tokio::spawn(async move {
        while let Ok(tick) = tick_rx.recv().await {
            if tick.tick_count % 10 == 0 {
                info!("[TICK] => #{}", tick.tick_count);
            }
        }
    });
}
