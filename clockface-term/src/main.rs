use anyhow::Result;
use clockface::prelude::*;
use clockface::{ENGINE_NAME, VERSION as LIB_VERSION};
use colored::Colorize;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// A watch face rendered into the terminal's alternate screen.
///
/// Lines are centered inside the line budget's box. During the exit
/// animation the outgoing text is dimmed; the enter animation restores the
/// normal style on the incoming text.
struct TerminalSurface {
    driver: AnimationDriver,
    animations: AnimationPair,
    text: Option<String>,
    max_lines: usize,
    dimmed: bool,
}

impl TerminalSurface {
    fn new(driver: AnimationDriver, animations: AnimationPair) -> Self {
        Self {
            driver,
            animations,
            text: None,
            max_lines: 0,
            dimmed: false,
        }
    }

    fn redraw(&self) {
        let mut stdout = io::stdout();
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        execute!(stdout, Clear(ClearType::All)).ok();
        let Some(text) = self.text.as_deref() else {
            stdout.flush().ok();
            return;
        };
        // Center the budget's box, not the current line count, so the text
        // does not jump vertically between same-budget updates.
        let budget = self.max_lines.max(1) as u16;
        let top = rows.saturating_sub(budget) / 2;
        for (row, line) in text.lines().enumerate() {
            let width = line.chars().count() as u16;
            let col = cols.saturating_sub(width) / 2;
            execute!(stdout, MoveTo(col, top + row as u16)).ok();
            if self.dimmed {
                print!("{}", line.dimmed());
            } else {
                print!("{}", line.cyan().bold());
            }
        }
        stdout.flush().ok();
    }
}

impl TextSurface for TerminalSurface {
    fn current_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
        self.redraw();
    }

    fn set_max_lines(&mut self, lines: usize) {
        self.max_lines = lines;
    }

    fn play_animation(&mut self, animation: AnimationId) {
        self.dimmed = animation == self.animations.exit;
        self.redraw();
        self.driver.play(animation);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never corrupt the watch face.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // An optional first argument names a TOML config file.
    let config = match env::args().nth(1) {
        Some(path) => ClockfaceConfig::load(&path)?,
        None => ClockfaceConfig {
            face: FaceConfig::Casual,
            ..Default::default()
        },
    };

    eprintln!(
        "{} v{}  {}",
        ENGINE_NAME.cyan().bold(),
        LIB_VERSION,
        "Ctrl+C to exit".dimmed()
    );
    tracing::info!("Starting terminal watch face.");

    execute!(io::stdout(), EnterAlternateScreen, Hide)?;
    let engine = ClockfaceEngine::new(config, TerminalSurface::new);
    let result = engine.run().await;
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    result
}
