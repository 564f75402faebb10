//! Stackdrop - terminal front end
//!
//! Feeds key presses and frame time into the engine and draws the result.

mod input;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use input::{Command, InputHandler};
use ratatui::{backend::CrosstermBackend, Terminal};
use stackdrop::game::{Action, Game, GameEvent, GameState};
use stackdrop::piece::Piece;
use stackdrop::settings::Settings;
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the stackdrop temp directory, creating it if needed
fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("stackdrop");
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: could not create {}: {err}", dir.display());
    }
    dir
}

fn main() -> Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to log file
    let log_dir = temp_dir();
    let log_file = format!("{session_id:08x}.log");
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("stackdrop=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    info!(
        "stackdrop starting up, session={session_id:08x}, log={}",
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Run app and capture result
    let result = terminal
        .clear()
        .map_err(anyhow::Error::from)
        .and_then(|()| run_app(&mut terminal, &mut settings));

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;

    if let Err(err) = settings.save() {
        warn!("could not save settings: {err:#}");
        eprintln!("Warning: Could not save settings: {err:#}");
    }

    let game = result?;
    println!("\nThanks for playing stackdrop!");
    println!("Final Score: {}", game.score.points);
    println!("Level: {} | Lines: {}", game.score.level, game.score.lines);
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
) -> Result<Game> {
    let mut game = Game::with_config(settings.engine_config());
    let mut input = InputHandler::from_settings(settings);
    let mut last_frame = Instant::now();
    let mut redraw = true;
    let mut shown: Option<Piece> = None;

    loop {
        // The grid flag is consumed here; piece motion is checked separately
        let piece_moved = shown != game.current_piece;
        if game.board.take_dirty() || piece_moved || game.is_animating() || redraw {
            terminal.draw(|frame| ui::render_game(frame, &game, settings))?;
            shown = game.current_piece.clone();
            redraw = false;
        }

        // Handle input
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Release => input.key_up(key),
                Event::Key(key) => {
                    for command in input.key_down(key) {
                        match command {
                            Command::Quit => return Ok(game),
                            Command::Play(action) => {
                                if !game.process_action(action) {
                                    debug!(?action, "rejected");
                                }
                                if matches!(action, Action::Pause | Action::Reset) {
                                    input.clear();
                                }
                            }
                            Command::ToggleAnimations => {
                                settings.visual.animations = !settings.visual.animations;
                                game.set_animations(settings.visual.animations);
                            }
                            Command::CyclePalette => {
                                settings.visual.palette = settings.visual.palette.next();
                                game.set_palette(settings.visual.palette);
                            }
                        }
                        redraw = true;
                    }
                }
                Event::Resize(..) => redraw = true,
                _ => {}
            }
        }

        // Held keys repeat no slower than gravity
        if game.state == GameState::Playing {
            for command in input.update(game.drop_time()) {
                if let Command::Play(action) = command {
                    game.process_action(action);
                }
            }
        }

        let now = Instant::now();
        game.tick(now.duration_since(last_frame));
        last_frame = now;

        for event in game.drain_events() {
            match event {
                GameEvent::LinesCleared { count, rows } => {
                    info!(count, ?rows, score = game.score.points, "lines cleared");
                }
                GameEvent::LevelChanged { level, drop_time } => {
                    info!(level, ?drop_time, "level up");
                }
                GameEvent::GameOver => {
                    info!(score = game.score.points, lines = game.score.lines, "game over");
                    input.clear();
                }
                GameEvent::Moved | GameEvent::Rotated | GameEvent::Locked { .. } => {}
            }
            redraw = true;
        }
    }
}
