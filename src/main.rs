use std::io;
use std::process;

use clap::Parser;
use log::{error, info};

use vibe_asteroids::app::App;
use vibe_asteroids::audio::{AudioContext, TerminalBell};
use vibe_asteroids::config::{Config, world_size};
use vibe_asteroids::error::GameResult;
use vibe_asteroids::game::GameState;
use vibe_asteroids::rendering::{OutputTarget, ScreenBuffer};
use vibe_asteroids::terminal_io::{SimulatedInput, TerminalEvents, TerminalSession};

fn main() {
    let config = Config::parse();
    if let Err(e) = simple_logging::log_to_file(&config.log_file, config.log_level) {
        eprintln!("Failed to open log file {}: {}", config.log_file.display(), e);
        process::exit(1);
    }
    info!("Starting vibe-asteroids with {:?}", config);

    if let Err(e) = run(&config) {
        error!("Fatal: {}", e);
        eprintln!("vibe-asteroids: {}", e);
        process::exit(1);
    }
    info!("Exiting vibe-asteroids.");
}

fn run(config: &Config) -> GameResult<()> {
    let (cols, rows) = if config.debug {
        info!("Debug resolution set to {}x{}", config.width, config.height);
        (config.width, config.height)
    } else {
        crossterm::terminal::size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?
    };

    // The world is built before the terminal is touched, so a bad size exits cleanly.
    let (width, height) = world_size(cols, rows);
    let state = GameState::with_clock_rng(width, height)?;

    let frames = if config.debug {
        let mut app = App::new(
            state,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(cols, rows)),
            SimulatedInput::demo_track(),
            AudioContext::new(TerminalBell::new(false)),
            (cols, rows),
            config.frame_budget(),
            Some(config.frames.unwrap_or(180)),
        );
        app.run()?
    } else {
        let _session = TerminalSession::enter()?;
        let mut app = App::new(
            state,
            OutputTarget::Stdout(io::stdout()),
            TerminalEvents,
            AudioContext::new(TerminalBell::new(!config.mute)),
            (cols, rows),
            config.frame_budget(),
            config.frames,
        );
        app.run()?
    };
    info!("Played {} frames.", frames);
    Ok(())
}
