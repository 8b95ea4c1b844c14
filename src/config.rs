use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use crate::constants::{CELL_HEIGHT, CELL_WIDTH, DEFAULT_FPS};

/// Command-line configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "vibe-asteroids", version, about = "Asteroids in the terminal")]
pub struct Config {
    /// Run headless into an in-memory screen with a scripted input track.
    #[arg(long)]
    pub debug: bool,

    /// Screen width in cells for --debug runs.
    #[arg(long, default_value_t = 80)]
    pub width: u16,

    /// Screen height in cells for --debug runs.
    #[arg(long, default_value_t = 24)]
    pub height: u16,

    /// Stop after this many frames.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Target frame rate.
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Log file path.
    #[arg(long, default_value = "asteroids.log")]
    pub log_file: PathBuf,

    /// Log level (error, warn, info, debug, trace, off).
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Never ring the terminal bell.
    #[arg(long)]
    pub mute: bool,
}

impl Config {
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}

/// World extent covered by a terminal of `cols` x `rows` cells.
pub fn world_size(cols: u16, rows: u16) -> (f64, f64) {
    (cols as f64 * CELL_WIDTH, rows as f64 * CELL_HEIGHT)
}
