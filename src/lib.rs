pub mod app;
pub mod audio;
pub mod collisions;
pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod game;
pub mod pool;
pub mod rendering;
pub mod rng;
pub mod terminal_io;
pub mod types;

pub use error::{GameError, GameResult};
pub use game::{Controls, GamePhase, GameState};
