// --- Pool Capacities ---
pub const MAX_ASTEROIDS: usize = 28;
pub const MAX_BULLETS: usize = 32;
pub const MAX_UFOS: usize = 2;

// --- Ship ---
pub const SHIP_SIZE: f64 = 10.0;
pub const SHIP_THRUST_POWER: f64 = 250.0; // Units per second squared
pub const SHIP_ROTATION_SPEED: f64 = 250.0; // Degrees per second
pub const SHIP_MAX_SPEED: f64 = 400.0;
pub const SHIP_DRAG: f64 = 0.99; // Applied once per frame
pub const SHIP_INVULNERABLE_TIME: f64 = 3.0; // Seconds
pub const SHIP_STARTING_LIVES: u32 = 3;

// --- Bullets ---
pub const BULLET_SPEED: f64 = 500.0;
pub const BULLET_LIFETIME: f64 = 1.2; // Seconds
pub const BULLET_RADIUS: f64 = 2.0;

// --- Asteroids ---
pub const ASTEROID_LARGE_RADIUS: f64 = 40.0;
pub const ASTEROID_MEDIUM_RADIUS: f64 = 25.0;
pub const ASTEROID_SMALL_RADIUS: f64 = 15.0;
pub const ASTEROID_SPEED_MIN: f64 = 20.0;
pub const ASTEROID_SPEED_MAX: f64 = 100.0;
pub const ASTEROID_SPLIT_SPEED_FACTOR: f64 = 1.5;
pub const ASTEROID_ROTATION_SPEED_MAX: f64 = 100.0; // Degrees per second, either direction
pub const ASTEROID_MIN_VERTICES: i32 = 8;
pub const ASTEROID_MAX_VERTICES: i32 = 12;
pub const ASTEROID_JITTER_MIN: f64 = 0.8;
pub const ASTEROID_JITTER_MAX: f64 = 1.2;

// --- UFOs ---
pub const UFO_LARGE_SPEED: f64 = 100.0;
pub const UFO_SMALL_SPEED: f64 = 150.0;
pub const UFO_SIZE: f64 = 20.0;
pub const UFO_SMALL_DRAW_SCALE: f64 = 0.6;
pub const UFO_SHOOT_INTERVAL: f64 = 1.5; // Seconds
pub const UFO_STEER_INTERVAL: f64 = 0.5; // Small UFOs only
pub const UFO_STEER_SPEED_MAX: f64 = 50.0;
pub const UFO_LANE_MIN: f64 = 0.2; // Fraction of screen height
pub const UFO_LANE_MAX: f64 = 0.8;
pub const UFO_SMALL_SCORE_THRESHOLD: u32 = 10_000;

// --- Director ---
pub const INITIAL_ASTEROIDS: u32 = 4;
pub const ASTEROIDS_PER_LEVEL: u32 = 2;
pub const MAX_LEVEL_ASTEROIDS: u32 = 12;
pub const UFO_BASE_SPAWN_TIME: f64 = 20.0;
pub const UFO_SPAWN_TIME_PER_LEVEL: f64 = 2.0;
pub const UFO_MIN_SPAWN_TIME: f64 = 10.0;
pub const FIRE_DELAY: f64 = 0.25;
pub const NEXT_LEVEL_DELAY: f64 = 2.0;
pub const RESPAWN_DELAY: f64 = 2.0;
pub const SPAWN_EXCLUSION_RADIUS: f64 = 100.0; // New rocks keep this far from the ship

// --- Scoring ---
pub const SCORE_LARGE_ASTEROID: u32 = 20;
pub const SCORE_MEDIUM_ASTEROID: u32 = 50;
pub const SCORE_SMALL_ASTEROID: u32 = 100;
pub const SCORE_LARGE_UFO: u32 = 200;
pub const SCORE_SMALL_UFO: u32 = 1000;

// --- Terminal ---
pub const CELL_WIDTH: f64 = 8.0; // World units per terminal column
pub const CELL_HEIGHT: f64 = 16.0; // Terminal characters are roughly twice as tall as wide
pub const DEFAULT_FPS: u32 = 60;
pub const MAX_FRAME_TIME: f64 = 0.1; // Longer stalls are simulated as one 100ms step
pub const KEY_HOLD_WINDOW_MS: u64 = 600; // Held key expires without a repeat/release event
pub const INVULNERABLE_BLINK_RATE: f64 = 10.0; // Blink phases per second
