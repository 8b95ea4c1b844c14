use log::{debug, info};

use crate::audio::SoundEvent;
use crate::constants::*;
use crate::entities::{Asteroid, AsteroidSize, Bullet, Ship, Ufo, UfoType};
use crate::error::{GameError, GameResult};
use crate::pool::SlotPool;
use crate::rng::{ClockRng, RandomSource};
use crate::types::{Bounds, Vector2D, wrap_position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// What the player asked for this frame. Continuous intents (thrust, rotation) are
/// re-sampled every frame; the rest are edge-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub thrust: bool,
    pub rotation: f64, // -1 left, 0 none, +1 right
    pub fire: bool,
    pub hyperspace: bool,
    pub pause: bool,
    pub confirm: bool,
}

pub struct GameState {
    pub ship: Ship,
    pub asteroids: SlotPool<Asteroid, MAX_ASTEROIDS>,
    pub bullets: SlotPool<Bullet, MAX_BULLETS>,
    pub ufos: SlotPool<Ufo, MAX_UFOS>,

    pub phase: GamePhase,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub asteroid_count: u32,

    pub bounds: Bounds,

    pub ufo_spawn_timer: f64,
    pub next_ufo_spawn: f64,

    pub fire_delay: f64,
    pub next_level_delay: f64,
    pub respawn_delay: f64,

    pub showing_high_score: bool,

    pub(crate) rng: Box<dyn RandomSource>,
    pub(crate) sounds: Vec<SoundEvent>,
}

/// Large rocks dealt at the start of `level`.
pub fn level_asteroid_count(level: u32) -> u32 {
    (INITIAL_ASTEROIDS + level.saturating_sub(1) * ASTEROIDS_PER_LEVEL).min(MAX_LEVEL_ASTEROIDS)
}

/// Seconds between saucer spawns on `level`.
pub fn ufo_spawn_threshold(level: u32) -> f64 {
    (UFO_BASE_SPAWN_TIME - level as f64 * UFO_SPAWN_TIME_PER_LEVEL).max(UFO_MIN_SPAWN_TIME)
}

fn validate_bounds(width: f64, height: f64) -> GameResult<Bounds> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(GameError::InvalidBounds { width, height });
    }
    Ok(Bounds::new(width, height))
}

impl GameState {
    pub fn new(width: f64, height: f64, rng: Box<dyn RandomSource>) -> GameResult<Self> {
        let bounds = validate_bounds(width, height)?;
        Ok(GameState {
            ship: Ship::new(bounds.center()),
            asteroids: SlotPool::new(),
            bullets: SlotPool::new(),
            ufos: SlotPool::new(),
            phase: GamePhase::Menu,
            score: 0,
            high_score: 0,
            level: 0,
            asteroid_count: 0,
            bounds,
            ufo_spawn_timer: 0.0,
            next_ufo_spawn: UFO_BASE_SPAWN_TIME,
            fire_delay: 0.0,
            next_level_delay: 0.0,
            respawn_delay: 0.0,
            showing_high_score: false,
            rng,
            sounds: Vec::new(),
        })
    }

    /// Production constructor: clock-seeded randomness.
    pub fn with_clock_rng(width: f64, height: f64) -> GameResult<Self> {
        GameState::new(width, height, Box::new(ClockRng::new()))
    }

    /// Follows a resized display. Degenerate sizes are ignored.
    pub fn set_bounds(&mut self, width: f64, height: f64) {
        match validate_bounds(width, height) {
            Ok(bounds) if bounds != self.bounds => {
                info!("Play field resized to {:.0}x{:.0}", width, height);
                self.bounds = bounds;
            }
            Ok(_) => {}
            Err(e) => debug!("Ignoring resize: {}", e),
        }
    }

    /// Sound triggers queued since the last call.
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    pub fn start_new_game(&mut self) {
        self.score = 0;
        self.level = 1;
        self.asteroid_count = 0;
        self.ufo_spawn_timer = 0.0;
        self.next_ufo_spawn = UFO_BASE_SPAWN_TIME;
        self.fire_delay = 0.0;
        self.next_level_delay = 0.0;
        self.respawn_delay = 0.0;

        self.ship = Ship::new(self.bounds.center());

        self.asteroids.clear();
        self.bullets.clear();
        self.ufos.clear();

        self.start_new_level();
        self.phase = GamePhase::Playing;
        info!("New game started (high score {})", self.high_score);
    }

    pub fn start_new_level(&mut self) {
        let count = level_asteroid_count(self.level);
        // The live count is added onto, not reset.
        self.spawn_asteroids(count);

        self.next_ufo_spawn = ufo_spawn_threshold(self.level);
        self.ufo_spawn_timer = 0.0;
        info!(
            "Level {} begins with {} asteroids, saucer every {:.0}s",
            self.level, count, self.next_ufo_spawn
        );
    }

    /// Deals up to `count` large rocks into free slots, each at least
    /// `SPAWN_EXCLUSION_RADIUS` away from the ship.
    pub fn spawn_asteroids(&mut self, count: u32) {
        // Tiny fields shrink the exclusion zone so a valid spot always exists.
        let exclusion = SPAWN_EXCLUSION_RADIUS.min(self.farthest_corner_distance() / 2.0);
        let mut spawned = 0;
        for slot in self.asteroids.slots_mut().iter_mut() {
            if spawned >= count {
                break;
            }
            if slot.is_active {
                continue;
            }
            let position = loop {
                let candidate = Vector2D::new(
                    self.rng.float(0.0, self.bounds.width),
                    self.rng.float(0.0, self.bounds.height),
                );
                if candidate.distance(self.ship.position) >= exclusion {
                    break candidate;
                }
            };
            *slot = Asteroid::new(position, AsteroidSize::Large, self.rng.as_mut());
            spawned += 1;
            self.asteroid_count += 1;
        }
    }

    fn farthest_corner_distance(&self) -> f64 {
        let Bounds { width, height } = self.bounds;
        [(0.0, 0.0), (width, 0.0), (0.0, height), (width, height)]
            .into_iter()
            .map(|(x, y)| Vector2D::new(x, y).distance(self.ship.position))
            .fold(0.0, f64::max)
    }

    pub fn spawn_ufo(&mut self) {
        let Some(index) = self.ufos.first_free() else {
            return;
        };
        let ufo_type = if self.score < UFO_SMALL_SCORE_THRESHOLD || self.rng.int(0, 2) == 0 {
            UfoType::Large
        } else {
            UfoType::Small
        };
        self.ufos.slots_mut()[index] = Ufo::new(ufo_type, self.bounds, self.rng.as_mut());
        self.sounds.push(SoundEvent::UfoSpawn);
        info!("{:?} saucer entering in slot {}", ufo_type, index);
    }

    pub fn fire_bullet(&mut self) {
        if self.fire_delay > 0.0 || !self.ship.is_alive {
            return;
        }
        if let Some(index) = self.bullets.first_free() {
            self.bullets.slots_mut()[index] = Bullet::new(self.ship.nose(), self.ship.rotation, true);
            self.fire_delay = FIRE_DELAY;
            self.sounds.push(SoundEvent::Shoot);
        }
    }

    pub fn hyperspace(&mut self) {
        if !self.ship.is_alive {
            return;
        }
        self.ship.hyperspace_jump(self.bounds, self.rng.as_mut());
        self.sounds.push(SoundEvent::Hyperspace);
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            info!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            info!("Resumed");
        }
    }

    pub fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        info!("Game over at level {} with score {}", self.level, self.score);
    }

    /// Routes one frame of player intent into the state machine.
    pub fn apply_controls(&mut self, controls: &Controls) {
        match self.phase {
            GamePhase::Menu => {
                if controls.confirm {
                    self.start_new_game();
                }
            }
            GamePhase::Playing => {
                self.ship.clear_controls();
                if controls.thrust {
                    self.ship.thrust();
                }
                if controls.rotation != 0.0 {
                    self.ship.rotate(controls.rotation.signum());
                }
                if controls.fire {
                    self.fire_bullet();
                }
                if controls.hyperspace {
                    self.hyperspace();
                }
                if controls.pause {
                    self.pause();
                }
            }
            GamePhase::Paused => {
                if controls.pause {
                    self.resume();
                }
            }
            GamePhase::GameOver => {
                if controls.confirm {
                    self.showing_high_score = false;
                    self.start_new_game();
                }
            }
        }
    }

    /// Advances the simulation by `dt` seconds. Only the playing phase moves anything.
    pub fn simulate(&mut self, dt: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }

        self.ship.update(dt);
        wrap_position(&mut self.ship.position, self.bounds);

        for asteroid in self.asteroids.slots_mut() {
            asteroid.update(dt, self.bounds);
        }
        for bullet in self.bullets.slots_mut() {
            bullet.update(dt, self.bounds);
        }
        for ufo in self.ufos.slots_mut() {
            ufo.update(dt, &self.ship, self.bullets.slots_mut(), self.bounds, self.rng.as_mut());
        }

        self.ufo_spawn_timer += dt;
        if self.ufo_spawn_timer > self.next_ufo_spawn {
            self.spawn_ufo();
            self.ufo_spawn_timer = 0.0;
        }

        if self.fire_delay > 0.0 {
            self.fire_delay -= dt;
        }

        self.check_collisions();

        if self.asteroid_count == 0 {
            self.next_level_delay += dt;
            if self.next_level_delay > NEXT_LEVEL_DELAY {
                self.level += 1;
                self.start_new_level();
                self.next_level_delay = 0.0;
            }
        }

        self.handle_ship_death(dt);
    }

    fn handle_ship_death(&mut self, dt: f64) {
        if self.ship.is_alive {
            return;
        }

        if self.respawn_delay <= 0.0 {
            self.ship.lives = self.ship.lives.saturating_sub(1);
            self.respawn_delay = RESPAWN_DELAY;
            info!("Ship lost, {} lives left", self.ship.lives);
            return;
        }

        self.respawn_delay -= dt;
        if self.respawn_delay <= 0.0 {
            self.respawn_delay = 0.0;
            if self.ship.lives > 0 {
                self.ship.respawn(self.bounds.center());
                info!("Ship respawned");
            } else {
                self.game_over();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn game() -> GameState {
        GameState::new(1024.0, 768.0, Box::new(StdRng::seed_from_u64(99))).unwrap()
    }

    #[test]
    fn rejects_degenerate_field() {
        let rng = || Box::new(StdRng::seed_from_u64(1));
        assert!(GameState::new(0.0, 600.0, rng()).is_err());
        assert!(GameState::new(800.0, -1.0, rng()).is_err());
        assert!(GameState::new(f64::NAN, 600.0, rng()).is_err());
    }

    #[test]
    fn starts_in_menu_and_idles() {
        let mut game = game();
        assert_eq!(game.phase, GamePhase::Menu);
        game.simulate(1.0);
        assert_eq!(game.asteroids.active_count(), 0);
    }

    #[test]
    fn level_table() {
        assert_eq!(level_asteroid_count(1), 4);
        assert_eq!(level_asteroid_count(2), 6);
        assert_eq!(level_asteroid_count(5), 12);
        assert_eq!(level_asteroid_count(9), 12);
        assert_eq!(ufo_spawn_threshold(1), 18.0);
        assert_eq!(ufo_spawn_threshold(4), 12.0);
        assert_eq!(ufo_spawn_threshold(7), 10.0);
    }

    #[test]
    fn new_game_keeps_rocks_clear_of_ship() {
        let mut game = game();
        game.start_new_game();
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.asteroid_count, 4);
        for rock in game.asteroids.active() {
            assert_eq!(rock.size, AsteroidSize::Large);
            assert!(rock.position.distance(game.ship.position) >= SPAWN_EXCLUSION_RADIUS);
        }
        assert_eq!(game.next_ufo_spawn, 18.0);
    }

    #[test]
    fn pause_and_resume_need_the_right_phase() {
        let mut game = game();
        game.resume();
        assert_eq!(game.phase, GamePhase::Menu);
        game.pause();
        assert_eq!(game.phase, GamePhase::Menu);
        game.start_new_game();
        game.resume();
        assert_eq!(game.phase, GamePhase::Playing);
        game.pause();
        assert_eq!(game.phase, GamePhase::Paused);
        let before = game.asteroids.slots()[0].position;
        game.simulate(0.5);
        assert_eq!(game.asteroids.slots()[0].position, before);
        game.resume();
        assert_eq!(game.phase, GamePhase::Playing);
    }

    #[test]
    fn controls_reset_each_frame() {
        let mut game = game();
        game.start_new_game();
        game.apply_controls(&Controls { thrust: true, rotation: -1.0, ..Controls::default() });
        assert!(game.ship.is_thrusting);
        assert_eq!(game.ship.rotation_speed, -SHIP_ROTATION_SPEED);
        game.apply_controls(&Controls::default());
        assert!(!game.ship.is_thrusting);
        assert_eq!(game.ship.rotation_speed, 0.0);
    }

    #[test]
    fn fire_respects_cooldown_and_queues_sound() {
        let mut game = game();
        game.start_new_game();
        game.fire_bullet();
        game.fire_bullet();
        assert_eq!(game.bullets.active_count(), 1);
        assert_eq!(game.drain_sounds(), vec![SoundEvent::Shoot]);
        game.fire_delay = 0.0;
        game.fire_bullet();
        assert_eq!(game.bullets.active_count(), 2);
    }

    #[test]
    fn bullet_leaves_from_the_nose() {
        let mut game = game();
        game.start_new_game();
        game.fire_bullet();
        let bullet = game.bullets.slots()[0];
        let center = game.bounds.center();
        assert!((bullet.position.y - (center.y - SHIP_SIZE)).abs() < 1e-9);
        assert!(bullet.from_player);
    }

    #[test]
    fn full_bullet_pool_drops_shot() {
        let mut game = game();
        game.start_new_game();
        for slot in game.bullets.slots_mut() {
            *slot = Bullet::new(Vector2D::new(1.0, 1.0), 0.0, false);
        }
        game.fire_bullet();
        assert_eq!(game.fire_delay, 0.0);
        assert!(game.drain_sounds().is_empty());
    }

    #[test]
    fn ufo_spawns_after_threshold() {
        let mut game = game();
        game.start_new_game();
        game.ship.invulnerable_time = 1000.0;
        game.ufo_spawn_timer = game.next_ufo_spawn;
        game.simulate(0.01);
        assert_eq!(game.ufos.active_count(), 1);
        assert_eq!(game.ufos.slots()[0].ufo_type, UfoType::Large);
        assert_eq!(game.ufo_spawn_timer, 0.0);
        assert!(game.drain_sounds().contains(&SoundEvent::UfoSpawn));
    }

    #[test]
    fn ufo_spawn_skipped_when_slots_full() {
        let mut game = game();
        game.start_new_game();
        game.spawn_ufo();
        game.spawn_ufo();
        game.spawn_ufo();
        assert_eq!(game.ufos.active_count(), MAX_UFOS);
    }

    #[test]
    fn hyperspace_needs_a_living_ship() {
        let mut game = game();
        game.start_new_game();
        game.ship.is_alive = false;
        let before = game.ship.position;
        game.hyperspace();
        assert_eq!(game.ship.position, before);
        game.ship.is_alive = true;
        game.hyperspace();
        assert_eq!(game.drain_sounds(), vec![SoundEvent::Hyperspace]);
    }

    #[test]
    fn resize_updates_bounds() {
        let mut game = game();
        game.set_bounds(640.0, 480.0);
        assert_eq!(game.bounds, Bounds::new(640.0, 480.0));
        game.set_bounds(0.0, 480.0);
        assert_eq!(game.bounds, Bounds::new(640.0, 480.0));
    }

    #[test]
    fn tiny_field_still_deals_rocks() {
        let mut game = GameState::new(40.0, 32.0, Box::new(StdRng::seed_from_u64(5))).unwrap();
        game.start_new_game();
        assert_eq!(game.asteroids.active_count(), 4);
    }
}
