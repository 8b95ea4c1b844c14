//! Per-tick collision sweep and the score table.
//!
//! Everything here walks the pools in index order and takes the first match,
//! so the outcome of a tick never depends on distances between candidates.

use log::info;

use crate::audio::SoundEvent;
use crate::constants::*;
use crate::entities::{AsteroidSize, UfoType};
use crate::game::GameState;
use crate::types::circles_overlap;

pub fn asteroid_points(size: AsteroidSize) -> u32 {
    match size {
        AsteroidSize::Large => SCORE_LARGE_ASTEROID,
        AsteroidSize::Medium => SCORE_MEDIUM_ASTEROID,
        AsteroidSize::Small => SCORE_SMALL_ASTEROID,
    }
}

pub fn ufo_points(ufo_type: UfoType) -> u32 {
    match ufo_type {
        UfoType::Large => SCORE_LARGE_UFO,
        UfoType::Small => SCORE_SMALL_UFO,
    }
}

impl GameState {
    pub fn update_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            if !self.showing_high_score {
                info!("New high score reached at {}", self.score);
            }
            self.high_score = self.score;
            self.showing_high_score = true;
        }
    }

    pub fn check_collisions(&mut self) {
        for i in 0..MAX_BULLETS {
            if !self.bullets.slots()[i].is_active {
                continue;
            }
            self.resolve_bullet_vs_asteroids(i);
            self.resolve_bullet_vs_ufos(i);
            self.resolve_bullet_vs_ship(i);
        }

        // Both sweeps share one vulnerability check.
        if self.ship.is_alive && !self.ship.is_invulnerable() {
            self.resolve_ship_vs_asteroids();
            self.resolve_ship_vs_ufos();
        }
    }

    fn resolve_bullet_vs_asteroids(&mut self, bullet_index: usize) {
        let bullet = self.bullets.slots()[bullet_index];
        if !bullet.is_active {
            return;
        }

        let hit = self.asteroids.slots().iter().position(|rock| {
            rock.is_active && circles_overlap(bullet.position, BULLET_RADIUS, rock.position, rock.radius)
        });
        let Some(j) = hit else {
            return;
        };

        let size = self.asteroids.slots()[j].size;
        if bullet.from_player {
            self.update_score(asteroid_points(size));
        }

        if size != AsteroidSize::Small {
            // Both children or neither: with only one free slot the split is dropped.
            if let Some((k, l)) = self.asteroids.first_two_free() {
                let parent = self.asteroids.slots()[j].clone();
                let (child1, child2) = self.asteroids.pair_mut(k, l);
                parent.split(child1, child2, self.rng.as_mut());
                self.asteroid_count += 2;
            }
        }

        self.asteroids.slots_mut()[j].destroy();
        self.bullets.slots_mut()[bullet_index].destroy();
        self.sounds.push(SoundEvent::Explosion);
        self.asteroid_count = self.asteroid_count.saturating_sub(1);
    }

    fn resolve_bullet_vs_ufos(&mut self, bullet_index: usize) {
        let bullet = self.bullets.slots()[bullet_index];
        if !bullet.is_active || !bullet.from_player {
            return;
        }

        let hit = self.ufos.slots().iter().position(|ufo| {
            ufo.is_active && circles_overlap(bullet.position, BULLET_RADIUS, ufo.position, UFO_SIZE)
        });
        let Some(j) = hit else {
            return;
        };

        self.update_score(ufo_points(self.ufos.slots()[j].ufo_type));
        self.ufos.slots_mut()[j].destroy();
        self.bullets.slots_mut()[bullet_index].destroy();
        self.sounds.push(SoundEvent::Explosion);
    }

    fn resolve_bullet_vs_ship(&mut self, bullet_index: usize) {
        let bullet = self.bullets.slots()[bullet_index];
        if !bullet.is_active || bullet.from_player {
            return;
        }
        if !self.ship.is_alive || self.ship.is_invulnerable() {
            return;
        }

        if circles_overlap(bullet.position, BULLET_RADIUS, self.ship.position, SHIP_SIZE) {
            self.kill_ship("saucer fire");
            self.bullets.slots_mut()[bullet_index].destroy();
            self.sounds.push(SoundEvent::Explosion);
        }
    }

    fn resolve_ship_vs_asteroids(&mut self) {
        let ship = self.ship.position;
        let hit = self
            .asteroids
            .active()
            .any(|rock| circles_overlap(ship, SHIP_SIZE, rock.position, rock.radius));
        if hit {
            self.kill_ship("asteroid");
            self.sounds.push(SoundEvent::Explosion);
        }
    }

    fn resolve_ship_vs_ufos(&mut self) {
        let ship = self.ship.position;
        let hit = self
            .ufos
            .slots()
            .iter()
            .position(|ufo| ufo.is_active && circles_overlap(ship, SHIP_SIZE, ufo.position, UFO_SIZE));
        if let Some(j) = hit {
            self.kill_ship("saucer collision");
            self.ufos.slots_mut()[j].destroy();
            self.sounds.push(SoundEvent::Explosion);
        }
    }

    fn kill_ship(&mut self, cause: &str) {
        self.ship.is_alive = false;
        info!("Ship destroyed by {} with {} lives on the counter", cause, self.ship.lives);
    }
}
