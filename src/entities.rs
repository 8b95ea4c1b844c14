use crate::constants::*;
use crate::pool::Slot;
use crate::rng::RandomSource;
use crate::types::{Bounds, Vector2D, wrap_position};
use log::debug;

// --- Spaceship ---
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub rotation: f64, // Degrees, 0 = nose up
    pub rotation_speed: f64, // Degrees per second, set by rotate()
    pub is_thrusting: bool,
    pub is_alive: bool,
    pub invulnerable_time: f64,
    pub lives: u32,
}

impl Default for Ship {
    fn default() -> Self {
        Ship::new(Vector2D::ZERO)
    }
}

impl Ship {
    pub fn new(position: Vector2D) -> Self {
        Ship {
            position,
            velocity: Vector2D::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            is_thrusting: false,
            is_alive: true,
            invulnerable_time: SHIP_INVULNERABLE_TIME,
            lives: SHIP_STARTING_LIVES,
        }
    }

    /// Same as a fresh ship, but the lives counter carries over.
    pub fn respawn(&mut self, position: Vector2D) {
        let lives = self.lives;
        *self = Ship::new(position);
        self.lives = lives;
    }

    /// Direction of travel when thrusting, in degrees.
    pub fn heading(&self) -> f64 {
        self.rotation - 90.0
    }

    pub fn nose(&self) -> Vector2D {
        self.position.add(Vector2D::from_degrees(self.heading()).scale(SHIP_SIZE))
    }

    pub fn update(&mut self, dt: f64) {
        if !self.is_alive {
            return;
        }

        self.rotation += self.rotation_speed * dt;

        if self.is_thrusting {
            let thrust = Vector2D::from_degrees(self.heading()).scale(SHIP_THRUST_POWER * dt);
            self.velocity = self.velocity.add(thrust).clamp_length(SHIP_MAX_SPEED);
        }

        // Drag applies every frame, thrusting or not.
        self.velocity = self.velocity.scale(SHIP_DRAG);
        self.position = self.position.add(self.velocity.scale(dt));

        if self.invulnerable_time > 0.0 {
            self.invulnerable_time = (self.invulnerable_time - dt).max(0.0);
        }
    }

    pub fn thrust(&mut self) {
        self.is_thrusting = true;
    }

    pub fn rotate(&mut self, direction: f64) {
        self.rotation_speed = direction * SHIP_ROTATION_SPEED;
    }

    /// Clears the per-frame intents before the input adapter re-applies them.
    pub fn clear_controls(&mut self) {
        self.is_thrusting = false;
        self.rotation_speed = 0.0;
    }

    /// Teleports anywhere on the field. The landing spot is not checked for rocks.
    pub fn hyperspace_jump(&mut self, bounds: Bounds, rng: &mut dyn RandomSource) {
        self.position = Vector2D::new(rng.float(0.0, bounds.width), rng.float(0.0, bounds.height));
        self.velocity = Vector2D::ZERO;
        debug!("Hyperspace to ({:.1}, {:.1})", self.position.x, self.position.y);
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_time > 0.0
    }

    /// Hull triangle in world space: nose, left wing, right wing.
    pub fn hull(&self) -> [Vector2D; 3] {
        [
            Vector2D::new(0.0, -SHIP_SIZE),
            Vector2D::new(-SHIP_SIZE * 0.7, SHIP_SIZE),
            Vector2D::new(SHIP_SIZE * 0.7, SHIP_SIZE),
        ]
        .map(|local| local.rotated_about(self.rotation, self.position))
    }

    /// Exhaust chevron behind the hull, only while thrusting.
    pub fn flame(&self) -> Option<[Vector2D; 3]> {
        if !self.is_thrusting {
            return None;
        }
        Some(
            [
                Vector2D::new(-SHIP_SIZE * 0.4, SHIP_SIZE),
                Vector2D::new(0.0, SHIP_SIZE * 1.5),
                Vector2D::new(SHIP_SIZE * 0.4, SHIP_SIZE),
            ]
            .map(|local| local.rotated_about(self.rotation, self.position)),
        )
    }
}

// --- Asteroids ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsteroidSize {
    #[default]
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(self) -> f64 {
        match self {
            AsteroidSize::Large => ASTEROID_LARGE_RADIUS,
            AsteroidSize::Medium => ASTEROID_MEDIUM_RADIUS,
            AsteroidSize::Small => ASTEROID_SMALL_RADIUS,
        }
    }

    pub fn smaller(self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Asteroid {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub size: AsteroidSize,
    pub is_active: bool,
    pub radius: f64,
    shape: Option<Vec<Vector2D>>, // Local-space outline, owned while active
}

impl Asteroid {
    pub fn new(position: Vector2D, size: AsteroidSize, rng: &mut dyn RandomSource) -> Self {
        let radius = size.radius();
        let speed = rng.float(ASTEROID_SPEED_MIN, ASTEROID_SPEED_MAX);
        let heading = rng.float(0.0, 360.0);
        let rotation = rng.float(0.0, 360.0);
        let rotation_speed = rng.float(-ASTEROID_ROTATION_SPEED_MAX, ASTEROID_ROTATION_SPEED_MAX);

        // Jitter is rolled once here; the outline only ever rotates rigidly afterwards.
        let vertex_count = rng.int(ASTEROID_MIN_VERTICES, ASTEROID_MAX_VERTICES) as usize;
        let shape = (0..vertex_count)
            .map(|i| {
                let step = 360.0 / vertex_count as f64 * i as f64;
                let jitter = rng.float(ASTEROID_JITTER_MIN, ASTEROID_JITTER_MAX);
                Vector2D::from_degrees(step).scale(radius * jitter)
            })
            .collect();

        Asteroid {
            position,
            velocity: Vector2D::from_degrees(heading).scale(speed),
            rotation,
            rotation_speed,
            size,
            is_active: true,
            radius,
            shape: Some(shape),
        }
    }

    pub fn update(&mut self, dt: f64, bounds: Bounds) {
        if !self.is_active {
            return;
        }
        self.position = self.position.add(self.velocity.scale(dt));
        self.rotation += self.rotation_speed * dt;
        wrap_position(&mut self.position, bounds);
    }

    /// Fills both children with the next size down, flying apart at 1.5x speed.
    /// A small parent leaves both children untouched.
    pub fn split(&self, child1: &mut Asteroid, child2: &mut Asteroid, rng: &mut dyn RandomSource) {
        let Some(size) = self.size.smaller() else {
            return;
        };

        *child1 = Asteroid::new(self.position, size, rng);
        *child2 = Asteroid::new(self.position, size, rng);

        let heading = rng.float(0.0, 360.0);
        let speed = rng.float(
            ASTEROID_SPEED_MIN * ASTEROID_SPLIT_SPEED_FACTOR,
            ASTEROID_SPEED_MAX * ASTEROID_SPLIT_SPEED_FACTOR,
        );
        child1.velocity = Vector2D::from_degrees(heading).scale(speed);
        child2.velocity = Vector2D::from_degrees(heading + 180.0).scale(speed);
    }

    /// Deactivates and drops the outline. Destroying twice is harmless.
    pub fn destroy(&mut self) {
        self.is_active = false;
        self.shape = None;
    }

    pub fn vertex_count(&self) -> usize {
        self.shape.as_ref().map_or(0, Vec::len)
    }

    pub fn has_outline(&self) -> bool {
        self.shape.is_some()
    }

    /// Outline vertices in world space, in drawing order (closed polygon).
    pub fn outline(&self) -> Vec<Vector2D> {
        match &self.shape {
            Some(shape) => shape
                .iter()
                .map(|local| local.rotated_about(self.rotation, self.position))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl Slot for Asteroid {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

// --- Bullets ---
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bullet {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub lifetime: f64,
    pub is_active: bool,
    pub from_player: bool,
}

impl Bullet {
    /// `angle` uses the ship convention: 0 fires straight up.
    pub fn new(position: Vector2D, angle: f64, from_player: bool) -> Self {
        Bullet {
            position,
            velocity: Vector2D::from_degrees(angle - 90.0).scale(BULLET_SPEED),
            lifetime: BULLET_LIFETIME,
            is_active: true,
            from_player,
        }
    }

    pub fn update(&mut self, dt: f64, bounds: Bounds) {
        if !self.is_active {
            return;
        }
        self.position = self.position.add(self.velocity.scale(dt));
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.is_active = false;
        }
        wrap_position(&mut self.position, bounds);
    }

    pub fn destroy(&mut self) {
        self.is_active = false;
    }
}

impl Slot for Bullet {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

// --- UFOs ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UfoType {
    #[default]
    Large,
    Small,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ufo {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub ufo_type: UfoType,
    pub is_active: bool,
    pub shoot_timer: f64,
    pub move_timer: f64,
    pub direction: f64, // +1 enters from the left, -1 from the right
}

impl Ufo {
    pub fn new(ufo_type: UfoType, bounds: Bounds, rng: &mut dyn RandomSource) -> Self {
        let (x, direction) = if rng.int(0, 1) == 0 {
            (0.0, 1.0)
        } else {
            (bounds.width, -1.0)
        };
        let y = rng.float(bounds.height * UFO_LANE_MIN, bounds.height * UFO_LANE_MAX);
        let speed = match ufo_type {
            UfoType::Large => UFO_LARGE_SPEED,
            UfoType::Small => UFO_SMALL_SPEED,
        };

        Ufo {
            position: Vector2D::new(x, y),
            velocity: Vector2D::new(speed * direction, 0.0),
            ufo_type,
            is_active: true,
            shoot_timer: 0.0,
            move_timer: 0.0,
            direction,
        }
    }

    /// Moves, retires past the far edge, and fires into the first free bullet slot.
    pub fn update(
        &mut self,
        dt: f64,
        target: &Ship,
        bullets: &mut [Bullet],
        bounds: Bounds,
        rng: &mut dyn RandomSource,
    ) {
        if !self.is_active {
            return;
        }

        self.position.x += self.velocity.x * dt;

        if self.ufo_type == UfoType::Small {
            self.move_timer += dt;
            if self.move_timer > UFO_STEER_INTERVAL {
                self.velocity.y = rng.float(-UFO_STEER_SPEED_MAX, UFO_STEER_SPEED_MAX);
                self.move_timer = 0.0;
            }
            self.position.y += self.velocity.y * dt;
        }

        // No wraparound: saucers leave the field for good.
        if (self.direction > 0.0 && self.position.x > bounds.width + UFO_SIZE)
            || (self.direction < 0.0 && self.position.x < -UFO_SIZE)
        {
            self.is_active = false;
        }

        self.shoot_timer += dt;
        if self.shoot_timer > UFO_SHOOT_INTERVAL {
            self.shoot_timer = 0.0;
            if let Some(slot) = bullets.iter_mut().find(|bullet| !bullet.is_active) {
                let angle = match self.ufo_type {
                    UfoType::Small if target.is_alive && !target.is_invulnerable() => {
                        self.position.bearing_to(target.position) + 90.0
                    }
                    _ => rng.float(0.0, 360.0),
                };
                *slot = Bullet::new(self.position, angle, false);
            }
        }
    }

    pub fn destroy(&mut self) {
        self.is_active = false;
    }

    pub fn draw_size(&self) -> f64 {
        match self.ufo_type {
            UfoType::Large => UFO_SIZE,
            UfoType::Small => UFO_SIZE * UFO_SMALL_DRAW_SCALE,
        }
    }

    /// Saucer outline as seven line segments.
    pub fn segments(&self) -> [(Vector2D, Vector2D); 7] {
        let size = self.draw_size();
        let p = self.position;
        let left = Vector2D::new(p.x - size, p.y);
        let right = Vector2D::new(p.x + size, p.y);
        let top_left = Vector2D::new(p.x - size * 0.5, p.y - size * 0.3);
        let top_right = Vector2D::new(p.x + size * 0.5, p.y - size * 0.3);
        let bottom_left = Vector2D::new(p.x - size * 0.5, p.y + size * 0.3);
        let bottom_right = Vector2D::new(p.x + size * 0.5, p.y + size * 0.3);
        [
            (left, right),
            (top_left, top_right),
            (top_left, left),
            (top_right, right),
            (bottom_left, bottom_right),
            (bottom_left, left),
            (bottom_right, right),
        ]
    }
}

impl Slot for Ufo {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    #[test]
    fn new_ship_has_three_lives_and_shield() {
        let ship = Ship::new(Vector2D::new(400.0, 300.0));
        assert_eq!(ship.lives, 3);
        assert!(ship.is_alive);
        assert!(ship.is_invulnerable());
        assert_eq!(ship.velocity, Vector2D::ZERO);
    }

    #[test]
    fn respawn_keeps_lives() {
        let mut ship = Ship::new(Vector2D::ZERO);
        ship.lives = 1;
        ship.is_alive = false;
        ship.velocity = Vector2D::new(50.0, 0.0);
        ship.respawn(Vector2D::new(10.0, 20.0));
        assert_eq!(ship.lives, 1);
        assert!(ship.is_alive);
        assert_eq!(ship.position, Vector2D::new(10.0, 20.0));
        assert_eq!(ship.invulnerable_time, SHIP_INVULNERABLE_TIME);
    }

    #[test]
    fn thrust_at_zero_rotation_moves_up() {
        let mut ship = Ship::new(Vector2D::new(400.0, 300.0));
        ship.thrust();
        ship.update(0.1);
        assert!(ship.velocity.y < 0.0);
        assert!(ship.velocity.x.abs() < 1e-9);
        assert!(ship.position.y < 300.0);
    }

    #[test]
    fn invulnerability_never_goes_negative() {
        let mut ship = Ship::new(Vector2D::ZERO);
        ship.update(10.0);
        assert_eq!(ship.invulnerable_time, 0.0);
        assert!(!ship.is_invulnerable());
    }

    #[test]
    fn dead_ship_does_not_move() {
        let mut ship = Ship::new(Vector2D::new(5.0, 5.0));
        ship.velocity = Vector2D::new(100.0, 0.0);
        ship.is_alive = false;
        ship.update(1.0);
        assert_eq!(ship.position, Vector2D::new(5.0, 5.0));
    }

    #[test]
    fn hyperspace_lands_in_bounds_and_stops() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ship = Ship::new(Vector2D::ZERO);
        ship.velocity = Vector2D::new(120.0, -40.0);
        ship.hyperspace_jump(bounds(), &mut rng);
        assert_eq!(ship.velocity, Vector2D::ZERO);
        assert!((0.0..=800.0).contains(&ship.position.x));
        assert!((0.0..=600.0).contains(&ship.position.y));
    }

    #[test]
    fn flame_only_while_thrusting() {
        let mut ship = Ship::new(Vector2D::ZERO);
        assert!(ship.flame().is_none());
        ship.thrust();
        assert!(ship.flame().is_some());
    }

    #[test]
    fn asteroid_outline_matches_size() {
        let mut rng = StdRng::seed_from_u64(11);
        for size in [AsteroidSize::Large, AsteroidSize::Medium, AsteroidSize::Small] {
            let rock = Asteroid::new(Vector2D::new(100.0, 100.0), size, &mut rng);
            assert_eq!(rock.radius, size.radius());
            assert!((8..=12).contains(&rock.vertex_count()));
            let speed = rock.velocity.length();
            assert!((ASTEROID_SPEED_MIN - 1e-9..=ASTEROID_SPEED_MAX + 1e-9).contains(&speed));
            for vertex in rock.outline() {
                let reach = vertex.distance(rock.position);
                assert!(reach >= rock.radius * 0.8 - 1e-9 && reach <= rock.radius * 1.2 + 1e-9);
            }
        }
    }

    #[test]
    fn outline_rotates_rigidly() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut rock = Asteroid::new(Vector2D::new(400.0, 300.0), AsteroidSize::Large, &mut rng);
        rock.velocity = Vector2D::ZERO;
        let before: Vec<f64> = rock.outline().iter().map(|v| v.distance(rock.position)).collect();
        rock.update(0.5, bounds());
        let after: Vec<f64> = rock.outline().iter().map(|v| v.distance(rock.position)).collect();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn split_large_makes_two_mediums_flying_apart() {
        let mut rng = StdRng::seed_from_u64(9);
        let parent = Asteroid::new(Vector2D::new(200.0, 200.0), AsteroidSize::Large, &mut rng);
        let mut a = Asteroid::default();
        let mut b = Asteroid::default();
        parent.split(&mut a, &mut b, &mut rng);
        assert_eq!(a.size, AsteroidSize::Medium);
        assert_eq!(b.size, AsteroidSize::Medium);
        assert_eq!(a.position, parent.position);
        assert_eq!(b.position, parent.position);
        let sum = a.velocity.add(b.velocity);
        assert!(sum.length() < 1e-6);
        assert!(a.velocity.length() >= ASTEROID_SPEED_MIN * 1.5 - 1e-9);
    }

    #[test]
    fn split_small_leaves_children_alone() {
        let mut rng = StdRng::seed_from_u64(9);
        let parent = Asteroid::new(Vector2D::ZERO, AsteroidSize::Small, &mut rng);
        let mut a = Asteroid::default();
        let mut b = Asteroid::default();
        parent.split(&mut a, &mut b, &mut rng);
        assert_eq!(a, Asteroid::default());
        assert_eq!(b, Asteroid::default());
    }

    #[test]
    fn destroy_releases_outline_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut rock = Asteroid::new(Vector2D::ZERO, AsteroidSize::Medium, &mut rng);
        assert!(rock.has_outline());
        rock.destroy();
        assert!(!rock.is_active);
        assert!(!rock.has_outline());
        rock.destroy();
        assert!(!rock.has_outline());
        assert!(rock.outline().is_empty());
    }

    #[test]
    fn bullet_expires_after_lifetime() {
        let mut bullet = Bullet::new(Vector2D::new(400.0, 300.0), 0.0, true);
        assert!(bullet.velocity.y < 0.0);
        bullet.update(1.0, bounds());
        assert!(bullet.is_active);
        bullet.update(0.25, bounds());
        assert!(!bullet.is_active);
    }

    #[test]
    fn bullet_wraps_across_edge() {
        let mut bullet = Bullet::new(Vector2D::new(400.0, 1.0), 0.0, true);
        bullet.update(0.01, bounds());
        assert_eq!(bullet.position.y, 600.0);
    }

    #[test]
    fn ufo_enters_from_an_edge_in_the_middle_lane() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..50 {
            let ufo = Ufo::new(UfoType::Large, bounds(), &mut rng);
            assert!(ufo.position.x == 0.0 || ufo.position.x == 800.0);
            assert_eq!(ufo.velocity.x, UFO_LARGE_SPEED * ufo.direction);
            assert!((120.0..=480.0).contains(&ufo.position.y));
        }
    }

    #[test]
    fn ufo_leaves_past_far_edge() {
        let mut rng = StdRng::seed_from_u64(2);
        let target = Ship::new(Vector2D::ZERO);
        let mut bullets = [Bullet::default(); 4];
        let mut ufo = Ufo::new(UfoType::Large, bounds(), &mut rng);
        ufo.direction = 1.0;
        ufo.velocity = Vector2D::new(UFO_LARGE_SPEED, 0.0);
        ufo.position = Vector2D::new(815.0, 300.0);
        ufo.update(0.1, &target, &mut bullets, bounds(), &mut rng);
        assert!(!ufo.is_active);
    }

    #[test]
    fn small_ufo_aims_at_vulnerable_ship() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut target = Ship::new(Vector2D::new(400.0, 500.0));
        target.invulnerable_time = 0.0;
        let mut bullets = [Bullet::default(); 2];
        let mut ufo = Ufo::new(UfoType::Small, bounds(), &mut rng);
        ufo.position = Vector2D::new(400.0, 100.0);
        ufo.velocity = Vector2D::ZERO;
        ufo.direction = 1.0;
        ufo.shoot_timer = UFO_SHOOT_INTERVAL;
        ufo.move_timer = 0.0;
        ufo.update(0.01, &target, &mut bullets, bounds(), &mut rng);
        let shot = bullets[0];
        assert!(shot.is_active);
        assert!(!shot.from_player);
        assert!(shot.velocity.y > 0.0);
        assert!(shot.velocity.x.abs() < 1.0);
    }

    #[test]
    fn ufo_holds_fire_when_pool_is_full() {
        let mut rng = StdRng::seed_from_u64(4);
        let target = Ship::new(Vector2D::ZERO);
        let full = Bullet::new(Vector2D::ZERO, 0.0, true);
        let mut bullets = [full; 3];
        let mut ufo = Ufo::new(UfoType::Large, bounds(), &mut rng);
        ufo.shoot_timer = UFO_SHOOT_INTERVAL;
        ufo.update(0.01, &target, &mut bullets, bounds(), &mut rng);
        assert!(bullets.iter().all(|bullet| bullet.from_player));
        assert_eq!(ufo.shoot_timer, 0.0);
    }
}
