#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector pointing along `degrees`, measured clockwise from +x in screen space.
    pub fn from_degrees(degrees: f64) -> Self {
        let radians = degrees.to_radians();
        Vector2D::new(radians.cos(), radians.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: Vector2D) -> f64 {
        self.sub(other).length()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self.scale(1.0 / len)
        } else {
            Vector2D::ZERO
        }
    }

    pub fn clamp_length(&self, max: f64) -> Self {
        if self.length() > max {
            self.normalize().scale(max)
        } else {
            *self
        }
    }

    /// Rotates a local-space offset by `degrees` and translates it to `origin`.
    pub fn rotated_about(&self, degrees: f64, origin: Vector2D) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vector2D::new(
            self.x * cos - self.y * sin + origin.x,
            self.x * sin + self.y * cos + origin.y,
        )
    }

    /// Bearing from `self` to `other` in degrees, same convention as [`Vector2D::from_degrees`].
    pub fn bearing_to(&self, other: Vector2D) -> f64 {
        let delta = other.sub(*self);
        delta.y.atan2(delta.x).to_degrees()
    }
}

/// Play-field extent in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Bounds { width, height }
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }
}

// Edge teleport, not a modulo: anything past an edge lands exactly on the opposite edge.
pub fn wrap_coordinate(value: f64, max: f64) -> f64 {
    if value < 0.0 {
        max
    } else if value > max {
        0.0
    } else {
        value
    }
}

pub fn wrap_position(position: &mut Vector2D, bounds: Bounds) {
    position.x = wrap_coordinate(position.x, bounds.width);
    position.y = wrap_coordinate(position.y, bounds.height);
}

pub fn circles_overlap(a: Vector2D, radius_a: f64, b: Vector2D, radius_b: f64) -> bool {
    a.distance(b) <= radius_a + radius_b
}
