//! Kinematic bodies with a circular collision shape

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Circle};

/// A body moved only by its velocity (no forces, no mass)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicBody {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radius of the circular collision shape
    pub radius: f32,
    /// Keep the whole circle inside these bounds while integrating
    pub bounds: Option<Aabb>,
}

impl KinematicBody {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            bounds: None,
        }
    }

    /// Clamp to `bounds` on every step
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    /// Advance position by one step
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        if let Some(bounds) = self.bounds {
            self.pos = bounds.clamp_circle(self.pos, self.radius);
        }
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_moves_by_velocity() {
        let mut body = KinematicBody::new(Vec2::new(500.0, 500.0), 10.0);
        body.set_velocity(Vec2::new(-200.0, 0.0));
        body.integrate(0.5);
        assert_eq!(body.pos, Vec2::new(400.0, 500.0));
    }

    #[test]
    fn test_bounds_stop_the_body_at_the_wall() {
        let world = Aabb::new(Vec2::ZERO, Vec2::splat(1000.0));
        let mut body = KinematicBody::new(Vec2::new(20.0, 500.0), 10.0).with_bounds(world);
        body.set_velocity(Vec2::new(-200.0, 0.0));
        for _ in 0..10 {
            body.integrate(0.1);
        }
        assert_eq!(body.pos, Vec2::new(10.0, 500.0));
    }
}
