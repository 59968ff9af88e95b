//! Collision shapes and overlap tests
//!
//! Everything in the arena collides as either a circle (player, hazard) or an
//! axis-aligned box (bullet). Bodies do not rotate for collision purposes, so
//! the player's circle is sized to cover the triangle at any rotation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circle collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Clamp a circle's center so the circle stays inside this box
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let lo = self.min + Vec2::splat(radius);
        let hi = self.max - Vec2::splat(radius);
        Vec2::new(
            center.x.clamp(lo.x, hi.x.max(lo.x)),
            center.y.clamp(lo.y, hi.y.max(lo.y)),
        )
    }
}

/// Check if two circles overlap (touching counts)
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) <= reach * reach
}

/// Check if a box overlaps a circle (touching counts)
pub fn aabb_circle_overlap(rect: &Aabb, circle: &Circle) -> bool {
    let closest = circle.center.clamp(rect.min, rect.max);
    closest.distance_squared(circle.center) <= circle.radius * circle.radius
}

/// Check if a box has touched or crossed the edge of the bounds.
///
/// Bodies flagged to report world-bounds contact are destroyed as soon as this
/// returns true.
pub fn touches_bounds(rect: &Aabb, bounds: &Aabb) -> bool {
    rect.min.x <= bounds.min.x
        || rect.min.y <= bounds.min.y
        || rect.max.x >= bounds.max.x
        || rect.max.y >= bounds.max.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 10.0);
        assert!(circles_overlap(&a, &Circle::new(Vec2::new(25.0, 0.0), 20.0)));
        // Exactly touching
        assert!(circles_overlap(&a, &Circle::new(Vec2::new(30.0, 0.0), 20.0)));
        assert!(!circles_overlap(&a, &Circle::new(Vec2::new(30.1, 0.0), 20.0)));
    }

    #[test]
    fn test_aabb_circle_overlap() {
        let hazard = Circle::new(Vec2::new(750.0, 250.0), 20.0);

        let inside = Aabb::from_center(Vec2::new(750.0, 250.0), Vec2::splat(3.0));
        assert!(aabb_circle_overlap(&inside, &hazard));

        let edge = Aabb::from_center(Vec2::new(750.0, 271.0), Vec2::splat(3.0));
        assert!(aabb_circle_overlap(&edge, &hazard));

        let clear = Aabb::from_center(Vec2::new(750.0, 280.0), Vec2::splat(3.0));
        assert!(!aabb_circle_overlap(&clear, &hazard));

        // Near the corner of the box the test must be radial, not square
        let diagonal = Aabb::from_center(Vec2::new(767.0, 267.0), Vec2::splat(3.0));
        assert!(!aabb_circle_overlap(&diagonal, &hazard));
    }

    #[test]
    fn test_touches_bounds() {
        let world = Aabb::new(Vec2::ZERO, Vec2::splat(1000.0));
        let mid = Aabb::from_center(Vec2::splat(500.0), Vec2::splat(3.0));
        assert!(!touches_bounds(&mid, &world));

        let top = Aabb::from_center(Vec2::new(500.0, 1.5), Vec2::splat(3.0));
        assert!(touches_bounds(&top, &world));

        let gone = Aabb::from_center(Vec2::new(1200.0, 500.0), Vec2::splat(3.0));
        assert!(touches_bounds(&gone, &world));
    }

    #[test]
    fn test_clamp_circle() {
        let world = Aabb::new(Vec2::ZERO, Vec2::splat(1000.0));
        assert_eq!(world.clamp_circle(Vec2::new(-5.0, 500.0), 10.0), Vec2::new(10.0, 500.0));
        assert_eq!(world.clamp_circle(Vec2::new(995.0, 1200.0), 10.0), Vec2::new(990.0, 990.0));
        assert_eq!(world.clamp_circle(Vec2::splat(500.0), 10.0), Vec2::splat(500.0));
    }
}
