//! Single-bullet lifecycle
//!
//! Only one bullet may be in flight. The limit is enforced when firing: a
//! fire request while a bullet is active is dropped, never queued and never
//! replacing the live bullet.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Circle, aabb_circle_overlap, touches_bounds};
use super::direction::Direction;
use crate::consts::*;

/// Distance from the shooter's center to a freshly spawned bullet
pub fn spawn_offset() -> f32 {
    PLAYER_WIDTH.max(PLAYER_HEIGHT) / 2.0 + BULLET_HEIGHT / 2.0 + BULLET_SPAWN_BUFFER
}

/// Where a bullet fired from `origin` toward `direction` appears
pub fn spawn_point(origin: Vec2, direction: Direction) -> Vec2 {
    origin + direction.unit() * spawn_offset()
}

/// The bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rotation in radians, equal to the travel angle
    pub rotation: f32,
    pub size: Vec2,
    pub direction: Direction,
}

impl Bullet {
    /// Axis-aligned collision box (bodies don't rotate)
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// Something a bullet can hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub id: u32,
    pub shape: Circle,
}

/// Identifies a registered collider set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(u32);

/// Invoked after the bullet has been destroyed by contact
pub type HitCallback = Box<dyn FnMut(&Bullet, &Collider)>;

struct ColliderSet {
    handle: ColliderHandle,
    targets: Vec<Collider>,
    on_hit: Option<HitCallback>,
}

/// Why the bullet left play
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulletEnd {
    /// Touched the edge of the world
    OutOfBounds { pos: Vec2 },
    /// Hit a registered collider
    Hit { collider: u32, pos: Vec2 },
}

/// Owns the bullet slot, its world-bounds cleanup and its colliders
pub struct BulletLifecycle {
    bullet: Option<Bullet>,
    /// World-bounds subscription; `None` once torn down
    bounds: Option<Aabb>,
    colliders: Vec<ColliderSet>,
    next_handle: u32,
}

impl std::fmt::Debug for BulletLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulletLifecycle")
            .field("bullet", &self.bullet)
            .field("bounds", &self.bounds)
            .field("collider_sets", &self.colliders.len())
            .finish()
    }
}

impl BulletLifecycle {
    /// Create a lifecycle that destroys bullets on touching `bounds`
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bullet: None,
            bounds: Some(bounds),
            colliders: Vec::new(),
            next_handle: 1,
        }
    }

    /// True iff no bullet is in flight
    #[inline]
    pub fn can_fire(&self) -> bool {
        self.bullet.is_none()
    }

    pub fn bullet(&self) -> Option<&Bullet> {
        self.bullet.as_ref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.bounds.is_none()
    }

    /// Fire from `origin` toward `direction`.
    ///
    /// Silently does nothing (returning false) while a bullet is active or
    /// after teardown.
    pub fn fire(&mut self, origin: Vec2, direction: Direction) -> bool {
        if !self.can_fire() || self.is_torn_down() {
            return false;
        }

        let angle = direction.fire_angle();
        let bullet = Bullet {
            pos: spawn_point(origin, direction),
            vel: direction.unit() * BULLET_SPEED,
            rotation: angle,
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            direction,
        };
        log::debug!("Bullet fired {:?} from {:?}", direction, bullet.pos);
        self.bullet = Some(bullet);
        true
    }

    /// Register a set of targets. Contact destroys the bullet, then runs `on_hit`.
    pub fn add_colliders(
        &mut self,
        targets: Vec<Collider>,
        on_hit: Option<HitCallback>,
    ) -> ColliderHandle {
        let handle = ColliderHandle(self.next_handle);
        self.next_handle += 1;
        self.colliders.push(ColliderSet {
            handle,
            targets,
            on_hit,
        });
        handle
    }

    /// Detach one collider set (unknown handles are ignored)
    pub fn remove_colliders(&mut self, handle: ColliderHandle) {
        self.colliders.retain(|set| set.handle != handle);
    }

    pub fn collider_set_count(&self) -> usize {
        self.colliders.len()
    }

    /// Advance the bullet and resolve bounds exit or contact
    pub fn step(&mut self, dt: f32) -> Option<BulletEnd> {
        let bullet = self.bullet.as_mut()?;
        bullet.pos += bullet.vel * dt;
        let rect = bullet.aabb();

        if let Some(bounds) = &self.bounds {
            if touches_bounds(&rect, bounds) {
                let pos = bullet.pos;
                self.bullet = None;
                log::debug!("Bullet left the arena at {:?}", pos);
                return Some(BulletEnd::OutOfBounds { pos });
            }
        }

        for set in &mut self.colliders {
            let Some(target) = set
                .targets
                .iter()
                .find(|t| aabb_circle_overlap(&rect, &t.shape))
                .copied()
            else {
                continue;
            };

            // The bullet always goes; the target is left alone
            let Some(spent) = self.bullet.take() else {
                break;
            };
            if let Some(on_hit) = set.on_hit.as_mut() {
                on_hit(&spent, &target);
            }
            log::debug!("Bullet hit collider {} at {:?}", target.id, spent.pos);
            return Some(BulletEnd::Hit {
                collider: target.id,
                pos: spent.pos,
            });
        }

        None
    }

    /// Remove the bullet without reporting it
    pub fn clear(&mut self) {
        self.bullet = None;
    }

    /// Detach bounds and collider handlers and drop the bullet. Idempotent.
    pub fn teardown(&mut self) {
        if self.bounds.is_none() && self.colliders.is_empty() && self.bullet.is_none() {
            return;
        }
        self.bounds = None;
        self.colliders.clear();
        self.clear();
        log::debug!("Bullet lifecycle torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn world() -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::splat(WORLD_SIZE))
    }

    fn hazard() -> Collider {
        Collider {
            id: 7,
            shape: Circle::new(Vec2::new(HAZARD_POS.0, HAZARD_POS.1), HAZARD_RADIUS),
        }
    }

    #[test]
    fn test_spawn_offset_value() {
        assert!((spawn_offset() - 13.5).abs() < 1e-6);
    }

    #[test]
    fn test_fire_sets_rotation_and_velocity() {
        let mut bullets = BulletLifecycle::new(world());
        assert!(bullets.fire(Vec2::splat(500.0), Direction::Right));

        let b = bullets.bullet().unwrap();
        assert!((b.pos - Vec2::new(513.5, 500.0)).length() < 1e-4);
        assert!(b.rotation.abs() < 1e-6);
        assert!((b.vel - Vec2::new(BULLET_SPEED, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_single_bullet_invariant() {
        let mut bullets = BulletLifecycle::new(world());
        assert!(bullets.can_fire());
        assert!(bullets.fire(Vec2::splat(500.0), Direction::Up));
        assert!(!bullets.can_fire());

        let before = bullets.bullet().cloned().unwrap();
        assert!(!bullets.fire(Vec2::new(100.0, 100.0), Direction::Down));
        let after = bullets.bullet().unwrap();
        assert_eq!(after.pos, before.pos);
        assert_eq!(after.direction, Direction::Up);
    }

    #[test]
    fn test_bullet_destroyed_at_world_edge() {
        let mut bullets = BulletLifecycle::new(world());
        bullets.fire(Vec2::splat(500.0), Direction::Up);

        let mut end = None;
        for _ in 0..200 {
            assert!(!bullets.can_fire());
            if let Some(e) = bullets.step(1.0 / 60.0) {
                end = Some(e);
                break;
            }
        }
        assert!(matches!(end, Some(BulletEnd::OutOfBounds { .. })));
        assert!(bullets.can_fire());
    }

    #[test]
    fn test_hit_destroys_bullet_and_runs_callback() {
        let hits = Rc::new(Cell::new(0u32));
        let counter = hits.clone();

        let mut bullets = BulletLifecycle::new(world());
        bullets.add_colliders(
            vec![hazard()],
            Some(Box::new(move |_bullet: &Bullet, target: &Collider| {
                assert_eq!(target.id, 7);
                counter.set(counter.get() + 1);
            })),
        );

        // Fire straight up from below the hazard
        bullets.fire(Vec2::new(750.0, 400.0), Direction::Up);
        let mut end = None;
        for _ in 0..120 {
            if let Some(e) = bullets.step(1.0 / 60.0) {
                end = Some(e);
                break;
            }
        }
        assert!(matches!(end, Some(BulletEnd::Hit { collider: 7, .. })));
        assert_eq!(hits.get(), 1);
        assert!(bullets.can_fire());
    }

    #[test]
    fn test_hit_without_callback() {
        let mut bullets = BulletLifecycle::new(world());
        bullets.add_colliders(vec![hazard()], None);
        bullets.fire(Vec2::new(700.0, 250.0), Direction::Right);
        let end = (0..60).find_map(|_| bullets.step(1.0 / 60.0));
        assert!(matches!(end, Some(BulletEnd::Hit { .. })));
    }

    #[test]
    fn test_removed_colliders_are_ignored() {
        let mut bullets = BulletLifecycle::new(world());
        let handle = bullets.add_colliders(vec![hazard()], None);
        bullets.remove_colliders(handle);
        bullets.remove_colliders(handle);
        bullets.fire(Vec2::new(700.0, 250.0), Direction::Right);
        let end = (0..120).find_map(|_| bullets.step(1.0 / 60.0));
        assert!(matches!(end, Some(BulletEnd::OutOfBounds { .. })));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut never_used = BulletLifecycle::new(world());
        never_used.teardown();
        never_used.teardown();
        assert!(never_used.is_torn_down());

        let mut bullets = BulletLifecycle::new(world());
        bullets.add_colliders(vec![hazard()], None);
        bullets.fire(Vec2::splat(500.0), Direction::Left);
        bullets.teardown();
        assert_eq!(bullets.collider_set_count(), 0);
        assert!(bullets.bullet().is_none());
        bullets.teardown();

        // A torn-down lifecycle refuses to fire
        assert!(!bullets.fire(Vec2::splat(500.0), Direction::Left));
        assert!(bullets.step(1.0 / 60.0).is_none());
    }

    proptest! {
        #[test]
        fn prop_spawn_point_distance(index in 0u8..8, x in 50.0f32..950.0, y in 50.0f32..950.0) {
            let dir = Direction::from_index(index).unwrap();
            let mut bullets = BulletLifecycle::new(world());
            prop_assert!(bullets.fire(Vec2::new(x, y), dir));

            let b = bullets.bullet().unwrap();
            let offset = b.pos - Vec2::new(x, y);
            prop_assert!((offset.length() - spawn_offset()).abs() < 1e-3);

            let angle = offset.y.atan2(offset.x);
            let expected = dir.fire_angle();
            let diff = (angle - expected).rem_euclid(std::f32::consts::TAU);
            prop_assert!(diff < 1e-3 || diff > std::f32::consts::TAU - 1e-3);
        }
    }
}
