//! Run state and core simulation types
//!
//! A `RunState` lives for exactly one run; the next run builds a new one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::KinematicBody;
use super::collision::{Aabb, Circle};
use super::direction::Direction;
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Accepting input and accruing score
    Running,
    /// Player touched the hazard; waiting out the transition delay
    GameOver,
}

/// Something the host should react to (sound, overlay, scene change)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player facing changed; redraw its rotation
    Turned { direction: Direction },
    /// A bullet left the player
    Fired { pos: Vec2, direction: Direction },
    /// The bullet hit the hazard (the hazard survives)
    BulletHit { pos: Vec2 },
    /// The bullet left the arena
    BulletExpired { pos: Vec2 },
    /// Player touched the hazard; emitted once per run
    GameOver { score: u64 },
    /// Transition delay elapsed; emitted once per run
    RunComplete { final_score: u64 },
}

/// Radius of the player's collision circle (covers the triangle at any rotation)
pub fn player_body_radius() -> f32 {
    (PLAYER_WIDTH * PLAYER_WIDTH + PLAYER_HEIGHT * PLAYER_HEIGHT).sqrt() / 2.0
}

/// The arena's bounds in world units
pub fn world_bounds() -> Aabb {
    Aabb::new(Vec2::ZERO, Vec2::splat(WORLD_SIZE))
}

/// The player's triangle ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: KinematicBody,
    /// Visual rotation (radians), follows the facing
    pub rotation: f32,
}

impl Default for Player {
    fn default() -> Self {
        let start = Vec2::new(PLAYER_START.0, PLAYER_START.1);
        Self {
            body: KinematicBody::new(start, player_body_radius()).with_bounds(world_bounds()),
            rotation: Direction::Up.facing_radians(),
        }
    }
}

impl Player {
    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    /// Triangle corners in world space (tip first)
    pub fn triangle(&self) -> [Vec2; 3] {
        let half_w = PLAYER_WIDTH / 2.0;
        let half_h = PLAYER_HEIGHT / 2.0;
        [
            Vec2::new(0.0, -half_h),
            Vec2::new(-half_w, half_h),
            Vec2::new(half_w, half_h),
        ]
        .map(|p| self.body.pos + crate::rotate(p, self.rotation))
    }
}

/// The static obstacle that ends the run on contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub shape: Circle,
}

impl Default for Hazard {
    fn default() -> Self {
        Self {
            id: 1,
            shape: Circle::new(Vec2::new(HAZARD_POS.0, HAZARD_POS.1), HAZARD_RADIUS),
        }
    }
}

/// State of a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Ticks survived while running
    pub score: u64,
    pub phase: RunPhase,
    /// Simulation tick counter (keeps counting through game over)
    pub time_ticks: u64,
    pub player: Player,
    pub hazard: Hazard,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            score: 0,
            phase: RunPhase::Running,
            time_ticks: 0,
            player: Player::default(),
            hazard: Hazard::default(),
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_defaults() {
        let run = RunState::new();
        assert_eq!(run.score, 0);
        assert_eq!(run.phase, RunPhase::Running);
        assert_eq!(run.player.pos(), Vec2::new(500.0, 500.0));
        assert_eq!(run.hazard.shape.center, Vec2::new(750.0, 250.0));
        assert!(!run.is_over());
    }

    #[test]
    fn test_player_radius_covers_triangle() {
        assert!((player_body_radius() - 10.0).abs() < 1e-6);
        let run = RunState::new();
        for corner in run.player.triangle() {
            assert!(corner.distance(run.player.pos()) <= player_body_radius() + 1e-4);
        }
    }

    #[test]
    fn test_triangle_tip_follows_rotation() {
        let mut player = Player::default();
        assert!((player.triangle()[0] - Vec2::new(500.0, 492.0)).length() < 1e-4);

        player.rotation = Direction::Right.facing_radians();
        assert!((player.triangle()[0] - Vec2::new(508.0, 500.0)).length() < 1e-4);
    }
}
