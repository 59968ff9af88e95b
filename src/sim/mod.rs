//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - One run per `GameLoop`, never reused
//! - No rendering or platform dependencies

pub mod body;
pub mod bullet;
pub mod collision;
pub mod direction;
pub mod state;
pub mod tick;
pub mod timer;

pub use body::KinematicBody;
pub use bullet::{Bullet, BulletEnd, BulletLifecycle, Collider, ColliderHandle, spawn_offset, spawn_point};
pub use collision::{Aabb, Circle, aabb_circle_overlap, circles_overlap, touches_bounds};
pub use direction::{Direction, DirectionModel};
pub use state::{GameEvent, Hazard, Player, RunPhase, RunState, player_body_radius, world_bounds};
pub use tick::{GameLoop, TickInput};
pub use timer::DelayedCall;
