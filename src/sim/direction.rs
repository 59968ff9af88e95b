//! Eight-way facing derived from the player's velocity
//!
//! The facing is sticky: a stationary player keeps aiming where it last moved.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{deg_to_rad, unit_from_angle};

/// One of eight facings, clockwise from up in 45° steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    #[default]
    Up = 0,
    UpRight = 1,
    Right = 2,
    DownRight = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    UpLeft = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    /// Index in [0, 7]
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Direction for a velocity, `None` when the velocity is zero
    pub fn from_velocity(vel: Vec2) -> Option<Self> {
        use std::cmp::Ordering::*;

        let dir = match (vel.y.partial_cmp(&0.0)?, vel.x.partial_cmp(&0.0)?) {
            (Less, Less) => Direction::UpLeft,
            (Less, Equal) => Direction::Up,
            (Less, Greater) => Direction::UpRight,
            (Equal, Less) => Direction::Left,
            (Equal, Greater) => Direction::Right,
            (Greater, Less) => Direction::DownLeft,
            (Greater, Equal) => Direction::Down,
            (Greater, Greater) => Direction::DownRight,
            (Equal, Equal) => return None,
        };
        Some(dir)
    }

    /// Visual rotation of the player triangle (degrees, 0 = pointing up)
    #[inline]
    pub fn facing_degrees(self) -> f32 {
        self.index() as f32 * 45.0
    }

    /// Visual rotation of the player triangle (radians)
    #[inline]
    pub fn facing_radians(self) -> f32 {
        deg_to_rad(self.facing_degrees())
    }

    /// Travel angle measured from +x (radians); `Up` travels toward negative y
    #[inline]
    pub fn fire_angle(self) -> f32 {
        deg_to_rad(self.facing_degrees() - 90.0)
    }

    /// Unit vector along the travel angle
    #[inline]
    pub fn unit(self) -> Vec2 {
        unit_from_angle(self.fire_angle())
    }
}

/// Callback invoked with the new facing whenever it changes
pub type TurnCallback = Box<dyn FnMut(Direction)>;

/// Tracks the player's facing
pub struct DirectionModel {
    direction: Direction,
    on_change: Option<TurnCallback>,
}

impl std::fmt::Debug for DirectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectionModel")
            .field("direction", &self.direction)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for DirectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectionModel {
    pub fn new() -> Self {
        Self {
            direction: Direction::Up,
            on_change: None,
        }
    }

    /// Attach the orientation-redraw callback
    pub fn with_on_change(mut self, callback: impl FnMut(Direction) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Update the facing from a velocity.
    ///
    /// Returns true if the stored direction changed. Zero velocity never
    /// changes it.
    pub fn update_from_velocity(&mut self, vel: Vec2) -> bool {
        let Some(next) = Direction::from_velocity(vel) else {
            return false;
        };
        if next == self.direction {
            return false;
        }

        self.direction = next;
        if let Some(callback) = self.on_change.as_mut() {
            callback(next);
        }
        true
    }

    /// Set the facing directly (no callback)
    pub fn reset(&mut self, direction: Direction) {
        self.direction = direction;
    }
}
