//! Cabinet Shooter - an eight-direction arcade shooter inside an arcade cabinet
//!
//! Core modules:
//! - `sim`: Deterministic simulation (facing, bullet, run state machine)
//! - `compositor`: Square monitor inset and the two-layer camera partition
//! - `renderer`: WebGPU rendering of the cabinet and monitor layers
//! - `platform`: Input sources and key-value storage backends
//! - `session`: Splash / run flow around the simulation

pub mod audio;
pub mod compositor;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use compositor::{Camera, Compositor, Layer, PlayfieldGeometry};
pub use highscores::{HighScores, ScoreBoard};
pub use session::{Screen, Session};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Title shown on the splash screen
    pub const GAME_TITLE: &str = "Cabinet Shooter";
    /// Prefix for every storage key written by this game
    pub const STORAGE_KEY_PREFIX: &str = "cabinetShooter";

    /// Fixed simulation timestep (60 Hz, one score point per tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Logical arena is WORLD_SIZE x WORLD_SIZE units, origin top-left, y down
    pub const WORLD_SIZE: f32 = 1000.0;
    /// Fraction of the shortest viewport side used by the monitor
    pub const MONITOR_FRACTION: f32 = 0.95;

    /// Player triangle bounding box
    pub const PLAYER_WIDTH: f32 = 12.0;
    pub const PLAYER_HEIGHT: f32 = 16.0;
    /// Player spawn point (arena center)
    pub const PLAYER_START: (f32, f32) = (500.0, 500.0);
    pub const PLAYER_SPEED: f32 = 200.0;
    /// Scale applied to both axes while moving diagonally
    pub const DIAGONAL_MULTIPLIER: f32 = 0.7071;

    pub const BULLET_WIDTH: f32 = 3.0;
    pub const BULLET_HEIGHT: f32 = 3.0;
    pub const BULLET_SPEED: f32 = 400.0;
    /// Extra gap between the player's body and a freshly spawned bullet
    pub const BULLET_SPAWN_BUFFER: f32 = 4.0;

    /// The hazard ("game over object")
    pub const HAZARD_POS: (f32, f32) = (750.0, 250.0);
    pub const HAZARD_RADIUS: f32 = 20.0;

    /// Score awarded for every simulation tick survived
    pub const SCORE_PER_TICK: u64 = 1;
    /// Delay between game over and the run-complete signal (milliseconds)
    pub const GAME_OVER_TRANSITION_DELAY_MS: f64 = 2000.0;

    /// Arena border stroke width (world units)
    pub const BORDER_WIDTH: f32 = 4.0;

    /// On-screen controls, in cabinet (screen) pixels
    pub const CONTROLS_BOTTOM_SAFE_AREA: f32 = 34.0;
    pub const JOYSTICK_OFFSET: (f32, f32) = (100.0, 100.0);
    pub const JOYSTICK_BASE_RADIUS: f32 = 60.0;
    pub const JOYSTICK_THUMB_RADIUS: f32 = 30.0;
    /// Thumb travel below this fraction of the base radius is neutral
    pub const JOYSTICK_DEAD_ZONE: f32 = 0.25;
    pub const FIRE_BUTTON_OFFSET: (f32, f32) = (100.0, 100.0);
    pub const FIRE_BUTTON_RADIUS: f32 = 40.0;
}

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Unit vector for an angle measured clockwise from +x with y pointing down
#[inline]
pub fn unit_from_angle(radians: f32) -> Vec2 {
    Vec2::new(radians.cos(), radians.sin())
}

/// Rotate a point around the origin (y-down, positive angle turns clockwise on screen)
#[inline]
pub fn rotate(point: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(point.x * cos - point.y * sin, point.x * sin + point.y * cos)
}
