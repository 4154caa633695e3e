//! Tank Duel - turn-based 2D artillery simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, tanks, ballistics, AI, turns)
//! - `settings`: Match configuration loaded from JSON
//!
//! Rendering, audio and menus are external: they read `sim::GameState` and
//! feed `sim::TickInput` back in.

pub mod settings;
pub mod sim;

pub use settings::{PlayerSettings, Settings};

/// World and physics constants
pub mod consts {
    /// World dimensions (one terrain column per unit of width)
    pub const WORLD_WIDTH: usize = 800;
    pub const WORLD_HEIGHT: i32 = 600;

    /// Roster limits
    pub const MIN_PLAYERS: usize = 2;
    pub const MAX_PLAYERS: usize = 4;
    /// Minimum horizontal gap between tanks at spawn
    pub const MIN_PLAYER_GAP: f64 = 60.0;
    /// Rejection-sampling budget for spawn placement
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

    /// Tank body: half-disc resting on its base
    pub const TANK_RADIUS: f64 = 12.0;
    pub const TURRET_LENGTH: f64 = 1.5 * TANK_RADIUS;
    /// Vertical drop per tick while airborne
    pub const FALL_STEP: f64 = 3.0;
    pub const TANK_MAX_HEALTH: i32 = 100;

    /// Turret angle limits in degrees (90 = straight up)
    pub const TANK_MIN_ANGLE: i32 = 5;
    pub const TANK_MAX_ANGLE: i32 = 175;
    /// Base tilt beyond this no longer narrows the angle range
    pub const MAX_TILT_NARROWING: i32 = 80;
    pub const TANK_START_ANGLE: i32 = 90;

    pub const TANK_MIN_POWER: i32 = 20;
    pub const TANK_MAX_POWER: i32 = 120;
    pub const TANK_START_POWER: i32 = 50;

    /// Ballistics
    pub const GRAVITY: f64 = 9.81;
    /// Horizontal distance per tick before the cos(angle) factor
    pub const SHOT_SPEED: f64 = 4.0;

    /// Explosions
    pub const EXPLOSION_RADIUS: f64 = 15.0;
    /// Exaggerates crater depth relative to a true circle
    pub const CRATER_DEPTH_SCALE: f64 = 1.3;
    /// Health lost per unit of explosion overlap
    pub const DAMAGE_FACTOR: f64 = 5.0;

    /// Wind random walk
    pub const WIND_STEP: f64 = 0.01;
    pub const WIND_DECREASE_CHANCE: f64 = 0.03;
    pub const WIND_INCREASE_CHANCE: f64 = 0.03;
}

/// Sine of an angle in degrees
#[inline]
pub fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Cosine of an angle in degrees
#[inline]
pub fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

/// Tangent of an angle in degrees
#[inline]
pub fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}
