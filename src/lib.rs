//! Space Runner - simulation core of a side-scrolling arcade game
//!
//! Core modules:
//! - `sim`: Entity model, velocities, collisions, spawning and the frame controller
//! - `visual`: Entity dimensions supplied by the rendering side
//! - `audio`: Fire-and-forget sound playback contract
//! - `persistence`: Player profile and shop content storage
//! - `platform`: Clock abstraction
//! - `settings`: Data-driven simulation tuning

pub mod audio;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod visual;

pub use error::SimError;
pub use settings::Settings;

/// Game balance constants
///
/// All positions and speeds are in scroll-space: the visible screen spans
/// `0.0..1.0` on both axes, y grows downward, speeds are units per second.
pub mod consts {
    /// Horizontal scroll speeds (leftward, so registered negated)
    pub const ASTEROID_SPEED_X: f64 = 0.85;
    pub const COIN_SPEED_X: f64 = 0.7;
    pub const BACKGROUND_SPEED_X: f64 = 0.7;
    pub const UFO_SPEED_X: f64 = 0.7;
    pub const POWER_UP_SPEED_X: f64 = 0.7;

    /// Vertical speeds
    pub const ASTEROID_SPEED_Y: f64 = 0.3;
    pub const SHIP_SPEED_Y: f64 = 1.0;

    /// Ship start position
    pub const SHIP_START_X: f64 = 0.05;
    pub const SHIP_START_Y: f64 = 0.45;

    /// x coordinate just past the right screen edge where spawned content appears
    pub const SPAWN_LINE_X: f64 = 1.0;

    /// UFO sine path: y = A * sin(x * FREQ + PHASE + 2π * offset) + center
    pub const UFO_WAVE_AMPLITUDE: f64 = 0.35;
    pub const UFO_WAVE_FREQUENCY: f64 = 3.0;
    pub const UFO_WAVE_PHASE: f64 = 1.0;

    /// Power-up active durations (ms)
    pub const SHIELD_DURATION_MS: u64 = 10_000;
    pub const DOUBLE_COINS_DURATION_MS: u64 = 10_000;

    /// Scoring
    pub const MS_PER_SCORE_POINT: u64 = 10;
    pub const COIN_VALUE: u64 = 1;
    pub const COIN_SCORE: u64 = 25;
    pub const POWER_UP_SCORE: u64 = 50;
}

/// Scale a base reward by the active coin multiplier (`base * 2^multiplier`)
#[inline]
pub fn scaled_reward(base: u64, multiplier: u32) -> u64 {
    base.saturating_mul(1u64.checked_shl(multiplier).unwrap_or(u64::MAX))
}
