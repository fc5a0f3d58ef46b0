//! Plinko - A weighted drop-game engine
//!
//! Core modules:
//! - `sim`: Deterministic core (zone tables, outcome selection, session accounting, board physics)
//! - `settings`: Player configuration and risk presets
//! - `history`: Recent drop results for display
//! - `persistence`: Save/load of balance and statistics
//! - `web`: Browser bindings (wasm32 only)

pub mod error;
pub mod history;
pub mod persistence;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{DistributionFault, Error, Result};
pub use history::DropHistory;
pub use settings::{RiskPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Allowed deviation of a zone table's weight sum from 1
    pub const PROBABILITY_EPSILON: f64 = 1e-4;

    /// Session defaults
    pub const DEFAULT_STARTING_BALANCE: f64 = 1000.0;
    pub const DEFAULT_BET: f64 = 10.0;

    /// Board dimensions (pixels, y grows downward)
    pub const BOARD_WIDTH: f32 = 800.0;
    pub const BOARD_HEIGHT: f32 = 600.0;
    pub const BOARD_TOP: f32 = 40.0;
    pub const FLOOR_Y: f32 = 560.0;
    pub const PEG_ROWS: u32 = 12;
    pub const PEG_RADIUS: f32 = 5.0;
    pub const PEG_SPACING: f32 = 40.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 900.0;
    /// Bounce energy kept after hitting a peg
    pub const RESTITUTION: f32 = 0.5;
    /// Maximum ball speed
    pub const BALL_MAX_SPEED: f32 = 700.0;
    /// Horizontal nudge toward the target bucket, per pixel of offset (pixels/s² per pixel)
    pub const STEER_STRENGTH: f32 = 16.0;
    /// Horizontal velocity damping while steering (critical for the default strength)
    pub const STEER_DAMPING: f32 = 8.0;
    /// Ticks before an unlanded ball is discarded (10 seconds at 120 Hz)
    pub const BALL_TTL_TICKS: u32 = 10 * 120;
}

/// Horizontal centers of `count` equal-width buckets spanning `width`, at height `floor`
pub fn bucket_centers(count: usize, width: f32, floor: f32) -> Vec<glam::Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let slot = width / count as f32;
    (0..count)
        .map(|i| glam::Vec2::new(slot * (i as f32 + 0.5), floor))
        .collect()
}
