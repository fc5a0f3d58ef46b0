//! Deterministic game core
//!
//! All betting logic lives here. This module must be pure and deterministic:
//! - Randomness only through an injected `RandomSource`
//! - Outcome chosen at drop start, never at landing
//! - Stable iteration order (by zone table order and drop ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod selector;
pub mod session;
pub mod state;
pub mod tick;
pub mod zone;

pub use collision::{CollisionResult, ball_peg_collision, ball_side_wall_collision, bounce_velocity};
pub use selector::{FixedDraws, RandomSource, SeededRandom, select};
pub use session::{Drop, DropId, DropSession, DropStatus, Resolution, SessionStats, ZoneStat};
pub use state::{Board, BoardEvent, DropBall, Peg};
pub use tick::{advance, steering_force, tick};
pub use zone::{Zone, ZoneId, ZoneTable};
