//! Board state for the reference ball simulation
//!
//! This is the physics side of a drop: it only moves balls toward the target
//! the session already chose and reports when each one lands or times out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::session::{Drop, DropId};
use crate::consts::*;
use crate::settings::Settings;

/// A fixed peg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
}

/// A ball animating one drop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropBall {
    pub drop_id: DropId,
    /// Target bucket position from the zone table
    pub target: Vec2,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Ticks since spawn
    pub age_ticks: u32,
}

impl DropBall {
    pub fn new(drop_id: DropId, target: Vec2, pos: Vec2) -> Self {
        Self {
            drop_id,
            target,
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            age_ticks: 0,
        }
    }
}

/// What happened to a ball this tick. Each ball reports exactly once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardEvent {
    /// Reached the floor; the host should resolve the drop
    Landed { drop_id: DropId, pos: Vec2 },
    /// Exceeded its lifetime; the host should expire the drop
    TimedOut { drop_id: DropId },
}

impl BoardEvent {
    pub fn drop_id(&self) -> DropId {
        match self {
            BoardEvent::Landed { drop_id, .. } | BoardEvent::TimedOut { drop_id } => *drop_id,
        }
    }
}

/// Peg field, walls and active balls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub floor_y: f32,
    pub pegs: Vec<Peg>,
    /// Active balls (sorted by drop id for determinism)
    pub balls: Vec<DropBall>,
    pub steer_strength: f32,
    pub ball_ttl_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(PEG_ROWS)
    }
}

impl Board {
    /// Standard board with `rows` rows of pegs, the first row holding 3
    pub fn new(rows: u32) -> Self {
        let mut pegs = Vec::new();
        let center_x = BOARD_WIDTH / 2.0;
        for row in 0..rows {
            let count = row + 3;
            let y = BOARD_TOP + PEG_SPACING * (row as f32 + 1.0);
            let row_width = PEG_SPACING * (count - 1) as f32;
            for col in 0..count {
                let x = center_x - row_width / 2.0 + PEG_SPACING * col as f32;
                pegs.push(Peg {
                    pos: Vec2::new(x, y),
                    radius: PEG_RADIUS,
                });
            }
        }

        Self {
            width: BOARD_WIDTH,
            floor_y: FLOOR_Y,
            pegs,
            balls: Vec::new(),
            steer_strength: STEER_STRENGTH,
            ball_ttl_ticks: BALL_TTL_TICKS,
            time_ticks: 0,
        }
    }

    /// Board with steering and lifetime taken from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let mut board = Self::new(PEG_ROWS);
        board.steer_strength = settings.steer_strength;
        board.ball_ttl_ticks = settings.ball_ttl_ticks;
        board
    }

    /// Add a ball for a freshly started drop
    pub fn spawn(&mut self, drop: &Drop, target: Vec2) {
        // Small deterministic jitter so balls don't stack on the first peg
        let jitter = (drop.drop_id.0.wrapping_mul(37) % 21) as f32 - 10.0;
        let pos = Vec2::new(self.width / 2.0 + jitter, BOARD_TOP);
        self.balls.push(DropBall::new(drop.drop_id, target, pos));
        self.balls.sort_by_key(|b| b.drop_id);
    }

    /// Remove a ball without reporting it
    pub fn remove(&mut self, drop_id: DropId) -> bool {
        let before = self.balls.len();
        self.balls.retain(|b| b.drop_id != drop_id);
        self.balls.len() != before
    }

    pub fn ball(&self, drop_id: DropId) -> Option<&DropBall> {
        self.balls.iter().find(|b| b.drop_id == drop_id)
    }

    pub fn is_idle(&self) -> bool {
        self.balls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::DropStatus;
    use crate::sim::zone::ZoneId;

    fn drop(id: u64) -> Drop {
        Drop {
            drop_id: DropId(id),
            target_zone_id: ZoneId(0),
            bet_amount: 1.0,
            status: DropStatus::InFlight,
        }
    }

    #[test]
    fn test_peg_layout() {
        let board = Board::new(3);
        assert_eq!(board.pegs.len(), 3 + 4 + 5);
        assert!(board.pegs.iter().all(|p| p.pos.y < board.floor_y));
        assert!(board.pegs.iter().all(|p| p.pos.x > 0.0 && p.pos.x < board.width));
    }

    #[test]
    fn test_spawn_keeps_id_order() {
        let mut board = Board::new(0);
        board.spawn(&drop(5), Vec2::ZERO);
        board.spawn(&drop(2), Vec2::ZERO);
        let ids: Vec<DropId> = board.balls.iter().map(|b| b.drop_id).collect();
        assert_eq!(ids, vec![DropId(2), DropId(5)]);
        assert!(board.ball(DropId(5)).is_some());
    }

    #[test]
    fn test_remove() {
        let mut board = Board::new(0);
        board.spawn(&drop(1), Vec2::ZERO);
        assert!(board.remove(DropId(1)));
        assert!(!board.remove(DropId(1)));
        assert!(board.is_idle());
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            ball_ttl_ticks: 30,
            ..Settings::default()
        };
        let board = Board::from_settings(&settings);
        assert_eq!(board.ball_ttl_ticks, 30);
        assert_eq!(board.pegs.len(), Board::new(PEG_ROWS).pegs.len());
    }
}
