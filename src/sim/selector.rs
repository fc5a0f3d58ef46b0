//! Outcome selection by cumulative probability
//!
//! `select` is a pure function of (table, draw). Randomness comes from an
//! injected `RandomSource` so tests can replay fixed draws.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::zone::{Zone, ZoneTable};
use crate::error::{Error, Result};

/// Map a uniform draw in [0, 1) to exactly one zone.
///
/// Zones are walked in table order and the first one whose cumulative
/// probability exceeds `draw` wins, so zero-weight zones are never picked.
/// If float error leaves the final cumulative value at or below `draw`, the
/// last zone is returned.
pub fn select(table: &ZoneTable, draw: f64) -> Result<&Zone> {
    if !(0.0..1.0).contains(&draw) {
        return Err(Error::InvalidDraw(draw));
    }

    let total = table.total_weight();
    let mut cumulative = 0.0;
    for zone in table.iter() {
        cumulative += zone.weight / total;
        if draw < cumulative {
            return Ok(zone);
        }
    }

    // Rounding fallback
    table
        .all()
        .last()
        .ok_or(Error::InvalidDraw(draw))
}

/// Source of uniform draws in [0, 1)
pub trait RandomSource {
    fn next_draw(&mut self) -> f64;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_draw(&mut self) -> f64 {
        self()
    }
}

/// Seeded PCG generator for reproducible sessions
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct FixedDraws {
    draws: Vec<f64>,
    cursor: usize,
}

impl FixedDraws {
    /// An empty list yields 0.0 forever
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }
}

impl RandomSource for FixedDraws {
    fn next_draw(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw
    }
}
