//! Payout zones and the validated zone table
//!
//! A table is fixed once built. Weights must already form a distribution;
//! nothing is renormalized behind the caller's back.

use std::collections::HashSet;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PROBABILITY_EPSILON;
use crate::error::{DistributionFault, Error, Result};

/// Stable zone identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payout bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    /// Applied to the bet on hit
    pub multiplier: f64,
    /// Relative selection likelihood
    pub weight: f64,
    /// Where the rendering side should steer a ball for this zone (never read by the core)
    pub target_position: Vec2,
}

impl Zone {
    pub fn new(id: u32, multiplier: f64, weight: f64, target_position: Vec2) -> Self {
        Self {
            id: ZoneId(id),
            multiplier,
            weight,
            target_position,
        }
    }
}

/// Ordered, immutable set of zones whose weights sum to 1
#[derive(Debug, Clone, Serialize)]
pub struct ZoneTable {
    zones: Vec<Zone>,
    total_weight: f64,
}

impl ZoneTable {
    /// Validate and build a table
    pub fn new(zones: Vec<Zone>) -> Result<Self> {
        if zones.is_empty() {
            return Err(Error::InvalidDistribution(DistributionFault::Empty));
        }

        let mut seen = HashSet::with_capacity(zones.len());
        for zone in &zones {
            if !zone.weight.is_finite() || zone.weight < 0.0 {
                return Err(Error::InvalidDistribution(DistributionFault::BadWeight {
                    zone: zone.id,
                    weight: zone.weight,
                }));
            }
            if !zone.multiplier.is_finite() || zone.multiplier < 0.0 {
                return Err(Error::InvalidDistribution(
                    DistributionFault::BadMultiplier {
                        zone: zone.id,
                        multiplier: zone.multiplier,
                    },
                ));
            }
            if !seen.insert(zone.id) {
                return Err(Error::InvalidDistribution(DistributionFault::DuplicateId(
                    zone.id,
                )));
            }
        }

        let total_weight: f64 = zones.iter().map(|z| z.weight).sum();
        if (total_weight - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(Error::InvalidDistribution(DistributionFault::Sum(
                total_weight,
            )));
        }

        Ok(Self {
            zones,
            total_weight,
        })
    }

    /// Build a table from `(multiplier, weight)` pairs, assigning ids 0.. and
    /// the given positions in order. Missing positions default to the origin.
    pub fn from_pairs(pairs: &[(f64, f64)], positions: &[Vec2]) -> Result<Self> {
        let zones = pairs
            .iter()
            .enumerate()
            .map(|(i, &(multiplier, weight))| {
                let pos = positions.get(i).copied().unwrap_or(Vec2::ZERO);
                Zone::new(i as u32, multiplier, weight, pos)
            })
            .collect();
        Self::new(zones)
    }

    /// Look up a zone by id
    pub fn get(&self, id: ZoneId) -> Result<&Zone> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or(Error::ZoneNotFound(id))
    }

    /// All zones in table order
    pub fn all(&self) -> &[Zone] {
        &self.zones
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Sum of stored weights (within epsilon of 1)
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Expected payout per unit bet
    pub fn expected_multiplier(&self) -> f64 {
        self.zones
            .iter()
            .map(|z| z.multiplier * z.weight / self.total_weight)
            .sum()
    }

    pub fn contains(&self, id: ZoneId) -> bool {
        self.zones.iter().any(|z| z.id == id)
    }
}

impl<'a> IntoIterator for &'a ZoneTable {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}
