//! Crate error type
//!
//! Every error is local and synchronous: the immediate caller decides whether
//! to fix configuration, re-prompt the player, or log and ignore.

use thiserror::Error;

use crate::sim::{DropId, ZoneId};

/// Why a zone table was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionFault {
    #[error("zone table is empty")]
    Empty,
    /// A weight was negative, NaN or infinite
    #[error("zone {zone} has invalid weight {weight}")]
    BadWeight { zone: ZoneId, weight: f64 },
    /// A multiplier was negative, NaN or infinite
    #[error("zone {zone} has invalid multiplier {multiplier}")]
    BadMultiplier { zone: ZoneId, multiplier: f64 },
    #[error("zone id {0} is duplicated")]
    DuplicateId(ZoneId),
    #[error("weights sum to {0} instead of 1")]
    Sum(f64),
}

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid distribution: {0}")]
    InvalidDistribution(DistributionFault),
    #[error("zone {0} not found")]
    ZoneNotFound(ZoneId),
    #[error("drop {0} not found")]
    DropNotFound(DropId),
    #[error("invalid bet: {0}")]
    InvalidBet(f64),
    #[error("drop {0} already resolved")]
    AlreadyResolved(DropId),
    #[error("drop {0} expired")]
    DropExpired(DropId),
    #[error("{0} drops still in flight")]
    DropsInFlight(usize),
    #[error("draw {0} is outside [0, 1)")]
    InvalidDraw(f64),
    #[error("unsupported save version: {found} (expected {expected})")]
    UnsupportedSave { found: u32, expected: u32 },
    #[error("save data error: {0}")]
    Save(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
