//! Recent drop results
//!
//! Bounded list of the latest resolutions, newest first, for the results strip
//! next to the board.

use serde::{Deserialize, Serialize};

use crate::sim::{DropId, ZoneId};

/// Maximum number of results to keep
pub const MAX_HISTORY: usize = 10;

/// A single resolved drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub drop_id: DropId,
    pub zone_id: ZoneId,
    pub multiplier: f64,
    pub bet: f64,
    pub winnings: f64,
}

impl HistoryEntry {
    /// Winnings minus stake
    pub fn net(&self) -> f64 {
        self.winnings - self.bet
    }

    pub fn is_win(&self) -> bool {
        self.winnings > self.bet
    }
}

/// Recent results (newest first)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DropHistory {
    pub entries: Vec<HistoryEntry>,
}

impl DropHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_HISTORY),
        }
    }

    /// Push a result to the front, dropping the oldest past the cap
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY);
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    /// Highest multiplier among kept results
    pub fn best_multiplier(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|e| e.multiplier)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Sum of net results over kept entries
    pub fn recent_net(&self) -> f64 {
        self.entries.iter().map(HistoryEntry::net).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
