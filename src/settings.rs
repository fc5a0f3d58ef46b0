//! Player settings and risk presets
//!
//! Persisted separately from the session save in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::bucket_centers;
use crate::consts::*;
use crate::error::Result;
use crate::sim::ZoneTable;

/// Shared bucket weights, edge to edge (sum to 1)
const BUCKET_WEIGHTS: [f64; 12] = [
    0.005, 0.015, 0.04, 0.09, 0.15, 0.2, 0.2, 0.15, 0.09, 0.04, 0.015, 0.005,
];

const LOW_MULTIPLIERS: [f64; 12] = [8.0, 3.0, 1.5, 1.2, 1.0, 0.4, 0.4, 1.0, 1.2, 1.5, 3.0, 8.0];
const MEDIUM_MULTIPLIERS: [f64; 12] = [20.0, 5.0, 2.0, 1.1, 0.5, 0.3, 0.3, 0.5, 1.1, 2.0, 5.0, 20.0];
const HIGH_MULTIPLIERS: [f64; 12] = [40.0, 6.0, 1.6, 0.5, 0.3, 0.2, 0.2, 0.3, 0.5, 1.6, 6.0, 40.0];

/// Payout table presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
pub enum RiskPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskPreset::Low => "Low",
            RiskPreset::Medium => "Medium",
            RiskPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(RiskPreset::Low),
            "medium" | "med" => Some(RiskPreset::Medium),
            "high" => Some(RiskPreset::High),
            _ => None,
        }
    }

    /// Multipliers edge to edge
    pub fn multipliers(&self) -> &'static [f64; 12] {
        match self {
            RiskPreset::Low => &LOW_MULTIPLIERS,
            RiskPreset::Medium => &MEDIUM_MULTIPLIERS,
            RiskPreset::High => &HIGH_MULTIPLIERS,
        }
    }

    /// Zone table for this preset with buckets laid out along the board floor
    pub fn zone_table(&self) -> Result<ZoneTable> {
        let pairs: Vec<(f64, f64)> = self
            .multipliers()
            .iter()
            .copied()
            .zip(BUCKET_WEIGHTS)
            .collect();
        let positions = bucket_centers(pairs.len(), BOARD_WIDTH, FLOOR_Y);
        ZoneTable::from_pairs(&pairs, &positions)
    }
}

/// Player settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Payout table
    pub risk: RiskPreset,
    /// Balance for a fresh session
    pub starting_balance: f64,
    /// Bet pre-filled in the bet box
    pub default_bet: f64,
    /// Ticks before a ball that never lands is discarded
    pub ball_ttl_ticks: u32,
    /// Horizontal pull toward the target bucket
    pub steer_strength: f32,
    /// Fixed seed for reproducible runs (random when absent)
    pub seed: Option<u64>,
    /// Show the recent results strip
    pub show_history: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            risk: RiskPreset::Medium,
            starting_balance: DEFAULT_STARTING_BALANCE,
            default_bet: DEFAULT_BET,
            ball_ttl_ticks: BALL_TTL_TICKS,
            steer_strength: STEER_STRENGTH,
            seed: None,
            show_history: true,
        }
    }
}

impl Settings {
    /// Create settings from a risk preset
    pub fn from_preset(risk: RiskPreset) -> Self {
        Self {
            risk,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "plinko_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid_tables() {
        for preset in [RiskPreset::Low, RiskPreset::Medium, RiskPreset::High] {
            let table = preset.zone_table().unwrap();
            assert_eq!(table.len(), 12);
            // House keeps an edge on every preset
            assert!(table.expected_multiplier() < 1.0, "{}", preset.as_str());
            // Buckets ordered left to right along the floor
            let xs: Vec<f32> = table.iter().map(|z| z.target_position.x).collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]));
            assert!(table.iter().all(|z| z.target_position.y == FLOOR_Y));
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(RiskPreset::from_str("HIGH"), Some(RiskPreset::High));
        assert_eq!(RiskPreset::from_str("med"), Some(RiskPreset::Medium));
        assert_eq!(RiskPreset::from_str("extreme"), None);
        assert_eq!(RiskPreset::Low.as_str(), "Low");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"risk":"High","starting_balance":250.0}"#).unwrap();
        assert_eq!(settings.risk, RiskPreset::High);
        assert_eq!(settings.starting_balance, 250.0);
        assert_eq!(settings.default_bet, DEFAULT_BET);
        assert!(settings.seed.is_none());
        assert!(settings.show_history);

        let hidden = Settings::from_json(r#"{"show_history":false}"#).unwrap();
        assert!(!hidden.show_history);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::from_preset(RiskPreset::Low);
        settings.seed = Some(7);
        let parsed = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(parsed.risk, RiskPreset::Low);
        assert_eq!(parsed.seed, Some(7));
    }

    #[test]
    fn test_bad_json() {
        assert!(Settings::from_json("not json").is_err());
    }
}
