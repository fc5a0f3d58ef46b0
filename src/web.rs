//! Browser bindings
//!
//! `WebGame` owns a session and a reference board. A page can either let the
//! board animate balls (`frame` + `ball_positions`) or run its own physics
//! engine and call `resolve`/`expire` when its bodies land.

use wasm_bindgen::prelude::*;

use crate::persistence::SaveEnvelope;
use crate::settings::{RiskPreset, Settings};
use crate::sim::{Board, BoardEvent, DropId, DropSession, RandomSource, advance};

/// `Math.random` as a draw source
#[derive(Debug, Default, Clone, Copy)]
pub struct JsRandom;

impl RandomSource for JsRandom {
    fn next_draw(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

fn js_err(e: crate::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Plinko starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    session: DropSession<JsRandom>,
    board: Board,
    settings: Settings,
    accumulator: f32,
}

#[wasm_bindgen]
impl WebGame {
    /// Build from stored settings, restoring a saved session when one exists
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let settings = Settings::load();
        let mut session = DropSession::from_settings(&settings, JsRandom).map_err(js_err)?;
        if let Some(snapshot) = SaveEnvelope::load() {
            if let Err(e) = session.restore(snapshot) {
                log::warn!("Ignoring saved session: {}", e);
            }
        }
        Ok(Self {
            board: Board::from_settings(&settings),
            session,
            settings,
            accumulator: 0.0,
        })
    }

    /// Switch payout table. Fails while any ball is still in flight.
    pub fn set_risk(&mut self, name: &str) -> Result<(), JsValue> {
        let risk = RiskPreset::from_str(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown risk level: {}", name)))?;
        self.session
            .switch_table(risk.zone_table().map_err(js_err)?)
            .map_err(js_err)?;
        self.settings.risk = risk;
        self.settings.save();
        self.save();
        Ok(())
    }

    pub fn show_history(&self) -> bool {
        self.settings.show_history
    }

    pub fn set_show_history(&mut self, show: bool) {
        self.settings.show_history = show;
        self.settings.save();
    }

    /// Place a bet and spawn its ball. Returns the drop id.
    pub fn drop_ball(&mut self, bet: f64) -> Result<f64, JsValue> {
        let drop = self.session.start(bet).map_err(js_err)?;
        let target = self
            .session
            .target_position(drop.drop_id)
            .map_err(js_err)?;
        self.board.spawn(&drop, target);
        Ok(drop.drop_id.0 as f64)
    }

    /// Place a bet without spawning a ball; returns `[drop_id, target_x, target_y]`
    /// for a page that runs its own physics
    pub fn start_drop(&mut self, bet: f64) -> Result<Vec<f64>, JsValue> {
        let drop = self.session.start(bet).map_err(js_err)?;
        let target = self
            .session
            .target_position(drop.drop_id)
            .map_err(js_err)?;
        Ok(vec![
            drop.drop_id.0 as f64,
            target.x as f64,
            target.y as f64,
        ])
    }

    /// Report that an externally simulated ball landed. Returns the winnings.
    pub fn resolve(&mut self, drop_id: f64) -> Result<f64, JsValue> {
        let result = self
            .session
            .resolve(DropId(drop_id as u64))
            .map_err(js_err)?;
        self.save();
        Ok(result.winnings)
    }

    /// Report that an externally simulated ball was discarded
    pub fn expire(&mut self, drop_id: f64) -> Result<(), JsValue> {
        self.session
            .expire(DropId(drop_id as u64))
            .map_err(js_err)
    }

    /// Advance the board by `dt_ms`, settling any balls that finished.
    /// Returns the total winnings paid this frame.
    pub fn frame(&mut self, dt_ms: f64) -> f64 {
        let events = advance(&mut self.board, &mut self.accumulator, (dt_ms / 1000.0) as f32);
        let mut paid = 0.0;
        for event in &events {
            match *event {
                BoardEvent::Landed { drop_id, .. } => match self.session.resolve(drop_id) {
                    Ok(result) => paid += result.winnings,
                    Err(e) => log::warn!("Landing ignored: {}", e),
                },
                BoardEvent::TimedOut { drop_id } => {
                    if let Err(e) = self.session.expire(drop_id) {
                        log::warn!("Timeout ignored: {}", e);
                    }
                }
            }
        }
        if !events.is_empty() {
            self.session.prune_settled();
            self.save();
        }
        paid
    }

    /// Flat `[x0, y0, x1, y1, ...]` of active balls for drawing
    pub fn ball_positions(&self) -> Vec<f32> {
        self.board
            .balls
            .iter()
            .flat_map(|b| [b.pos.x, b.pos.y])
            .collect()
    }

    /// Flat `[x0, y0, ...]` of peg centers
    pub fn peg_positions(&self) -> Vec<f32> {
        self.board
            .pegs
            .iter()
            .flat_map(|p| [p.pos.x, p.pos.y])
            .collect()
    }

    /// Multipliers in bucket order
    pub fn multipliers(&self) -> Vec<f64> {
        self.session.table().iter().map(|z| z.multiplier).collect()
    }

    /// Balance for display (never below zero)
    pub fn balance(&self) -> f64 {
        self.session.display_balance()
    }

    pub fn default_bet(&self) -> f64 {
        self.settings.default_bet
    }

    pub fn total_drops(&self) -> f64 {
        self.session.stats().total_drops as f64
    }

    /// Per-zone stats as JSON: `[{"zone": id, "multiplier": m, "hits": n, "percentage": p}, ...]`
    pub fn stats_json(&self) -> String {
        let lines: Vec<serde_json::Value> = self
            .session
            .zone_stats()
            .into_iter()
            .map(|s| {
                serde_json::json!({
                    "zone": s.zone_id.0,
                    "multiplier": s.multiplier,
                    "hits": s.hits,
                    "percentage": s.percentage,
                })
            })
            .collect();
        serde_json::Value::Array(lines).to_string()
    }

    /// Recent results as JSON, newest first. Empty when the strip is hidden.
    pub fn history_json(&self) -> String {
        if !self.settings.show_history {
            return "[]".to_string();
        }
        serde_json::to_string(&self.session.history().entries)
            .unwrap_or_else(|_| "[]".to_string())
    }

    pub fn reset_stats(&mut self) {
        self.session.reset_stats();
        self.save();
    }

    pub fn add_funds(&mut self, amount: f64) -> Result<f64, JsValue> {
        let balance = self.session.add_funds(amount).map_err(js_err)?;
        self.save();
        Ok(balance)
    }
}

impl WebGame {
    fn save(&self) {
        SaveEnvelope::new(self.session.snapshot()).save();
    }
}
