//! Betting session: drops, balance and hit statistics
//!
//! Each drop has its target zone chosen when it starts. Whatever animates the
//! ball only steers toward that zone and reports arrival; the payout comes
//! from the predetermined zone, never from where the ball physically landed.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::selector::{RandomSource, SeededRandom, select};
use super::zone::{ZoneId, ZoneTable};
use crate::error::{Error, Result};
use crate::history::{DropHistory, HistoryEntry};
use crate::persistence::SessionSnapshot;
use crate::settings::Settings;

/// Unique drop identifier (monotonic per session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DropId(pub u64);

impl fmt::Display for DropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a drop. `Resolved` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropStatus {
    InFlight,
    Resolved,
    /// Never arrived; stake forfeited, no hit recorded
    Expired,
}

/// One bet placed on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drop {
    pub drop_id: DropId,
    pub target_zone_id: ZoneId,
    pub bet_amount: f64,
    pub status: DropStatus,
}

/// Outcome of resolving a drop
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub zone_id: ZoneId,
    pub multiplier: f64,
    pub winnings: f64,
    pub new_balance: f64,
}

/// Per-zone line for the statistics panel
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStat {
    pub zone_id: ZoneId,
    pub multiplier: f64,
    pub hits: u64,
    pub percentage: f64,
}

/// Running totals for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// True signed balance; use `display_balance` for presentation
    pub balance: f64,
    pub total_drops: u64,
    pub per_zone_hits: BTreeMap<ZoneId, u64>,
    #[serde(default)]
    pub total_wagered: f64,
    #[serde(default)]
    pub total_won: f64,
}

impl SessionStats {
    fn new(table: &ZoneTable, balance: f64) -> Self {
        Self {
            balance,
            total_drops: 0,
            per_zone_hits: table.iter().map(|z| (z.id, 0)).collect(),
            total_wagered: 0.0,
            total_won: 0.0,
        }
    }

    /// Balance floored at zero
    pub fn display_balance(&self) -> f64 {
        self.balance.max(0.0)
    }

    pub fn hits(&self, zone: ZoneId) -> u64 {
        self.per_zone_hits.get(&zone).copied().unwrap_or(0)
    }

    /// Resolved drops across all zones
    pub fn total_hits(&self) -> u64 {
        self.per_zone_hits.values().sum()
    }

    /// Share of hits landing in `zone`, 0-100 (0 when nothing has landed)
    pub fn percentage(&self, zone: ZoneId) -> f64 {
        let total = self.total_hits();
        if total == 0 {
            return 0.0;
        }
        self.hits(zone) as f64 / total as f64 * 100.0
    }

    /// Winnings paid per unit wagered (0 when nothing wagered)
    pub fn return_to_player(&self) -> f64 {
        if self.total_wagered <= 0.0 {
            return 0.0;
        }
        self.total_won / self.total_wagered
    }

    /// Per-zone lines in table order
    pub fn zone_stats(&self, table: &ZoneTable) -> Vec<ZoneStat> {
        table
            .iter()
            .map(|z| ZoneStat {
                zone_id: z.id,
                multiplier: z.multiplier,
                hits: self.hits(z.id),
                percentage: self.percentage(z.id),
            })
            .collect()
    }

    fn reset(&mut self) {
        self.total_drops = 0;
        self.total_wagered = 0.0;
        self.total_won = 0.0;
        for hits in self.per_zone_hits.values_mut() {
            *hits = 0;
        }
    }
}

/// Accounting for one player against one zone table
#[derive(Debug)]
pub struct DropSession<R: RandomSource = SeededRandom> {
    table: ZoneTable,
    rng: R,
    stats: SessionStats,
    /// All drops started this session, by id
    drops: BTreeMap<DropId, Drop>,
    history: DropHistory,
    next_id: u64,
}

impl<R: RandomSource> DropSession<R> {
    pub fn new(table: ZoneTable, rng: R, starting_balance: f64) -> Self {
        info!(
            "Session started: {} zones, balance {:.2}, expected return {:.4}",
            table.len(),
            starting_balance,
            table.expected_multiplier()
        );
        Self {
            stats: SessionStats::new(&table, starting_balance),
            table,
            rng,
            drops: BTreeMap::new(),
            history: DropHistory::new(),
            next_id: 1,
        }
    }

    /// Build a session using the configured risk table and starting balance
    pub fn from_settings(settings: &Settings, rng: R) -> Result<Self> {
        let table = settings.risk.zone_table()?;
        Ok(Self::new(table, rng, settings.starting_balance))
    }

    fn next_drop_id(&mut self) -> DropId {
        let id = DropId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place a bet: deduct it, pick the target zone, and hand back the drop
    pub fn start(&mut self, bet_amount: f64) -> Result<Drop> {
        if !bet_amount.is_finite() || bet_amount <= 0.0 {
            warn!("Rejected bet {}", bet_amount);
            return Err(Error::InvalidBet(bet_amount));
        }

        let draw = self.rng.next_draw();
        let target_zone_id = select(&self.table, draw)?.id;

        let drop = Drop {
            drop_id: self.next_drop_id(),
            target_zone_id,
            bet_amount,
            status: DropStatus::InFlight,
        };

        self.stats.balance -= bet_amount;
        self.stats.total_drops += 1;
        self.stats.total_wagered += bet_amount;
        self.drops.insert(drop.drop_id, drop.clone());

        debug!(
            "Drop {} started: bet {:.2}, draw {:.6} -> zone {}",
            drop.drop_id, bet_amount, draw, target_zone_id
        );
        Ok(drop)
    }

    /// Pay out a drop that reached its zone. Succeeds at most once per drop.
    pub fn resolve(&mut self, drop_id: DropId) -> Result<Resolution> {
        let drop = self
            .drops
            .get_mut(&drop_id)
            .ok_or(Error::DropNotFound(drop_id))?;
        match drop.status {
            DropStatus::InFlight => {}
            DropStatus::Resolved => {
                warn!("Ignoring second resolve of drop {}", drop_id);
                return Err(Error::AlreadyResolved(drop_id));
            }
            DropStatus::Expired => return Err(Error::DropExpired(drop_id)),
        }

        let zone = self.table.get(drop.target_zone_id)?;
        let winnings = drop.bet_amount * zone.multiplier;
        drop.status = DropStatus::Resolved;

        self.stats.balance += winnings;
        self.stats.total_won += winnings;
        *self.stats.per_zone_hits.entry(zone.id).or_insert(0) += 1;

        self.history.record(HistoryEntry {
            drop_id,
            zone_id: zone.id,
            multiplier: zone.multiplier,
            bet: drop.bet_amount,
            winnings,
        });

        debug!(
            "Drop {} resolved in zone {} (x{}): +{:.2}, balance {:.2}",
            drop_id, zone.id, zone.multiplier, winnings, self.stats.balance
        );
        Ok(Resolution {
            zone_id: zone.id,
            multiplier: zone.multiplier,
            winnings,
            new_balance: self.stats.balance,
        })
    }

    /// Give up on a drop that never arrived. The stake stays forfeited.
    pub fn expire(&mut self, drop_id: DropId) -> Result<()> {
        let drop = self
            .drops
            .get_mut(&drop_id)
            .ok_or(Error::DropNotFound(drop_id))?;
        match drop.status {
            DropStatus::InFlight => {
                drop.status = DropStatus::Expired;
                debug!("Drop {} expired, stake {:.2} forfeited", drop_id, drop.bet_amount);
                Ok(())
            }
            DropStatus::Resolved => Err(Error::AlreadyResolved(drop_id)),
            DropStatus::Expired => Err(Error::DropExpired(drop_id)),
        }
    }

    /// Snapshot of the running totals
    pub fn stats(&self) -> SessionStats {
        self.stats.clone()
    }

    /// Per-zone hit counts and percentages in table order
    pub fn zone_stats(&self) -> Vec<ZoneStat> {
        self.stats.zone_stats(&self.table)
    }

    /// Zero hit counts, drop count and wager totals. Balance and in-flight drops are kept.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        self.history.clear();
        info!("Statistics reset (balance {:.2} kept)", self.stats.balance);
    }

    pub fn balance(&self) -> f64 {
        self.stats.balance
    }

    pub fn display_balance(&self) -> f64 {
        self.stats.display_balance()
    }

    /// Top up the balance
    pub fn add_funds(&mut self, amount: f64) -> Result<f64> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidBet(amount));
        }
        self.stats.balance += amount;
        info!("Added {:.2}, balance {:.2}", amount, self.stats.balance);
        Ok(self.stats.balance)
    }

    pub fn table(&self) -> &ZoneTable {
        &self.table
    }

    pub fn history(&self) -> &DropHistory {
        &self.history
    }

    pub fn get_drop(&self, drop_id: DropId) -> Result<&Drop> {
        self.drops.get(&drop_id).ok_or(Error::DropNotFound(drop_id))
    }

    /// Where the rendering side should steer this drop
    pub fn target_position(&self, drop_id: DropId) -> Result<Vec2> {
        let drop = self.get_drop(drop_id)?;
        Ok(self.table.get(drop.target_zone_id)?.target_position)
    }

    /// Outstanding drops in id order
    pub fn in_flight(&self) -> impl Iterator<Item = &Drop> {
        self.drops
            .values()
            .filter(|d| d.status == DropStatus::InFlight)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight().count()
    }

    /// Swap in another zone table, keeping balance, statistics and drop ids.
    /// Refused while any drop is in flight so no stake is left unsettled.
    pub fn switch_table(&mut self, table: ZoneTable) -> Result<()> {
        let in_flight = self.in_flight_count();
        if in_flight > 0 {
            warn!("Table switch refused with {} drops in flight", in_flight);
            return Err(Error::DropsInFlight(in_flight));
        }
        if let Some((unknown, _)) = self
            .stats
            .per_zone_hits
            .iter()
            .find(|(id, hits)| **hits > 0 && !table.contains(**id))
        {
            return Err(Error::ZoneNotFound(*unknown));
        }

        self.stats.per_zone_hits.retain(|id, _| table.contains(*id));
        for zone in table.iter() {
            self.stats.per_zone_hits.entry(zone.id).or_insert(0);
        }
        info!(
            "Switched to a {}-zone table, expected return {:.4}",
            table.len(),
            table.expected_multiplier()
        );
        self.table = table;
        Ok(())
    }

    /// Forget settled drops. Later calls for their ids report `DropNotFound`.
    pub fn prune_settled(&mut self) -> usize {
        let before = self.drops.len();
        self.drops.retain(|_, d| d.status == DropStatus::InFlight);
        before - self.drops.len()
    }

    /// Balance and statistics for saving
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stats: self.stats.clone(),
        }
    }

    /// Apply a saved snapshot. Every zone in it must exist in this table.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<()> {
        if let Some(unknown) = snapshot
            .stats
            .per_zone_hits
            .keys()
            .find(|id| !self.table.contains(**id))
        {
            warn!("Saved statistics reference unknown zone {}", unknown);
            return Err(Error::ZoneNotFound(*unknown));
        }

        let mut stats = snapshot.stats;
        for zone in self.table.iter() {
            stats.per_zone_hits.entry(zone.id).or_insert(0);
        }
        self.stats = stats;
        info!(
            "Restored session: balance {:.2}, {} drops",
            self.stats.balance, self.stats.total_drops
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::selector::FixedDraws;
    use crate::sim::zone::Zone;
    use proptest::prelude::*;

    fn basic_table() -> ZoneTable {
        ZoneTable::new(vec![
            Zone::new(1, 2.0, 0.5, Vec2::new(100.0, 0.0)),
            Zone::new(2, 0.5, 0.5, Vec2::new(300.0, 0.0)),
        ])
        .unwrap()
    }

    fn session(draws: Vec<f64>, balance: f64) -> DropSession<FixedDraws> {
        DropSession::new(basic_table(), FixedDraws::new(draws), balance)
    }

    #[test]
    fn test_basic_win() {
        let mut session = session(vec![0.2], 0.0);
        let drop = session.start(10.0).unwrap();
        assert_eq!(drop.target_zone_id, ZoneId(1));
        assert_eq!(drop.status, DropStatus::InFlight);
        assert_eq!(session.balance(), -10.0);
        assert_eq!(session.display_balance(), 0.0);

        let result = session.resolve(drop.drop_id).unwrap();
        assert_eq!(result.zone_id, ZoneId(1));
        assert_eq!(result.multiplier, 2.0);
        assert_eq!(result.winnings, 20.0);
        assert_eq!(result.new_balance, 10.0);
        assert_eq!(session.balance(), 10.0);
    }

    #[test]
    fn test_resolve_only_once() {
        let mut session = session(vec![0.7], 100.0);
        let drop = session.start(10.0).unwrap();
        session.resolve(drop.drop_id).unwrap();
        let balance = session.balance();

        let err = session.resolve(drop.drop_id).unwrap_err();
        assert!(matches!(err, Error::AlreadyResolved(id) if id == drop.drop_id));
        assert_eq!(session.balance(), balance);
        assert_eq!(session.stats().total_hits(), 1);
    }

    #[test]
    fn test_invalid_bets() {
        let mut session = session(vec![0.2], 100.0);
        for bet in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(session.start(bet), Err(Error::InvalidBet(_))));
        }
        assert_eq!(session.balance(), 100.0);
        assert_eq!(session.stats().total_drops, 0);
    }

    #[test]
    fn test_bad_draw_leaves_state_untouched() {
        let mut session = session(vec![1.5], 100.0);
        assert!(matches!(session.start(10.0), Err(Error::InvalidDraw(_))));
        assert_eq!(session.balance(), 100.0);
        assert_eq!(session.in_flight_count(), 0);
    }

    #[test]
    fn test_unknown_drop() {
        let mut session = session(vec![0.2], 100.0);
        assert!(matches!(
            session.resolve(DropId(42)),
            Err(Error::DropNotFound(DropId(42)))
        ));
        assert!(matches!(
            session.expire(DropId(42)),
            Err(Error::DropNotFound(_))
        ));
    }

    #[test]
    fn test_interleaved_drops() {
        let mut session = session(vec![0.2, 0.8, 0.1], 100.0);
        let a = session.start(10.0).unwrap();
        let b = session.start(20.0).unwrap();
        let c = session.start(5.0).unwrap();
        assert_eq!(session.in_flight_count(), 3);
        assert_eq!(session.balance(), 65.0);

        let rb = session.resolve(b.drop_id).unwrap();
        assert_eq!(rb.zone_id, ZoneId(2));
        assert_eq!(rb.winnings, 10.0);
        let ra = session.resolve(a.drop_id).unwrap();
        assert_eq!(ra.winnings, 20.0);

        assert_eq!(session.in_flight().map(|d| d.drop_id).collect::<Vec<_>>(), vec![c.drop_id]);
        assert_eq!(session.balance(), 95.0);
    }

    #[test]
    fn test_drop_ids_unique() {
        let mut session = session(vec![0.2], 100.0);
        let a = session.start(1.0).unwrap();
        let b = session.start(1.0).unwrap();
        assert_ne!(a.drop_id, b.drop_id);
    }

    #[test]
    fn test_statistics_percentages() {
        let mut session = session(vec![0.2, 0.2, 0.2, 0.9], 100.0);
        for _ in 0..4 {
            let drop = session.start(1.0).unwrap();
            session.resolve(drop.drop_id).unwrap();
        }
        let stats = session.stats();
        assert_eq!(stats.total_hits(), 4);
        assert_eq!(stats.hits(ZoneId(1)), 3);
        assert!((stats.percentage(ZoneId(1)) - 75.0).abs() < 1e-9);
        assert!((stats.percentage(ZoneId(2)) - 25.0).abs() < 1e-9);

        let lines = session.zone_stats();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].zone_id, ZoneId(1));
        assert_eq!(lines[0].hits, 3);
    }

    #[test]
    fn test_percentage_without_hits_is_zero() {
        let session = session(vec![0.2], 100.0);
        let stats = session.stats();
        assert_eq!(stats.percentage(ZoneId(1)), 0.0);
        assert_eq!(stats.hits(ZoneId(2)), 0);
        assert_eq!(stats.per_zone_hits.len(), 2);
        assert_eq!(stats.return_to_player(), 0.0);
    }

    #[test]
    fn test_reset_keeps_balance() {
        let mut session = session(vec![0.2, 0.9], 100.0);
        for _ in 0..3 {
            let drop = session.start(10.0).unwrap();
            session.resolve(drop.drop_id).unwrap();
        }
        let pending = session.start(10.0).unwrap();
        let balance = session.balance();

        session.reset_stats();
        let stats = session.stats();
        assert_eq!(stats.total_drops, 0);
        assert!(stats.per_zone_hits.values().all(|&h| h == 0));
        assert_eq!(stats.per_zone_hits.len(), 2);
        assert_eq!(session.balance(), balance);
        assert!(session.history().is_empty());

        // In-flight drop survives the reset
        assert!(session.resolve(pending.drop_id).is_ok());
    }

    #[test]
    fn test_expire_forfeits_stake() {
        let mut session = session(vec![0.2], 100.0);
        let drop = session.start(10.0).unwrap();
        session.expire(drop.drop_id).unwrap();
        assert_eq!(session.balance(), 90.0);
        assert_eq!(session.stats().total_hits(), 0);
        assert_eq!(session.in_flight_count(), 0);
        assert!(matches!(
            session.resolve(drop.drop_id),
            Err(Error::DropExpired(_))
        ));
        assert!(matches!(
            session.expire(drop.drop_id),
            Err(Error::DropExpired(_))
        ));

        let other = session.start(10.0).unwrap();
        session.resolve(other.drop_id).unwrap();
        assert!(matches!(
            session.expire(other.drop_id),
            Err(Error::AlreadyResolved(_))
        ));
    }

    #[test]
    fn test_prune_settled() {
        let mut session = session(vec![0.2], 100.0);
        let done = session.start(10.0).unwrap();
        let pending = session.start(10.0).unwrap();
        session.resolve(done.drop_id).unwrap();

        assert_eq!(session.prune_settled(), 1);
        assert!(matches!(
            session.resolve(done.drop_id),
            Err(Error::DropNotFound(_))
        ));
        assert!(session.get_drop(pending.drop_id).is_ok());
    }

    #[test]
    fn test_target_position_and_history() {
        let mut session = session(vec![0.9], 100.0);
        let drop = session.start(10.0).unwrap();
        assert_eq!(
            session.target_position(drop.drop_id).unwrap(),
            Vec2::new(300.0, 0.0)
        );
        session.resolve(drop.drop_id).unwrap();
        let latest = session.history().latest().unwrap();
        assert_eq!(latest.drop_id, drop.drop_id);
        assert_eq!(latest.winnings, 5.0);
    }

    #[test]
    fn test_add_funds_and_rtp() {
        let mut session = session(vec![0.2], 0.0);
        assert!(matches!(session.add_funds(0.0), Err(Error::InvalidBet(_))));
        assert_eq!(session.add_funds(50.0).unwrap(), 50.0);
        let drop = session.start(10.0).unwrap();
        session.resolve(drop.drop_id).unwrap();
        assert!((session.stats().return_to_player() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut session = session(vec![0.2, 0.9], 100.0);
        for _ in 0..2 {
            let drop = session.start(10.0).unwrap();
            session.resolve(drop.drop_id).unwrap();
        }
        let snapshot = session.snapshot();

        let mut fresh = DropSession::new(basic_table(), FixedDraws::new(vec![0.2]), 0.0);
        fresh.restore(snapshot).unwrap();
        assert_eq!(fresh.balance(), session.balance());
        assert_eq!(fresh.stats(), session.stats());
    }

    #[test]
    fn test_restore_rejects_unknown_zone() {
        let mut session = session(vec![0.2], 100.0);
        let mut snapshot = session.snapshot();
        snapshot.stats.per_zone_hits.insert(ZoneId(99), 3);
        assert!(matches!(
            session.restore(snapshot),
            Err(Error::ZoneNotFound(ZoneId(99)))
        ));
        assert_eq!(session.balance(), 100.0);
    }

    #[test]
    fn test_switch_table_refused_while_in_flight() {
        let mut session = session(vec![0.2, 0.9], 100.0);
        let first = session.start(10.0).unwrap();
        session.resolve(first.drop_id).unwrap();
        let pending = session.start(10.0).unwrap();

        let richer = ZoneTable::new(vec![
            Zone::new(1, 5.0, 0.5, Vec2::new(100.0, 0.0)),
            Zone::new(2, 0.1, 0.5, Vec2::new(300.0, 0.0)),
        ])
        .unwrap();
        assert!(matches!(
            session.switch_table(richer.clone()),
            Err(Error::DropsInFlight(1))
        ));
        assert_eq!(session.table().get(ZoneId(1)).unwrap().multiplier, 2.0);

        // Once settled the switch goes through and the pending drop is not lost
        session.resolve(pending.drop_id).unwrap();
        let balance = session.balance();
        session.switch_table(richer).unwrap();
        assert_eq!(session.balance(), balance);
        assert_eq!(session.stats().total_drops, 2);
        assert_eq!(session.stats().hits(ZoneId(1)), 1);

        let next = session.start(10.0).unwrap();
        assert!(next.drop_id > pending.drop_id);
        assert_eq!(session.resolve(next.drop_id).unwrap().multiplier, 5.0);
    }

    #[test]
    fn test_switch_table_rejects_missing_hit_zone() {
        let mut session = session(vec![0.2], 100.0);
        let drop = session.start(10.0).unwrap();
        session.resolve(drop.drop_id).unwrap();

        let other = ZoneTable::from_pairs(&[(1.0, 1.0)], &[]).unwrap();
        assert!(matches!(
            session.switch_table(other),
            Err(Error::ZoneNotFound(ZoneId(1)))
        ));
    }

    #[test]
    fn test_from_settings_uses_preset() {
        let settings = Settings::default();
        let session = DropSession::from_settings(&settings, SeededRandom::new(1)).unwrap();
        assert_eq!(session.table().len(), settings.risk.zone_table().unwrap().len());
        assert_eq!(session.balance(), settings.starting_balance);
    }

    proptest! {
        #[test]
        fn hits_sum_to_resolved_drops(draws in proptest::collection::vec(0.0f64..1.0, 1..64)) {
            let n = draws.len();
            let mut session = DropSession::new(basic_table(), FixedDraws::new(draws), 1000.0);
            for _ in 0..n {
                let drop = session.start(1.0).unwrap();
                session.resolve(drop.drop_id).unwrap();
            }
            let stats = session.stats();
            prop_assert_eq!(stats.total_hits(), n as u64);
            for (zone, hits) in &stats.per_zone_hits {
                let expected = 100.0 * *hits as f64 / n as f64;
                prop_assert!((stats.percentage(*zone) - expected).abs() < 1e-9);
            }
        }
    }
}
