// ── Per-view data store ──
//
// Everything one dashboard view displays, owned by that view. Refresh
// cycles write through generation-checked `apply_*` methods so a cycle
// that has been superseded can never overwrite newer data.

mod collection;
mod slot;

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::aggregate::{self, FleetSummary};
use crate::model::{
    Alarm, AlarmId, AlarmStatus, KpiHistoryPoint, KpiSnapshot, MooringState, StateHistoryPoint,
    Unit, UnitId,
};

use collection::KeyedCollection;
use slot::Slot;

// ── Alarm book ───────────────────────────────────────────────────────

/// The alarms a view currently shows, keyed by id.
///
/// Status only moves forward: a refresh carrying an older status than the
/// one already confirmed locally keeps the local one.
pub struct AlarmBook {
    alarms: KeyedCollection<Alarm>,
}

impl Default for AlarmBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmBook {
    pub fn new() -> Self {
        Self {
            alarms: KeyedCollection::new(),
        }
    }

    /// Build a book from a one-shot fetch.
    pub fn from_alarms(alarms: Vec<Alarm>) -> Self {
        let book = Self::new();
        book.replace_all(alarms);
        book
    }

    pub fn get(&self, id: &AlarmId) -> Option<Arc<Alarm>> {
        self.alarms.get(id.as_str())
    }

    pub fn snapshot(&self) -> Arc<Vec<Arc<Alarm>>> {
        self.alarms.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Alarm>>>> {
        self.alarms.subscribe()
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance one alarm to `target`. Returns `Some(true)` if the status
    /// changed, `Some(false)` if it was already there or beyond, `None` if
    /// the alarm is not in the book.
    pub fn advance(&self, id: &AlarmId, target: AlarmStatus) -> Option<bool> {
        self.alarms.update(id.as_str(), |alarm| alarm.advance_to(target))
    }

    pub(crate) fn replace_all(&self, incoming: Vec<Alarm>) {
        let rows = incoming
            .into_iter()
            .map(|alarm| (alarm.id.to_string(), alarm))
            .collect();
        self.alarms
            .replace_all_merged(rows, |known, alarm| {
                alarm.advance_to(known.status());
            });
    }
}

// ── View store ───────────────────────────────────────────────────────

/// Displayed state of one view.
///
/// Readers take cheap `Arc` snapshots or subscribe to `watch` receivers.
/// Writers are the view's refresh cycles; each carries the generation it
/// was started with and is ignored once a newer cycle has begun.
pub struct ViewStore {
    units: KeyedCollection<Unit>,
    kpis: KeyedCollection<KpiSnapshot>,
    alarms: AlarmBook,
    kpi_history: Slot<Vec<KpiHistoryPoint>>,
    state_history: Slot<Vec<StateHistoryPoint>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    cycles: watch::Sender<u64>,
    generation: Mutex<u64>,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        let (cycles, _) = watch::channel(0);
        Self {
            units: KeyedCollection::new(),
            kpis: KeyedCollection::new(),
            alarms: AlarmBook::new(),
            kpi_history: Slot::new(),
            state_history: Slot::new(),
            last_refresh,
            cycles,
            generation: Mutex::new(0),
        }
    }

    // ── Cycle bookkeeping ────────────────────────────────────────────

    /// Start a new cycle, superseding any earlier one.
    pub(crate) fn begin_cycle(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        *generation
    }

    /// Run `apply` only if `generation` is still the latest cycle. The
    /// generation lock is held across the write.
    fn apply_if_current(&self, generation: u64, apply: impl FnOnce(&Self)) -> bool {
        let current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != generation {
            return false;
        }
        apply(self);
        true
    }

    pub(crate) fn apply_units(&self, generation: u64, units: Vec<Unit>) -> bool {
        self.apply_if_current(generation, |s| {
            s.units
                .replace_all(units.into_iter().map(|u| (u.id.to_string(), u)).collect());
        })
    }

    pub(crate) fn apply_kpis(&self, generation: u64, kpis: Vec<KpiSnapshot>) -> bool {
        self.apply_if_current(generation, |s| {
            let rows = kpis
                .into_iter()
                .enumerate()
                .map(|(i, k)| {
                    let key = k
                        .unit_tag
                        .clone()
                        .unwrap_or_else(|| format!("#{i}"));
                    (key, k)
                })
                .collect();
            s.kpis.replace_all(rows);
        })
    }

    pub(crate) fn apply_alarms(&self, generation: u64, alarms: Vec<Alarm>) -> bool {
        self.apply_if_current(generation, |s| s.alarms.replace_all(alarms))
    }

    pub(crate) fn apply_kpi_history(&self, generation: u64, points: Vec<KpiHistoryPoint>) -> bool {
        self.apply_if_current(generation, |s| s.kpi_history.set(points))
    }

    pub(crate) fn apply_state_history(
        &self,
        generation: u64,
        points: Vec<StateHistoryPoint>,
    ) -> bool {
        self.apply_if_current(generation, |s| s.state_history.set(points))
    }

    /// Mark a cycle as finished. Superseded cycles leave no trace.
    pub(crate) fn finish_cycle(&self, generation: u64, at: DateTime<Utc>) -> bool {
        self.apply_if_current(generation, |s| {
            s.last_refresh.send_modify(|t| *t = Some(at));
            s.cycles.send_modify(|n| *n += 1);
        })
    }

    // ── Readers ──────────────────────────────────────────────────────

    pub fn units(&self) -> Arc<Vec<Arc<Unit>>> {
        self.units.snapshot()
    }

    pub fn unit(&self, id: &UnitId) -> Option<Arc<Unit>> {
        self.units.get(id.as_str())
    }

    pub fn subscribe_units(&self) -> watch::Receiver<Arc<Vec<Arc<Unit>>>> {
        self.units.subscribe()
    }

    pub fn kpis(&self) -> Arc<Vec<Arc<KpiSnapshot>>> {
        self.kpis.snapshot()
    }

    pub fn alarms(&self) -> &AlarmBook {
        &self.alarms
    }

    pub fn kpi_history(&self) -> Option<Arc<Vec<KpiHistoryPoint>>> {
        self.kpi_history.get()
    }

    pub fn subscribe_kpi_history(&self) -> watch::Receiver<Option<Arc<Vec<KpiHistoryPoint>>>> {
        self.kpi_history.subscribe()
    }

    pub fn state_history(&self) -> Option<Arc<Vec<StateHistoryPoint>>> {
        self.state_history.get()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Number of cycles that ran to completion.
    pub fn completed_cycles(&self) -> u64 {
        *self.cycles.borrow()
    }

    /// Ticks once per completed cycle.
    pub fn subscribe_cycles(&self) -> watch::Receiver<u64> {
        self.cycles.subscribe()
    }

    // ── Derived figures ──────────────────────────────────────────────

    pub fn summary(&self) -> FleetSummary {
        let units: Vec<Unit> = self.units().iter().map(|u| Unit::clone(u)).collect();
        let kpis: Vec<KpiSnapshot> = self.kpis().iter().map(|k| KpiSnapshot::clone(k)).collect();
        FleetSummary::compute(&units, &kpis)
    }

    /// Most active state over the loaded (range-filtered) state history.
    pub fn most_active_state(&self) -> Option<(MooringState, f64)> {
        self.state_history
            .get()
            .and_then(|points| aggregate::most_active_state(&points))
    }
}
