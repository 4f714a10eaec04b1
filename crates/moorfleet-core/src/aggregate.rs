// ── History aggregation ──
//
// Pure functions over in-memory series: range filtering, means, state
// totals, chart buckets and the small derived figures the views show.
// Nothing here performs I/O; `now` is always passed in.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{
    Alarm, AlarmPriority, KpiHistoryPoint, KpiSnapshot, MooringState, StateHistoryPoint,
    TimeRange, Timestamped, Unit,
};

/// Points at or after `range.cutoff(now)`, order preserved.
pub fn filter_since<T: Timestamped + Clone>(
    points: &[T],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<T> {
    let cutoff = range.cutoff(now);
    points
        .iter()
        .filter(|p| p.timestamp() >= cutoff)
        .cloned()
        .collect()
}

/// Arithmetic mean of the finite values. `None` means "no data".
pub fn average<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0_u32), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / f64::from(count))
}

// ── State totals ─────────────────────────────────────────────────────

/// Summed minutes per state in enumeration order, zero totals omitted.
pub fn state_distribution(points: &[StateHistoryPoint]) -> Vec<(MooringState, f64)> {
    let mut totals: HashMap<MooringState, f64> = HashMap::new();
    for point in points {
        *totals.entry(point.state).or_default() += point.duration_minutes;
    }
    let mut rows: Vec<(MooringState, f64)> =
        totals.into_iter().filter(|(_, total)| *total > 0.0).collect();
    rows.sort_by_key(|(state, _)| state.order_key());
    rows
}

/// The state with the largest summed duration. Ties go to the state that
/// comes first in enumeration order.
pub fn most_active_state(points: &[StateHistoryPoint]) -> Option<(MooringState, f64)> {
    let mut best: Option<(MooringState, f64)> = None;
    for (state, total) in state_distribution(points) {
        if best.is_none_or(|(_, top)| total > top) {
            best = Some((state, total));
        }
    }
    best
}

// ── Chart buckets ────────────────────────────────────────────────────

/// One chart slot: the samples in `[start, end)` and their metric means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
    pub samples: usize,
    pub mtbf_hours: Option<f64>,
    pub availability_pct: Option<f64>,
    pub utilization_pct: Option<f64>,
    pub alarm_frequency: Option<f64>,
}

/// Partition a KPI series into exactly `range.bucket_count()` buckets
/// ending at `now`. The last bucket also takes samples stamped exactly
/// `now`; samples outside the window are ignored.
pub fn bucket_series(
    points: &[KpiHistoryPoint],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<Bucket> {
    let edges = range.bucket_edges(now);
    let last = edges.len().saturating_sub(2);
    edges
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let (start, end) = (w[0], w[1]);
            let inside: Vec<&KpiHistoryPoint> = points
                .iter()
                .filter(|p| p.timestamp >= start && (p.timestamp < end || (i == last && p.timestamp == end)))
                .collect();
            Bucket {
                start,
                end,
                label: range.label(start),
                samples: inside.len(),
                mtbf_hours: average(inside.iter().filter_map(|p| p.mtbf_hours)),
                availability_pct: average(inside.iter().filter_map(|p| p.availability_pct)),
                utilization_pct: average(inside.iter().filter_map(|p| p.utilization_pct)),
                alarm_frequency: average(inside.iter().filter_map(|p| p.alarm_frequency)),
            }
        })
        .collect()
}

// ── Fleet figures ────────────────────────────────────────────────────

/// Headline numbers for the fleet overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub units: usize,
    pub online: usize,
    pub moored: usize,
    pub avg_mtbf_hours: Option<f64>,
    pub avg_availability_pct: Option<f64>,
    pub avg_utilization_pct: Option<f64>,
}

impl FleetSummary {
    pub fn compute(units: &[Unit], kpis: &[KpiSnapshot]) -> Self {
        Self {
            units: units.len(),
            online: units.iter().filter(|u| u.online).count(),
            moored: units
                .iter()
                .filter(|u| u.state == MooringState::Moored)
                .count(),
            avg_mtbf_hours: average(kpis.iter().filter_map(|k| k.mtbf_hours)),
            avg_availability_pct: average(kpis.iter().filter_map(|k| k.availability_pct)),
            avg_utilization_pct: average(kpis.iter().filter_map(|k| k.utilization_pct)),
        }
    }
}

/// High/critical alarms that are not cleared yet, newest first.
pub fn critical_open_alarms(alarms: &[Alarm], limit: usize) -> Vec<Alarm> {
    let mut open: Vec<Alarm> = alarms
        .iter()
        .filter(|a| a.priority >= AlarmPriority::High && a.is_open())
        .cloned()
        .collect();
    open.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    open.truncate(limit);
    open
}

/// Coarse relative age: `42 sec ago`, `5 min ago`, `3 hr ago`, `2 days ago`.
/// Small clock skew into the future is treated as the past.
pub fn time_ago(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds().unsigned_abs();
    match secs {
        0..60 => format!("{secs} sec ago"),
        60..3_600 => format!("{} min ago", secs / 60),
        3_600..86_400 => format!("{} hr ago", secs / 3_600),
        _ => format!("{} days ago", secs / 86_400),
    }
}
