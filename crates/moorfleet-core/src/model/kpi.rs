// ── KPI domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timestamped;
use super::time_range::TimeRange;
use super::unit::UnitId;

/// Point metrics for one unit over a range. Replaced wholesale on refresh.
///
/// Metric fields are `None` when the backend could not compute them
/// (no events in the window, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// Display id, when the backend tag maps back to a known unit.
    pub unit_id: Option<UnitId>,
    /// Raw backend tag, e.g. `"U1"`.
    pub unit_tag: Option<String>,
    pub range: TimeRange,
    pub mtbf_hours: Option<f64>,
    pub availability_pct: Option<f64>,
    pub utilization_pct: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

/// One KPI sample in a trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiHistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub mtbf_hours: Option<f64>,
    pub availability_pct: Option<f64>,
    pub utilization_pct: Option<f64>,
    pub alarm_frequency: Option<f64>,
}

impl Timestamped for KpiHistoryPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
