// Backend response types
//
// Wire records exactly as the backend serves them. Fields use
// `#[serde(default)]` liberally: the dashboard backend omits fields
// freely and mixes numeric and string identifiers across routes.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Scalars ──────────────────────────────────────────────────────────

/// A value the backend sends as either an integer or a string
/// (unit ids, alarm ids, alarm priorities).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ── Units ────────────────────────────────────────────────────────────

/// Unit status row from `GET /api/units` and `GET /api/units/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    #[serde(default)]
    pub unit_id: Option<Scalar>,
    /// Display name, e.g. `"Unit 1"`.
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// 1..=11, see the mooring state table.
    #[serde(default)]
    pub state_code: Option<i64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub installation_year: Option<i32>,
    #[serde(default)]
    pub commissioned_year: Option<i32>,
    #[serde(default)]
    pub sla_active: Option<bool>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub end_user: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub warranty_status: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One state transition from `GET /api/units/{id}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateHistoryRecord {
    pub timestamp: String,
    #[serde(default, alias = "state_code")]
    pub state: i64,
    /// Minutes spent in `state` before the next transition.
    #[serde(default)]
    pub duration: f64,
}

// ── KPIs ─────────────────────────────────────────────────────────────

/// KPI snapshot from `GET /api/kpis?range=R` (array) or
/// `GET /api/kpis/{id}/{range}` (single object).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiRecord {
    /// Backend unit tag, e.g. `"U1"`.
    #[serde(default)]
    pub unit: Option<String>,
    /// Canonical range token the backend computed for.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub availability: Option<f64>,
    #[serde(default)]
    pub mtbf: Option<f64>,
    #[serde(default)]
    pub mtbf_details: Option<serde_json::Value>,
    #[serde(default)]
    pub utilization: Option<f64>,
}

/// One sample from `GET /api/kpis/{id}/history?range=R`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiHistoryRecord {
    pub timestamp: String,
    /// Availability %, served as `uptime` by the history route.
    #[serde(default, alias = "availability")]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub mtbf: Option<f64>,
    #[serde(default)]
    pub utilization: Option<f64>,
    #[serde(default, alias = "alarmFrequency")]
    pub alarm_frequency: Option<f64>,
}

// ── Alarms ───────────────────────────────────────────────────────────

/// Alarm row from `GET /api/alarms/recent[/{id}]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub id: Scalar,
    #[serde(default)]
    pub unit_id: Option<Scalar>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// `"diagnostic"`..`"critical"`, or the raw 0..=4 code.
    #[serde(default)]
    pub priority: Option<Scalar>,
    /// 0 (or absent) = created, 1 = cleared, 2 = acknowledged.
    #[serde(default)]
    pub eventtype: Option<i64>,
    /// Textual status, used when `eventtype` is absent or unknown.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "timeAgo")]
    pub time_ago: Option<String>,
}

// ── Envelopes ────────────────────────────────────────────────────────

/// Body of a successful acknowledge/clear POST.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Confirmation {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Confirmation {
    pub(crate) fn is_confirmed(&self) -> bool {
        self.success.unwrap_or(true) && self.ok.unwrap_or(true)
    }
}

/// Error body shape used by the backend (`{"error": "..."}`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
