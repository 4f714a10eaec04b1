// ── Domain model ──
//
// Canonical types consumed by views and the CLI. Wire records from
// `moorfleet-api` are translated into these in `crate::convert`.

pub mod alarm;
pub mod history;
pub mod kpi;
pub mod time_range;
pub mod unit;

use chrono::{DateTime, Utc};

pub use alarm::{Alarm, AlarmAction, AlarmId, AlarmPriority, AlarmStatus, AlarmType};
pub use history::StateHistoryPoint;
pub use kpi::{KpiHistoryPoint, KpiSnapshot};
pub use time_range::{InvalidRange, LabelFormat, TimeRange};
pub use unit::{MooringState, Unit, UnitId, UnitMetadata};

/// A record positioned on the time axis, filterable by range.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}
