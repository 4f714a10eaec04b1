// ── State history ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timestamped;
use super::unit::MooringState;

/// A state the unit entered at `timestamp` and held for `duration_minutes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateHistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub state: MooringState,
    pub duration_minutes: f64,
}

impl Timestamped for StateHistoryPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
