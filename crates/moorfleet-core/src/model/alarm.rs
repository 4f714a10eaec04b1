// ── Alarm domain types ──
//
// Alarms move forward through created → acknowledged → cleared and never
// back. The `acknowledged` flag is derived from the status so the two
// cannot disagree.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::unit::UnitId;

/// Backend alarm identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmId(String);

impl AlarmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlarmId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Coarse severity used for badges: critical / warning / info.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlarmType {
    Critical,
    Warning,
    Info,
}

/// Five-level priority, independent of [`AlarmType`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlarmPriority {
    Diagnostic,
    Low,
    Medium,
    High,
    Critical,
}

impl AlarmPriority {
    /// Map the backend's numeric priority (0 = diagnostic .. 4 = critical).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Diagnostic),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            4 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Badge severity for this priority.
    pub fn alarm_type(self) -> AlarmType {
        match self {
            Self::High | Self::Critical => AlarmType::Critical,
            Self::Medium => AlarmType::Warning,
            Self::Low | Self::Diagnostic => AlarmType::Info,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlarmStatus {
    Created,
    Acknowledged,
    Cleared,
}

impl AlarmStatus {
    /// Map the backend `eventtype` code: 0 = created, 1 = cleared,
    /// 2 = acknowledged.
    pub fn from_eventtype(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Created),
            1 => Some(Self::Cleared),
            2 => Some(Self::Acknowledged),
            _ => None,
        }
    }
}

/// A user-initiated lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlarmAction {
    Acknowledge,
    Clear,
}

impl AlarmAction {
    /// The only status this action may start from.
    pub fn from_status(self) -> AlarmStatus {
        match self {
            Self::Acknowledge => AlarmStatus::Created,
            Self::Clear => AlarmStatus::Acknowledged,
        }
    }

    pub fn target(self) -> AlarmStatus {
        match self {
            Self::Acknowledge => AlarmStatus::Acknowledged,
            Self::Clear => AlarmStatus::Cleared,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AlarmFields")]
pub struct Alarm {
    pub id: AlarmId,
    pub unit_id: Option<UnitId>,
    pub alarm_type: AlarmType,
    pub priority: AlarmPriority,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    status: AlarmStatus,
    acknowledged: bool,
}

/// What deserialization reads. Type and the `acknowledged` flag are
/// derived, so they are never taken from input.
#[derive(Deserialize)]
struct AlarmFields {
    id: AlarmId,
    #[serde(default)]
    unit_id: Option<UnitId>,
    priority: AlarmPriority,
    message: String,
    timestamp: DateTime<Utc>,
    status: AlarmStatus,
}

impl From<AlarmFields> for Alarm {
    fn from(f: AlarmFields) -> Self {
        Self::new(f.id, f.unit_id, f.priority, f.message, f.timestamp, f.status)
    }
}

impl Alarm {
    pub fn new(
        id: AlarmId,
        unit_id: Option<UnitId>,
        priority: AlarmPriority,
        message: String,
        timestamp: DateTime<Utc>,
        status: AlarmStatus,
    ) -> Self {
        Self {
            id,
            unit_id,
            alarm_type: priority.alarm_type(),
            priority,
            message,
            timestamp,
            status,
            acknowledged: status != AlarmStatus::Created,
        }
    }

    pub fn status(&self) -> AlarmStatus {
        self.status
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn is_open(&self) -> bool {
        self.status != AlarmStatus::Cleared
    }

    /// Whether `action` is legal from the current status.
    pub fn permits(&self, action: AlarmAction) -> bool {
        self.status == action.from_status()
    }

    /// Move forward to `target`. Returns `false` (and changes nothing)
    /// when the alarm is already at or past it.
    pub fn advance_to(&mut self, target: AlarmStatus) -> bool {
        if target <= self.status {
            return false;
        }
        self.status = target;
        self.acknowledged = true;
        true
    }
}
