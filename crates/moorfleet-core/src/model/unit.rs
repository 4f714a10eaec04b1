// ── Mooring unit domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display identifier of a unit (what operators type and see).
///
/// The backend may know the same unit under a different tag; see
/// [`UnitIdMap`](crate::config::UnitIdMap).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Operational state of a mooring unit.
///
/// Codes 1..=11 are defined by the unit controller; anything else is
/// carried as `Unknown` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MooringState {
    Initialise,
    Idle,
    Arming,
    ReadyToMoor,
    Mooring,
    Moored,
    Detaching,
    Stepping,
    Warping,
    Parking,
    Parked,
    Unknown(i64),
}

impl MooringState {
    /// The defined states, in code order.
    pub const ALL: [Self; 11] = [
        Self::Initialise,
        Self::Idle,
        Self::Arming,
        Self::ReadyToMoor,
        Self::Mooring,
        Self::Moored,
        Self::Detaching,
        Self::Stepping,
        Self::Warping,
        Self::Parking,
        Self::Parked,
    ];

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Initialise,
            2 => Self::Idle,
            3 => Self::Arming,
            4 => Self::ReadyToMoor,
            5 => Self::Mooring,
            6 => Self::Moored,
            7 => Self::Detaching,
            8 => Self::Stepping,
            9 => Self::Warping,
            10 => Self::Parking,
            11 => Self::Parked,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Initialise => 1,
            Self::Idle => 2,
            Self::Arming => 3,
            Self::ReadyToMoor => 4,
            Self::Mooring => 5,
            Self::Moored => 6,
            Self::Detaching => 7,
            Self::Stepping => 8,
            Self::Warping => 9,
            Self::Parking => 10,
            Self::Parked => 11,
            Self::Unknown(code) => code,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Initialise => "Initialise",
            Self::Idle => "Idle",
            Self::Arming => "Arming",
            Self::ReadyToMoor => "Ready to Moor",
            Self::Mooring => "Mooring",
            Self::Moored => "Moored",
            Self::Detaching => "Detaching",
            Self::Stepping => "Stepping",
            Self::Warping => "Warping",
            Self::Parking => "Parking",
            Self::Parked => "Parked",
            Self::Unknown(_) => "Unknown",
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Enumeration-order key: defined states by code, unknown codes after.
    pub(crate) fn order_key(self) -> (bool, i64) {
        (!self.is_known(), self.code())
    }
}

impl fmt::Display for MooringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Static descriptive metadata. Absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub serial_number: Option<String>,
    pub asset_type: Option<String>,
    pub installation_year: Option<i32>,
    pub commissioned_year: Option<i32>,
    pub sla_active: Option<bool>,
    pub site_name: Option<String>,
    pub end_user: Option<String>,
    pub country: Option<String>,
    pub warranty_status: Option<String>,
}

/// A mooring unit as last reported by the backend. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub location: Option<String>,
    pub state: MooringState,
    /// Backend-provided state text; falls back to the state label.
    pub state_description: String,
    /// True iff the unit reports one of the defined states.
    pub online: bool,
    pub last_updated: DateTime<Utc>,
    pub metadata: UnitMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_defined_states() {
        for (idx, state) in MooringState::ALL.iter().enumerate() {
            let code = i64::try_from(idx).unwrap_or_default() + 1;
            assert_eq!(state.code(), code);
            assert_eq!(MooringState::from_code(code), *state);
        }
    }

    #[test]
    fn out_of_range_codes_are_unknown() {
        assert_eq!(MooringState::from_code(0), MooringState::Unknown(0));
        assert_eq!(MooringState::from_code(12).label(), "Unknown");
        assert!(!MooringState::from_code(-1).is_known());
    }

    #[test]
    fn unknown_sorts_after_defined() {
        assert!(MooringState::Parked.order_key() < MooringState::Unknown(0).order_key());
        assert!(MooringState::Initialise.order_key() < MooringState::Idle.order_key());
    }
}
