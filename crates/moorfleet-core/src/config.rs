// ── Runtime connection configuration ──
//
// These types describe *how* to reach a MoorFleet backend and how often
// views refresh. They never touch disk: the CLI builds a `FleetConfig`
// from profiles and hands it in.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::model::{TimeRange, UnitId};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on a vessel LAN).
    DangerAcceptInvalid,
}

/// Display id ↔ backend tag mapping.
///
/// The dashboard shows units as `1`, `2`, ... while the KPI routes key them
/// as `U1`, `U2`, .... Unmapped ids pass through unchanged in both
/// directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitIdMap {
    to_backend: HashMap<UnitId, String>,
    to_display: HashMap<String, UnitId>,
}

impl UnitIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `display` ⇄ `backend`. Later entries win in both directions.
    pub fn insert(&mut self, display: UnitId, backend: impl Into<String>) {
        let backend = backend.into();
        if let Some(previous) = self.to_backend.insert(display.clone(), backend.clone()) {
            self.to_display.remove(&previous);
        }
        if let Some(previous) = self.to_display.insert(backend, display) {
            self.to_backend.remove(&previous);
        }
    }

    /// Backend tag for a display id.
    pub fn backend_id(&self, id: &UnitId) -> String {
        self.to_backend
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.as_str().to_owned())
    }

    /// Display id for a backend tag.
    pub fn display_id(&self, backend: &str) -> UnitId {
        self.to_display
            .get(backend)
            .cloned()
            .unwrap_or_else(|| UnitId::from(backend))
    }

    pub fn is_empty(&self) -> bool {
        self.to_backend.is_empty()
    }
}

impl<D: Into<UnitId>, B: Into<String>> FromIterator<(D, B)> for UnitIdMap {
    fn from_iter<I: IntoIterator<Item = (D, B)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (display, backend) in iter {
            map.insert(display.into(), backend);
        }
        map
    }
}

/// Configuration for talking to one backend.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Backend base URL (e.g., `http://10.0.0.5:5000`).
    pub base_url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Refresh period of the fleet overview.
    pub fleet_refresh_interval: Duration,
    /// Refresh period of a unit detail view.
    pub unit_refresh_interval: Duration,
    /// How many recent alarms the fleet overview shows.
    pub fleet_alarm_limit: usize,
    /// Range a view starts in when none is given.
    pub default_range: TimeRange,
    pub unit_ids: UnitIdMap,
}

impl FleetConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            fleet_refresh_interval: Duration::from_secs(30),
            unit_refresh_interval: Duration::from_secs(15),
            fleet_alarm_limit: 10,
            default_range: TimeRange::OneDay,
            unit_ids: UnitIdMap::new(),
        }
    }

    pub(crate) fn transport(&self) -> moorfleet_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => moorfleet_api::TlsMode::System,
            TlsVerification::CustomCa(path) => moorfleet_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => moorfleet_api::TlsMode::DangerAcceptInvalid,
        };
        moorfleet_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
