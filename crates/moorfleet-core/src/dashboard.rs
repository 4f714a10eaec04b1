// ── Dashboard entry point ──
//
// Owns the backend handle and the runtime configuration. Hands out live
// views and answers one-shot queries (used by the CLI).

use std::sync::Arc;

use moorfleet_api::FleetClient;
use tracing::debug;

use crate::alarm_gate::AlarmGate;
use crate::backend::FleetBackend;
use crate::config::FleetConfig;
use crate::error::CoreError;
use crate::fetch;
use crate::model::{
    Alarm, AlarmId, KpiHistoryPoint, KpiSnapshot, StateHistoryPoint, TimeRange, Unit, UnitId,
};
use crate::notify::Notifier;
use crate::store::AlarmBook;
use crate::view::{View, ViewKind, ViewTarget};

/// Cheaply cloneable handle to one backend.
pub struct Dashboard<B: FleetBackend = FleetClient> {
    inner: Arc<DashboardInner<B>>,
}

struct DashboardInner<B: FleetBackend> {
    config: Arc<FleetConfig>,
    backend: Arc<B>,
}

impl<B: FleetBackend> Clone for Dashboard<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Dashboard<FleetClient> {
    /// Build the HTTP client for `config`. No request is made yet.
    pub fn connect(config: FleetConfig) -> Result<Self, CoreError> {
        let client = FleetClient::new(config.base_url.clone(), &config.transport())?;
        debug!(url = %config.base_url, "backend client ready");
        Ok(Self::with_backend(config, client))
    }
}

impl<B: FleetBackend> Dashboard<B> {
    pub fn with_backend(config: FleetConfig, backend: B) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                config: Arc::new(config),
                backend: Arc::new(backend),
            }),
        }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.inner.config
    }

    // ── Live views ───────────────────────────────────────────────────

    /// Open the fleet overview: units, fleet KPIs and recent alarms,
    /// refreshed every `fleet_refresh_interval`.
    pub fn open_fleet_view(&self, range: TimeRange) -> View<B> {
        self.open(ViewTarget {
            kind: ViewKind::Fleet,
            range,
        })
    }

    /// Open a unit detail view: the unit, its KPIs, KPI and state history
    /// and alarms, refreshed every `unit_refresh_interval`.
    pub fn open_unit_view(&self, unit: UnitId, range: TimeRange) -> View<B> {
        self.open(ViewTarget {
            kind: ViewKind::Unit(unit),
            range,
        })
    }

    fn open(&self, target: ViewTarget) -> View<B> {
        View::open(
            Arc::clone(&self.inner.backend),
            Arc::clone(&self.inner.config),
            target,
        )
    }

    // ── One-shot queries ─────────────────────────────────────────────

    pub async fn units(&self) -> Result<Vec<Unit>, CoreError> {
        fetch::units(&*self.inner.backend).await
    }

    pub async fn unit(&self, id: &UnitId) -> Result<Unit, CoreError> {
        fetch::unit(&*self.inner.backend, &self.inner.config, id).await
    }

    pub async fn fleet_kpis(&self, range: TimeRange) -> Result<Vec<KpiSnapshot>, CoreError> {
        fetch::fleet_kpis(&*self.inner.backend, &self.inner.config, range).await
    }

    pub async fn unit_kpi(&self, id: &UnitId, range: TimeRange) -> Result<KpiSnapshot, CoreError> {
        fetch::unit_kpi(&*self.inner.backend, &self.inner.config, id, range).await
    }

    pub async fn kpi_history(
        &self,
        id: &UnitId,
        range: TimeRange,
    ) -> Result<Vec<KpiHistoryPoint>, CoreError> {
        fetch::kpi_history(&*self.inner.backend, &self.inner.config, id, range).await
    }

    pub async fn state_history(
        &self,
        id: &UnitId,
        range: TimeRange,
    ) -> Result<Vec<StateHistoryPoint>, CoreError> {
        fetch::state_history(&*self.inner.backend, &self.inner.config, id, range).await
    }

    pub async fn recent_alarms(&self, unit: Option<&UnitId>) -> Result<Vec<Alarm>, CoreError> {
        fetch::recent_alarms(&*self.inner.backend, &self.inner.config, unit).await
    }

    // ── Alarm actions ────────────────────────────────────────────────

    /// Acknowledge an alarm from the fleet's recent list.
    ///
    /// The current status is looked up first so the lifecycle rules apply;
    /// an alarm the backend no longer lists as recent is `NotFound`.
    pub async fn acknowledge_alarm(&self, id: &AlarmId) -> Result<Arc<Alarm>, CoreError> {
        let book = self.recent_book().await?;
        self.gate().acknowledge(&book, id).await
    }

    /// Clear an acknowledged alarm. Same lookup rules as
    /// [`acknowledge_alarm`](Self::acknowledge_alarm).
    pub async fn clear_alarm(&self, id: &AlarmId) -> Result<Arc<Alarm>, CoreError> {
        let book = self.recent_book().await?;
        self.gate().clear(&book, id).await
    }

    async fn recent_book(&self) -> Result<AlarmBook, CoreError> {
        Ok(AlarmBook::from_alarms(self.recent_alarms(None).await?))
    }

    fn gate(&self) -> AlarmGate<B> {
        AlarmGate::new(Arc::clone(&self.inner.backend), Notifier::new())
    }
}
