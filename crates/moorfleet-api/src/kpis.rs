// KPI endpoints
//
// Fleet-wide and per-unit KPI snapshots plus the per-unit trend series.
// `range` is always a canonical backend token (`1D`, `7D`, `30D`, `1Y`).

use tracing::debug;

use crate::client::FleetClient;
use crate::error::Error;
use crate::models::{KpiHistoryRecord, KpiRecord};

impl FleetClient {
    /// KPI snapshot for every unit.
    ///
    /// `GET /api/kpis?range={range}`
    pub async fn list_kpis(&self, range: &str) -> Result<Vec<KpiRecord>, Error> {
        let url = self.api_url_with_range("kpis", range)?;
        debug!(range, "listing fleet KPIs");
        self.get(url).await
    }

    /// KPI snapshot for a single unit.
    ///
    /// `GET /api/kpis/{id}/{range}`
    pub async fn get_kpi(&self, unit_id: &str, range: &str) -> Result<KpiRecord, Error> {
        let url = self.api_url(&format!("kpis/{unit_id}/{range}"))?;
        debug!(unit_id, range, "fetching unit KPI");
        self.get(url).await
    }

    /// KPI trend series for a unit, ascending by timestamp.
    ///
    /// `GET /api/kpis/{id}/history?range={range}`
    pub async fn get_kpi_history(
        &self,
        unit_id: &str,
        range: &str,
    ) -> Result<Vec<KpiHistoryRecord>, Error> {
        let url = self.api_url_with_range(&format!("kpis/{unit_id}/history"), range)?;
        debug!(unit_id, range, "fetching KPI history");
        self.get(url).await
    }
}
