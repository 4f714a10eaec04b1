// ── Fetch + convert ──
//
// One function per backend read: call, translate to domain types, apply
// the id mapping and range filter. Shared by one-shot queries and by the
// sub-fetches of a refresh cycle.

use chrono::Utc;
use tracing::debug;

use crate::aggregate::filter_since;
use crate::backend::FleetBackend;
use crate::config::FleetConfig;
use crate::convert;
use crate::error::CoreError;
use crate::model::{
    Alarm, KpiHistoryPoint, KpiSnapshot, StateHistoryPoint, TimeRange, Unit, UnitId,
};

pub(crate) async fn units<B: FleetBackend>(backend: &B) -> Result<Vec<Unit>, CoreError> {
    let records = backend.list_units().await?;
    let units = convert::units_from_records(records, Utc::now());
    debug!(count = units.len(), "fetched units");
    Ok(units)
}

pub(crate) async fn unit<B: FleetBackend>(
    backend: &B,
    config: &FleetConfig,
    id: &UnitId,
) -> Result<Unit, CoreError> {
    let record = backend.get_unit(&config.unit_ids.backend_id(id)).await?;
    let mut unit = convert::unit_from_record(record, 0, Utc::now());
    unit.id = id.clone();
    Ok(unit)
}

pub(crate) async fn fleet_kpis<B: FleetBackend>(
    backend: &B,
    config: &FleetConfig,
    range: TimeRange,
) -> Result<Vec<KpiSnapshot>, CoreError> {
    let records = backend.list_kpis(range.backend_token()).await?;
    let now = Utc::now();
    let kpis: Vec<KpiSnapshot> = records
        .into_iter()
        .map(|r| convert::kpi_from_record(r, range, &config.unit_ids, now))
        .collect();
    debug!(count = kpis.len(), %range, "fetched fleet KPIs");
    Ok(kpis)
}

pub(crate) async fn unit_kpi<B: FleetBackend>(
    backend: &B,
    config: &FleetConfig,
    id: &UnitId,
    range: TimeRange,
) -> Result<KpiSnapshot, CoreError> {
    let record = backend
        .get_kpi(&config.unit_ids.backend_id(id), range.backend_token())
        .await?;
    let mut kpi = convert::kpi_from_record(record, range, &config.unit_ids, Utc::now());
    kpi.unit_id.get_or_insert_with(|| id.clone());
    Ok(kpi)
}

/// KPI trend for `range`, restricted to the window ending now.
pub(crate) async fn kpi_history<B: FleetBackend>(
    backend: &B,
    config: &FleetConfig,
    id: &UnitId,
    range: TimeRange,
) -> Result<Vec<KpiHistoryPoint>, CoreError> {
    let records = backend
        .get_kpi_history(&config.unit_ids.backend_id(id), range.backend_token())
        .await?;
    let points = convert::kpi_history_from_records(records);
    let kept = filter_since(&points, range, Utc::now());
    debug!(%id, %range, fetched = points.len(), kept = kept.len(), "fetched KPI history");
    Ok(kept)
}

/// State transitions within `range`. The backend route has no range
/// parameter, so the window is applied here.
pub(crate) async fn state_history<B: FleetBackend>(
    backend: &B,
    config: &FleetConfig,
    id: &UnitId,
    range: TimeRange,
) -> Result<Vec<StateHistoryPoint>, CoreError> {
    let records = backend
        .get_unit_history(&config.unit_ids.backend_id(id))
        .await?;
    let points = convert::state_history_from_records(records);
    let kept = filter_since(&points, range, Utc::now());
    debug!(%id, %range, fetched = points.len(), kept = kept.len(), "fetched state history");
    Ok(kept)
}

pub(crate) async fn recent_alarms<B: FleetBackend>(
    backend: &B,
    config: &FleetConfig,
    unit: Option<&UnitId>,
) -> Result<Vec<Alarm>, CoreError> {
    let backend_id = unit.map(|id| config.unit_ids.backend_id(id));
    let records = backend.recent_alarms(backend_id.as_deref()).await?;
    let alarms = convert::alarms_from_records(records, unit, Utc::now());
    debug!(count = alarms.len(), ?unit, "fetched recent alarms");
    Ok(alarms)
}
