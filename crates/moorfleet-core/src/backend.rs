// ── Backend seam ──
//
// Everything the core needs from the backend, as a trait. `FleetClient`
// is the production implementation; tests substitute an in-memory fake.

use std::future::Future;

use moorfleet_api::FleetClient;
use moorfleet_api::models::{
    AlarmRecord, KpiHistoryRecord, KpiRecord, StateHistoryRecord, UnitRecord,
};

type ApiResult<T> = Result<T, moorfleet_api::Error>;

/// Source of wire records for views and one-shot queries.
///
/// `unit` arguments are backend ids (already mapped through
/// [`UnitIdMap`](crate::config::UnitIdMap)); `range` is a backend token.
pub trait FleetBackend: Send + Sync + 'static {
    fn list_units(&self) -> impl Future<Output = ApiResult<Vec<UnitRecord>>> + Send;

    fn get_unit(&self, unit: &str) -> impl Future<Output = ApiResult<UnitRecord>> + Send;

    fn get_unit_history(
        &self,
        unit: &str,
    ) -> impl Future<Output = ApiResult<Vec<StateHistoryRecord>>> + Send;

    fn list_kpis(&self, range: &str) -> impl Future<Output = ApiResult<Vec<KpiRecord>>> + Send;

    fn get_kpi(&self, unit: &str, range: &str)
    -> impl Future<Output = ApiResult<KpiRecord>> + Send;

    fn get_kpi_history(
        &self,
        unit: &str,
        range: &str,
    ) -> impl Future<Output = ApiResult<Vec<KpiHistoryRecord>>> + Send;

    fn recent_alarms(
        &self,
        unit: Option<&str>,
    ) -> impl Future<Output = ApiResult<Vec<AlarmRecord>>> + Send;

    fn acknowledge_alarm(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send;

    fn clear_alarm(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send;
}

impl FleetBackend for FleetClient {
    fn list_units(&self) -> impl Future<Output = ApiResult<Vec<UnitRecord>>> + Send {
        FleetClient::list_units(self)
    }

    fn get_unit(&self, unit: &str) -> impl Future<Output = ApiResult<UnitRecord>> + Send {
        FleetClient::get_unit(self, unit)
    }

    fn get_unit_history(
        &self,
        unit: &str,
    ) -> impl Future<Output = ApiResult<Vec<StateHistoryRecord>>> + Send {
        FleetClient::get_unit_history(self, unit)
    }

    fn list_kpis(&self, range: &str) -> impl Future<Output = ApiResult<Vec<KpiRecord>>> + Send {
        FleetClient::list_kpis(self, range)
    }

    fn get_kpi(
        &self,
        unit: &str,
        range: &str,
    ) -> impl Future<Output = ApiResult<KpiRecord>> + Send {
        FleetClient::get_kpi(self, unit, range)
    }

    fn get_kpi_history(
        &self,
        unit: &str,
        range: &str,
    ) -> impl Future<Output = ApiResult<Vec<KpiHistoryRecord>>> + Send {
        FleetClient::get_kpi_history(self, unit, range)
    }

    fn recent_alarms(
        &self,
        unit: Option<&str>,
    ) -> impl Future<Output = ApiResult<Vec<AlarmRecord>>> + Send {
        FleetClient::recent_alarms(self, unit)
    }

    fn acknowledge_alarm(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send {
        FleetClient::acknowledge_alarm(self, id)
    }

    fn clear_alarm(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send {
        FleetClient::clear_alarm(self, id)
    }
}
