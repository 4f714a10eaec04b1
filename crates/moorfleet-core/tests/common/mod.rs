// In-memory backend for view and alarm tests.
//
// Every endpoint serves a JSON fixture, can be made to fail, and can be
// slowed down on tokio's (paused) clock. All calls are recorded.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use moorfleet_api::Error as ApiError;
use moorfleet_api::models::{
    AlarmRecord, KpiHistoryRecord, KpiRecord, StateHistoryRecord, UnitRecord,
};
use moorfleet_core::{FleetBackend, FleetConfig};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Default)]
struct State {
    fixtures: Mutex<HashMap<&'static str, Value>>,
    failing: Mutex<HashSet<&'static str>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    calls: Mutex<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<State>,
}

impl FakeBackend {
    /// A two-unit fleet with KPIs, one open alarm per unit and history.
    pub fn fleet() -> Self {
        let fake = Self::default();
        let now = Utc::now();
        let ago = |d: TimeDelta| (now - d).format("%Y-%m-%d %H:%M:%S").to_string();
        fake.set("units", json!([
            {"unit_id": 1, "unit": "Unit 1", "state_code": 6, "state": "Moored"},
            {"unit_id": 2, "unit": "Unit 2", "state_code": 2, "state": "Idle"}
        ]));
        fake.set("unit", json!({"unit": "Unit 1", "state_code": 6, "state": "Moored"}));
        fake.set("kpis", json!([
            {"unit": "U1", "mtbf": 120.0, "availability": 99.0, "utilization": 60.0},
            {"unit": "U2", "mtbf": 80.0, "availability": 95.0, "utilization": 40.0}
        ]));
        fake.set("kpi", json!({"unit": "U1", "mtbf": 120.0, "availability": 99.0, "utilization": 60.0}));
        fake.set("kpi_history", json!([
            {"timestamp": ago(TimeDelta::days(3)), "uptime": 90.0},
            {"timestamp": ago(TimeDelta::hours(5)), "uptime": 97.0},
            {"timestamp": ago(TimeDelta::hours(1)), "uptime": 99.0}
        ]));
        fake.set("state_history", json!([
            {"timestamp": ago(TimeDelta::days(10)), "state": 2, "duration": 900.0},
            {"timestamp": ago(TimeDelta::hours(6)), "state": 6, "duration": 40.0},
            {"timestamp": ago(TimeDelta::hours(4)), "state": 2, "duration": 25.0},
            {"timestamp": ago(TimeDelta::hours(2)), "state": 6, "duration": 10.0}
        ]));
        fake.set("alarms", json!([
            {"id": 1, "unit_id": 1, "name": "Winch overload", "priority": "high", "eventtype": 0,
             "timestamp": ago(TimeDelta::minutes(5))},
            {"id": 2, "unit_id": 2, "name": "Vacuum low", "priority": "medium", "eventtype": 0,
             "timestamp": ago(TimeDelta::minutes(9))}
        ]));
        fake
    }

    pub fn config() -> FleetConfig {
        FleetConfig::new("http://fleet.invalid:5000".parse().unwrap())
    }

    pub fn set(&self, part: &'static str, value: Value) {
        self.state.fixtures.lock().unwrap().insert(part, value);
    }

    pub fn fail(&self, part: &'static str) {
        self.state.failing.lock().unwrap().insert(part);
    }

    pub fn recover(&self, part: &'static str) {
        self.state.failing.lock().unwrap().remove(part);
    }

    pub fn delay(&self, part: &'static str, by: Duration) {
        self.state.delays.lock().unwrap().insert(part, by);
    }

    pub fn undelay(&self, part: &'static str) {
        self.state.delays.lock().unwrap().remove(part);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn respond<T: DeserializeOwned + Send>(
        &self,
        part: &'static str,
        call: String,
    ) -> impl Future<Output = ApiResult<T>> + Send + use<T> {
        self.state.calls.lock().unwrap().push(call);
        let delay = self.state.delays.lock().unwrap().get(part).copied();
        let result = if self.state.failing.lock().unwrap().contains(part) {
            Err(match part {
                "ack" | "clear" => ApiError::Rejected {
                    message: "alarm state changed".into(),
                },
                _ => ApiError::Http {
                    status: 500,
                    message: "internal error".into(),
                },
            })
        } else {
            let value = self
                .state
                .fixtures
                .lock()
                .unwrap()
                .get(part)
                .cloned()
                .unwrap_or(Value::Null);
            Ok(serde_json::from_value(value).unwrap())
        };
        async move {
            if let Some(by) = delay {
                tokio::time::sleep(by).await;
            }
            result
        }
    }
}

impl FleetBackend for FakeBackend {
    fn list_units(&self) -> impl Future<Output = ApiResult<Vec<UnitRecord>>> + Send {
        self.respond("units", "units".into())
    }

    fn get_unit(&self, unit: &str) -> impl Future<Output = ApiResult<UnitRecord>> + Send {
        self.respond("unit", format!("unit:{unit}"))
    }

    fn get_unit_history(
        &self,
        unit: &str,
    ) -> impl Future<Output = ApiResult<Vec<StateHistoryRecord>>> + Send {
        self.respond("state_history", format!("state_history:{unit}"))
    }

    fn list_kpis(&self, range: &str) -> impl Future<Output = ApiResult<Vec<KpiRecord>>> + Send {
        self.respond("kpis", format!("kpis:{range}"))
    }

    fn get_kpi(
        &self,
        unit: &str,
        range: &str,
    ) -> impl Future<Output = ApiResult<KpiRecord>> + Send {
        self.respond("kpi", format!("kpi:{unit}:{range}"))
    }

    fn get_kpi_history(
        &self,
        unit: &str,
        range: &str,
    ) -> impl Future<Output = ApiResult<Vec<KpiHistoryRecord>>> + Send {
        self.respond("kpi_history", format!("kpi_history:{unit}:{range}"))
    }

    fn recent_alarms(
        &self,
        unit: Option<&str>,
    ) -> impl Future<Output = ApiResult<Vec<AlarmRecord>>> + Send {
        self.respond("alarms", format!("alarms:{}", unit.unwrap_or("*")))
    }

    fn acknowledge_alarm(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send {
        self.respond("ack", format!("ack:{id}"))
    }

    fn clear_alarm(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send {
        self.respond("clear", format!("clear:{id}"))
    }
}
