// ── Wire → domain conversion ──
//
// Translates `moorfleet-api` records into canonical domain types. The
// backend is loose about types and spellings; all of that tolerance lives
// here so the rest of the crate only sees well-formed values.

use chrono::{DateTime, NaiveDateTime, Utc};
use moorfleet_api::models::{
    AlarmRecord, KpiHistoryRecord, KpiRecord, Scalar, StateHistoryRecord, UnitRecord,
};
use tracing::warn;

use crate::config::UnitIdMap;
use crate::model::{
    Alarm, AlarmId, AlarmPriority, AlarmStatus, KpiHistoryPoint, KpiSnapshot, MooringState,
    StateHistoryPoint, TimeRange, Unit, UnitId, UnitMetadata,
};

// ── Timestamps ───────────────────────────────────────────────────────

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse any timestamp spelling the backend emits. Naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn timestamp_or(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(parse_timestamp).unwrap_or(fallback)
}

// ── Units ────────────────────────────────────────────────────────────

/// Derive a display id: explicit `unit_id`, else the trailing number of the
/// display name (`"Unit 3"` → `3`), else the name, else the list position.
fn unit_id_of(record: &UnitRecord, position: usize) -> UnitId {
    if let Some(id) = &record.unit_id {
        return UnitId::new(id.to_string());
    }
    if let Some(name) = record.unit.as_deref() {
        let digits: String = name
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if !digits.is_empty() {
            return UnitId::new(digits);
        }
        if !name.trim().is_empty() {
            return UnitId::new(name.trim());
        }
    }
    UnitId::new((position + 1).to_string())
}

pub fn unit_from_record(record: UnitRecord, position: usize, now: DateTime<Utc>) -> Unit {
    let id = unit_id_of(&record, position);
    let state = record
        .state_code
        .map_or(MooringState::Unknown(0), MooringState::from_code);
    let name = record
        .unit
        .clone()
        .unwrap_or_else(|| format!("Unit {id}"));
    let state_description = record
        .state
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.label().to_owned());

    Unit {
        last_updated: timestamp_or(record.last_updated.as_deref(), now),
        online: state.is_known(),
        metadata: UnitMetadata {
            serial_number: record.serial_number,
            asset_type: record.asset_type,
            installation_year: record.installation_year,
            commissioned_year: record.commissioned_year,
            sla_active: record.sla_active,
            site_name: record.site_name,
            end_user: record.end_user,
            country: record.country,
            warranty_status: record.warranty_status,
        },
        id,
        name,
        location: record.location,
        state,
        state_description,
    }
}

pub fn units_from_records(records: Vec<UnitRecord>, now: DateTime<Utc>) -> Vec<Unit> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| unit_from_record(r, i, now))
        .collect()
}

// ── KPIs ─────────────────────────────────────────────────────────────

pub fn kpi_from_record(
    record: KpiRecord,
    range: TimeRange,
    ids: &UnitIdMap,
    now: DateTime<Utc>,
) -> KpiSnapshot {
    KpiSnapshot {
        unit_id: record.unit.as_deref().map(|tag| ids.display_id(tag)),
        unit_tag: record.unit,
        range,
        mtbf_hours: record.mtbf.filter(|v| v.is_finite()),
        availability_pct: record.availability.filter(|v| v.is_finite()),
        utilization_pct: record.utilization.filter(|v| v.is_finite()),
        fetched_at: now,
    }
}

/// Convert a KPI trend series. Points with unreadable timestamps are
/// dropped; the result is sorted ascending.
pub fn kpi_history_from_records(records: Vec<KpiHistoryRecord>) -> Vec<KpiHistoryPoint> {
    let mut points: Vec<KpiHistoryPoint> = records
        .into_iter()
        .filter_map(|r| {
            let Some(timestamp) = parse_timestamp(&r.timestamp) else {
                warn!(timestamp = %r.timestamp, "dropping KPI history point with bad timestamp");
                return None;
            };
            Some(KpiHistoryPoint {
                timestamp,
                mtbf_hours: r.mtbf,
                availability_pct: r.uptime,
                utilization_pct: r.utilization,
                alarm_frequency: r.alarm_frequency,
            })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Convert a state-transition series, sorted ascending.
pub fn state_history_from_records(records: Vec<StateHistoryRecord>) -> Vec<StateHistoryPoint> {
    let mut points: Vec<StateHistoryPoint> = records
        .into_iter()
        .filter_map(|r| {
            let Some(timestamp) = parse_timestamp(&r.timestamp) else {
                warn!(timestamp = %r.timestamp, "dropping state history point with bad timestamp");
                return None;
            };
            Some(StateHistoryPoint {
                timestamp,
                state: MooringState::from_code(r.state),
                duration_minutes: if r.duration.is_finite() { r.duration.max(0.0) } else { 0.0 },
            })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

// ── Alarms ───────────────────────────────────────────────────────────

fn priority_of(raw: Option<&Scalar>) -> AlarmPriority {
    let parsed = match raw {
        Some(Scalar::Int(code)) => AlarmPriority::from_code(*code),
        Some(Scalar::Text(text)) => text
            .trim()
            .parse::<AlarmPriority>()
            .ok()
            .or_else(|| text.trim().parse().ok().and_then(AlarmPriority::from_code)),
        None => None,
    };
    parsed.unwrap_or(AlarmPriority::Diagnostic)
}

/// `eventtype` first, then the textual status, then created.
fn status_of(record: &AlarmRecord) -> AlarmStatus {
    match record.eventtype {
        Some(code) => AlarmStatus::from_eventtype(code).or_else(|| text_status(record)),
        None => text_status(record),
    }
    .unwrap_or(AlarmStatus::Created)
}

fn text_status(record: &AlarmRecord) -> Option<AlarmStatus> {
    record.status.as_deref().and_then(|s| s.trim().parse().ok())
}

/// Convert an alarm row. `unit_hint` fills in the owning unit when the
/// row came from a per-unit route and omits it.
pub fn alarm_from_record(
    record: AlarmRecord,
    unit_hint: Option<&UnitId>,
    now: DateTime<Utc>,
) -> Alarm {
    let status = status_of(&record);
    let unit_id = record
        .unit_id
        .as_ref()
        .map(|id| UnitId::new(id.to_string()))
        .or_else(|| unit_hint.cloned());
    let message = record
        .message
        .filter(|m| !m.trim().is_empty())
        .or(record.name.filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| "Unknown Alarm".to_owned());

    Alarm::new(
        AlarmId::new(record.id.to_string()),
        unit_id,
        priority_of(record.priority.as_ref()),
        message,
        timestamp_or(record.timestamp.as_deref(), now),
        status,
    )
}

pub fn alarms_from_records(
    records: Vec<AlarmRecord>,
    unit_hint: Option<&UnitId>,
    now: DateTime<Utc>,
) -> Vec<Alarm> {
    records
        .into_iter()
        .map(|r| alarm_from_record(r, unit_hint, now))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 5, 12, 0, 0).unwrap()
    }

    fn alarm(value: serde_json::Value) -> Alarm {
        alarm_from_record(serde_json::from_value(value).unwrap(), None, now())
    }

    #[test]
    fn timestamp_spellings() {
        let expected = Utc.with_ymd_and_hms(2025, 8, 5, 10, 30, 0).unwrap();
        for raw in [
            "2025-08-05T10:30:00Z",
            "2025-08-05T12:30:00+02:00",
            "Tue, 05 Aug 2025 10:30:00 GMT",
            "2025-08-05T10:30:00",
            "2025-08-05 10:30:00",
            "2025-08-05T10:30:00.000",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn unit_fields_and_fallbacks() {
        let record: UnitRecord = serde_json::from_value(json!({
            "unit": "Unit 3",
            "state_code": 6,
            "state": "Moored",
            "last_updated": "Tue, 05 Aug 2025 11:00:00 GMT",
            "serial_number": "MF-0003"
        }))
        .unwrap();
        let unit = unit_from_record(record, 0, now());
        assert_eq!(unit.id, UnitId::from("3"));
        assert_eq!(unit.state, MooringState::Moored);
        assert!(unit.online);
        assert_eq!(unit.metadata.serial_number.as_deref(), Some("MF-0003"));
        assert_eq!(unit.metadata.country, None);
        assert_eq!(unit.last_updated, Utc.with_ymd_and_hms(2025, 8, 5, 11, 0, 0).unwrap());
    }

    #[test]
    fn unknown_state_is_offline() {
        let record: UnitRecord =
            serde_json::from_value(json!({"unit_id": 7, "state_code": 42, "last_updated": "?"}))
                .unwrap();
        let unit = unit_from_record(record, 0, now());
        assert_eq!(unit.id, UnitId::from("7"));
        assert_eq!(unit.state, MooringState::Unknown(42));
        assert!(!unit.online);
        assert_eq!(unit.state_description, "Unknown");
        assert_eq!(unit.last_updated, now());
    }

    #[test]
    fn unit_without_identity_uses_position() {
        let unit = unit_from_record(UnitRecord::default(), 4, now());
        assert_eq!(unit.id, UnitId::from("5"));
        assert_eq!(unit.name, "Unit 5");
    }

    #[test]
    fn eventtype_wins_over_text_status() {
        assert_eq!(alarm(json!({"id": 1})).status(), AlarmStatus::Created);
        assert_eq!(alarm(json!({"id": 1, "eventtype": 1})).status(), AlarmStatus::Cleared);
        let acked = alarm(json!({"id": 1, "eventtype": 2, "status": "created"}));
        assert_eq!(acked.status(), AlarmStatus::Acknowledged);
        assert!(acked.acknowledged());
    }

    #[test]
    fn unknown_eventtype_falls_back_to_text_then_created() {
        let a = alarm(json!({"id": 1, "eventtype": 9, "status": "Acknowledged"}));
        assert_eq!(a.status(), AlarmStatus::Acknowledged);
        let b = alarm(json!({"id": 1, "eventtype": 9}));
        assert_eq!(b.status(), AlarmStatus::Created);
        let c = alarm(json!({"id": 1, "status": "cleared"}));
        assert_eq!(c.status(), AlarmStatus::Cleared);
    }

    #[test]
    fn priority_and_message_fallbacks() {
        let a = alarm(json!({"id": "a1", "priority": "High", "name": "Hook jammed"}));
        assert_eq!(a.priority, AlarmPriority::High);
        assert_eq!(a.alarm_type, crate::model::AlarmType::Critical);
        assert_eq!(a.message, "Hook jammed");

        let b = alarm(json!({"id": 2, "priority": 2}));
        assert_eq!(b.priority, AlarmPriority::Medium);
        assert_eq!(b.message, "Unknown Alarm");

        let c = alarm(json!({"id": 3, "priority": "urgent"}));
        assert_eq!(c.priority, AlarmPriority::Diagnostic);
        assert_eq!(c.timestamp, now());
    }

    #[test]
    fn unit_hint_fills_missing_owner() {
        let record: AlarmRecord = serde_json::from_value(json!({"id": 5})).unwrap();
        let a = alarm_from_record(record, Some(&UnitId::from("2")), now());
        assert_eq!(a.unit_id, Some(UnitId::from("2")));
    }

    #[test]
    fn history_drops_bad_points_and_sorts() {
        let records: Vec<StateHistoryRecord> = serde_json::from_value(json!([
            {"timestamp": "2025-08-05 11:00:00", "state": 6, "duration": 30.0},
            {"timestamp": "not a time", "state": 2, "duration": 10.0},
            {"timestamp": "2025-08-05 09:00:00", "state_code": 2, "duration": 120.0}
        ]))
        .unwrap();
        let points = state_history_from_records(records);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].state, MooringState::Idle);
        assert_eq!(points[1].state, MooringState::Moored);
    }

    #[test]
    fn kpi_maps_backend_tag_to_display_id() {
        let ids: UnitIdMap = [("1", "U1")].into_iter().collect();
        let record: KpiRecord =
            serde_json::from_value(json!({"unit": "U1", "mtbf": 12.5, "availability": 98.0}))
                .unwrap();
        let kpi = kpi_from_record(record, TimeRange::SevenDays, &ids, now());
        assert_eq!(kpi.unit_id, Some(UnitId::from("1")));
        assert_eq!(kpi.unit_tag.as_deref(), Some("U1"));
        assert_eq!(kpi.mtbf_hours, Some(12.5));
        assert_eq!(kpi.utilization_pct, None);
    }
}
