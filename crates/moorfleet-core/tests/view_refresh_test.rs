// Refresh scheduler tests on tokio's paused clock.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use common::FakeBackend;
use moorfleet_core::{
    Dashboard, MooringState, NotificationLevel, TimeRange, UnitId, UnitIdMap, View,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

fn dashboard(fake: &FakeBackend) -> Dashboard<FakeBackend> {
    Dashboard::with_backend(FakeBackend::config(), fake.clone())
}

async fn cycles(view: &View<FakeBackend>, at_least: u64) {
    let mut rx = view.store().subscribe_cycles();
    rx.wait_for(|n| *n >= at_least).await.unwrap();
}

/// Let spawned tasks run without moving the clock.
async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

fn unit_ids(view: &View<FakeBackend>) -> Vec<String> {
    view.store().units().iter().map(|u| u.id.to_string()).collect()
}

// ── Cadence ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn fleet_view_loads_on_open_then_every_thirty_seconds() {
    let fake = FakeBackend::fleet();
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);

    cycles(&view, 1).await;
    assert_eq!(fake.count("units"), 1);
    assert_eq!(fake.count("kpis:1D"), 1);
    assert_eq!(fake.count("alarms:*"), 1);
    assert_eq!(unit_ids(&view), vec!["1", "2"]);
    assert_eq!(view.store().kpis().len(), 2);
    assert!(view.store().last_refresh().is_some());

    tokio::time::advance(Duration::from_secs(29)).await;
    settle().await;
    assert_eq!(fake.count("units"), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    cycles(&view, 2).await;
    assert_eq!(fake.count("units"), 2);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn unit_view_refreshes_every_fifteen_seconds() {
    let fake = FakeBackend::fleet();
    let view = dashboard(&fake).open_unit_view(UnitId::from("1"), TimeRange::OneDay);

    cycles(&view, 1).await;
    tokio::time::advance(Duration::from_secs(15)).await;
    cycles(&view, 2).await;
    assert_eq!(fake.count("unit:1"), 2);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn fleet_alarms_are_capped() {
    let fake = FakeBackend::fleet();
    let rows: Vec<_> = (1..=15)
        .map(|i| json!({"id": i, "priority": "low", "eventtype": 0}))
        .collect();
    fake.set("alarms", json!(rows));
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);

    cycles(&view, 1).await;
    assert_eq!(view.store().alarms().len(), 10);

    view.close().await;
}

// ── Teardown ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn no_fetch_after_close() {
    let fake = FakeBackend::fleet();
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    cycles(&view, 1).await;

    view.close().await;
    let before = fake.calls().len();

    tokio::time::advance(Duration::from_secs(300)).await;
    settle().await;
    assert_eq!(fake.calls().len(), before);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_view_stops_the_timer() {
    let fake = FakeBackend::fleet();
    let view = dashboard(&fake).open_unit_view(UnitId::from("1"), TimeRange::SevenDays);
    cycles(&view, 1).await;

    drop(view);
    settle().await;
    let before = fake.calls().len();

    tokio::time::advance(Duration::from_secs(300)).await;
    settle().await;
    assert_eq!(fake.calls().len(), before);
}

#[tokio::test(start_paused = true)]
async fn close_cancels_a_slow_cycle() {
    let fake = FakeBackend::fleet();
    fake.delay("units", Duration::from_secs(3600));
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    view.store()
        .alarms()
        .subscribe()
        .wait_for(|alarms| !alarms.is_empty())
        .await
        .unwrap();
    assert_eq!(fake.count("units"), 1);

    let store = std::sync::Arc::clone(view.store());
    view.close().await;
    assert_eq!(store.completed_cycles(), 0);
    assert!(store.units().is_empty());
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_alarms_fetch_keeps_data_and_notifies_once() {
    let fake = FakeBackend::fleet();
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    cycles(&view, 1).await;
    let mut notes = view.notifications();

    fake.fail("alarms");
    view.refresh_now();
    cycles(&view, 2).await;

    assert_eq!(unit_ids(&view), vec!["1", "2"]);
    assert_eq!(view.store().kpis().len(), 2);
    assert_eq!(view.store().alarms().len(), 2);

    let note = notes.try_recv().unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.contains("alarms"), "{}", note.message);
    assert!(matches!(notes.try_recv(), Err(TryRecvError::Empty)));

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn several_failed_parts_share_one_notification() {
    let fake = FakeBackend::fleet();
    fake.fail("kpis");
    fake.fail("alarms");
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    let mut notes = view.notifications();

    cycles(&view, 1).await;
    let note = notes.try_recv().unwrap();
    assert!(note.message.starts_with("Could not load KPIs, alarms"), "{}", note.message);
    assert!(matches!(notes.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(view.store().units().len(), 2);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn loop_keeps_running_after_a_failed_cycle() {
    let fake = FakeBackend::fleet();
    for part in ["units", "kpis", "alarms"] {
        fake.fail(part);
    }
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    cycles(&view, 1).await;
    assert!(view.store().units().is_empty());

    for part in ["units", "kpis", "alarms"] {
        fake.recover(part);
    }
    tokio::time::advance(Duration::from_secs(30)).await;
    cycles(&view, 2).await;
    assert_eq!(view.store().units().len(), 2);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn failures_are_reported_when_a_slow_part_keeps_cycles_from_finishing() {
    let fake = FakeBackend::fleet();
    fake.delay("kpi_history", Duration::from_secs(25));
    fake.fail("alarms");
    let view = dashboard(&fake).open_unit_view(UnitId::from("1"), TimeRange::OneDay);
    let mut notes = view.notifications();

    // Each 15 s tick supersedes the cycle still waiting on KPI history.
    for _ in 0..3 {
        let note = notes.recv().await.unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert!(note.message.contains("alarms"), "{}", note.message);
        assert!(!note.message.contains("KPI history"), "{}", note.message);
    }
    assert_eq!(view.store().completed_cycles(), 0);
    assert!(fake.count("alarms:1") >= 3);
    assert_eq!(view.store().units().len(), 1);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn loop_survives_a_panicking_cycle() {
    let fake = FakeBackend::fleet();
    // Not a list: the fake panics while decoding it.
    fake.set("units", json!("not a list"));
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    settle().await;
    assert_eq!(fake.count("units"), 1);

    fake.set("units", json!([{"unit_id": 3, "unit": "Unit 3", "state_code": 2}]));
    tokio::time::advance(Duration::from_secs(30)).await;
    cycles(&view, 1).await;
    assert_eq!(unit_ids(&view), vec!["3"]);

    view.close().await;
}

// ── Triggers ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn range_change_runs_now_and_restarts_interval() {
    let fake = FakeBackend::fleet();
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    cycles(&view, 1).await;

    tokio::time::advance(Duration::from_secs(10)).await;
    view.set_range(TimeRange::SevenDays);
    cycles(&view, 2).await;
    assert_eq!(fake.count("kpis:7D"), 1);
    assert_eq!(view.target().range, TimeRange::SevenDays);

    // Re-selecting the same range is not a change.
    view.set_range(TimeRange::SevenDays);
    settle().await;
    assert_eq!(view.store().completed_cycles(), 2);

    // The old schedule would fire at t=30s; the restarted one at t=40s.
    tokio::time::advance(Duration::from_secs(25)).await;
    settle().await;
    assert_eq!(view.store().completed_cycles(), 2);
    tokio::time::advance(Duration::from_secs(5)).await;
    cycles(&view, 3).await;
    assert_eq!(fake.count("kpis:7D"), 2);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn superseded_cycle_is_never_applied() {
    let fake = FakeBackend::fleet();
    fake.delay("units", Duration::from_secs(10));
    let view = dashboard(&fake).open_fleet_view(TimeRange::OneDay);
    view.store()
        .alarms()
        .subscribe()
        .wait_for(|alarms| !alarms.is_empty())
        .await
        .unwrap();

    fake.undelay("units");
    fake.set("units", json!([{"unit_id": 9, "unit": "Unit 9", "state_code": 1}]));
    view.refresh_now();
    cycles(&view, 1).await;

    tokio::time::advance(Duration::from_secs(15)).await;
    settle().await;
    assert_eq!(unit_ids(&view), vec!["9"]);
    assert_eq!(view.store().completed_cycles(), 1);
    assert_eq!(fake.count("units"), 2);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn set_unit_points_the_view_elsewhere() {
    let fake = FakeBackend::fleet();
    let view = dashboard(&fake).open_unit_view(UnitId::from("1"), TimeRange::OneDay);
    cycles(&view, 1).await;

    view.set_unit(UnitId::from("2"));
    cycles(&view, 2).await;
    assert_eq!(fake.count("unit:2"), 1);
    assert!(view.store().unit(&UnitId::from("2")).is_some());

    view.close().await;
}

// ── Unit view contents ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn unit_view_maps_ids_and_filters_history() {
    let fake = FakeBackend::fleet();
    let mut config = FakeBackend::config();
    config.unit_ids = [("1", "U1")].into_iter().collect::<UnitIdMap>();
    let view = Dashboard::with_backend(config, fake.clone())
        .open_unit_view(UnitId::from("1"), TimeRange::OneDay);
    cycles(&view, 1).await;

    let calls = fake.calls();
    for expected in ["unit:U1", "kpi:U1:1D", "kpi_history:U1:1D", "state_history:U1", "alarms:U1"] {
        assert!(calls.iter().any(|c| c == expected), "missing {expected} in {calls:?}");
    }

    let store = view.store();
    let unit = store.unit(&UnitId::from("1")).unwrap();
    assert_eq!(unit.state, MooringState::Moored);
    assert_eq!(store.kpis()[0].unit_id, Some(UnitId::from("1")));
    assert_eq!(store.kpi_history().unwrap().len(), 2);
    assert_eq!(store.state_history().unwrap().len(), 3);
    assert_eq!(store.most_active_state(), Some((MooringState::Moored, 50.0)));

    view.close().await;
}
