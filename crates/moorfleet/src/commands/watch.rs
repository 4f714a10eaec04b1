//! Live view: keeps a fleet or unit view open until Ctrl-C.
//!
//! Every applied refresh cycle prints one line (or one JSON document), and
//! every notification the view raises goes to stderr as it arrives.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use moorfleet_core::aggregate::{self, FleetSummary};
use moorfleet_core::{
    Alarm, Dashboard, FleetBackend, KpiSnapshot, MooringState, UnitId, View, ViewKind,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, metric};

use super::kpis::summary_line;
use super::util;

/// Critical alarms shown per frame.
const CRITICAL_ALARM_LIMIT: usize = 5;

// ── Frame ───────────────────────────────────────────────────────────

/// What one completed cycle looks like from the outside.
#[derive(Debug, Serialize)]
struct Frame {
    cycle: u64,
    refreshed_at: Option<DateTime<Utc>>,
    range: &'static str,
    summary: FleetSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<UnitFrame>,
    critical_alarms: Vec<Alarm>,
}

#[derive(Debug, Serialize)]
struct UnitFrame {
    id: UnitId,
    name: Option<String>,
    state: Option<String>,
    kpi: Option<KpiSnapshot>,
    most_active_state: Option<(MooringState, f64)>,
}

fn frame<B: FleetBackend>(view: &View<B>, cycle: u64) -> Frame {
    let store = view.store();
    let target = view.target();

    let alarms: Vec<Alarm> = store.alarms().snapshot().iter().map(|a| (**a).clone()).collect();

    let unit = match target.kind {
        ViewKind::Fleet => None,
        ViewKind::Unit(id) => {
            let current = store.unit(&id);
            Some(UnitFrame {
                name: current.as_ref().map(|u| u.name.clone()),
                state: current.as_ref().map(|u| u.state_description.clone()),
                kpi: store.kpis().first().map(|k| (**k).clone()),
                most_active_state: store.most_active_state(),
                id,
            })
        }
    };

    Frame {
        cycle,
        refreshed_at: store.last_refresh(),
        range: target.range.as_str(),
        summary: store.summary(),
        unit,
        critical_alarms: aggregate::critical_open_alarms(&alarms, CRITICAL_ALARM_LIMIT),
    }
}

fn frame_line(f: &Frame) -> String {
    let at = f
        .refreshed_at
        .map_or_else(|| "--:--:--".into(), |t| t.format("%H:%M:%S").to_string());
    let body = match f.unit {
        None => summary_line(&f.summary),
        Some(ref u) => {
            let kpi = u.kpi.as_ref();
            let active = u.most_active_state.map_or_else(
                || "no data".into(),
                |(state, minutes)| format!("{state} ({minutes:.1} min)"),
            );
            format!(
                "unit {} {}: {} | MTBF {} h, availability {} %, utilization {} % | most active: {active}",
                u.id,
                output::text(u.name.as_deref()),
                output::text(u.state.as_deref()),
                metric(kpi.and_then(|k| k.mtbf_hours)),
                metric(kpi.and_then(|k| k.availability_pct)),
                metric(kpi.and_then(|k| k.utilization_pct)),
            )
        }
    };
    format!(
        "{at} [{}] #{} {body} | critical open alarms: {}",
        f.range,
        f.cycle,
        f.critical_alarms.len()
    )
}

fn render_frame(format: &OutputFormat, f: &Frame) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table | OutputFormat::Plain => frame_line(f),
        OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(f)?,
        OutputFormat::Yaml => format!("---\n{}", serde_yaml::to_string(f)?),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let range = util::range(dashboard, global);
    let view = match args.unit {
        Some(id) => dashboard.open_unit_view(UnitId::from(id), range),
        None => dashboard.open_fleet_view(range),
    };
    let result = run(&view, global).await;
    view.close().await;
    result
}

async fn run<B: FleetBackend>(view: &View<B>, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut cycles = view.store().subscribe_cycles();
    let mut notifications = view.notifications();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                tracing::info!("interrupted, closing view");
                return Ok(());
            }
            changed = cycles.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let cycle = *cycles.borrow_and_update();
                let out = render_frame(&global.output, &frame(view, cycle))?;
                output::print_output(&out, global.quiet);
            }
            received = notifications.recv() => match received {
                Ok(n) => eprintln!("{}", output::format_notification(&n, color)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification stream lagged");
                }
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}
