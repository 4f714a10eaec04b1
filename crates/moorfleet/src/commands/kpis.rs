//! KPI command handlers.

use chrono::Utc;
use tabled::Tabled;

use moorfleet_core::aggregate::{self, Bucket, FleetSummary};
use moorfleet_core::{Dashboard, KpiHistoryPoint, KpiSnapshot, UnitId};

use crate::cli::{GlobalOpts, KpisArgs, KpisCommand, OutputFormat};
use crate::error::CliError;
use crate::output::{self, metric};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct KpiRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "MTBF (h)")]
    mtbf: String,
    #[tabled(rename = "Availability %")]
    availability: String,
    #[tabled(rename = "Utilization %")]
    utilization: String,
}

impl From<&KpiSnapshot> for KpiRow {
    fn from(k: &KpiSnapshot) -> Self {
        Self {
            unit: unit_label(k),
            range: k.range.as_str().into(),
            mtbf: metric(k.mtbf_hours),
            availability: metric(k.availability_pct),
            utilization: metric(k.utilization_pct),
        }
    }
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "MTBF (h)")]
    mtbf: String,
    #[tabled(rename = "Availability %")]
    availability: String,
    #[tabled(rename = "Utilization %")]
    utilization: String,
    #[tabled(rename = "Alarms/h")]
    alarm_frequency: String,
}

impl From<&KpiHistoryPoint> for HistoryRow {
    fn from(p: &KpiHistoryPoint) -> Self {
        Self {
            time: p.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            mtbf: metric(p.mtbf_hours),
            availability: metric(p.availability_pct),
            utilization: metric(p.utilization_pct),
            alarm_frequency: metric(p.alarm_frequency),
        }
    }
}

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "Bucket")]
    label: String,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "MTBF (h)")]
    mtbf: String,
    #[tabled(rename = "Availability %")]
    availability: String,
    #[tabled(rename = "Utilization %")]
    utilization: String,
    #[tabled(rename = "Alarms/h")]
    alarm_frequency: String,
}

impl From<&Bucket> for BucketRow {
    fn from(b: &Bucket) -> Self {
        Self {
            label: b.label.clone(),
            samples: b.samples,
            mtbf: metric(b.mtbf_hours),
            availability: metric(b.availability_pct),
            utilization: metric(b.utilization_pct),
            alarm_frequency: metric(b.alarm_frequency),
        }
    }
}

fn unit_label(k: &KpiSnapshot) -> String {
    k.unit_id
        .as_ref()
        .map(ToString::to_string)
        .or_else(|| k.unit_tag.clone())
        .unwrap_or_else(|| "-".into())
}

pub(crate) fn summary_line(s: &FleetSummary) -> String {
    format!(
        "{} units, {} online, {} moored | MTBF {} h, availability {} %, utilization {} %",
        s.units,
        s.online,
        s.moored,
        metric(s.avg_mtbf_hours),
        metric(s.avg_availability_pct),
        metric(s.avg_utilization_pct),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: KpisArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let range = util::range(dashboard, global);

    match args.command {
        None => match args.unit {
            Some(id) => {
                let kpi = dashboard.unit_kpi(&UnitId::from(id.as_str()), range).await?;
                let out = output::render_list(
                    &global.output,
                    std::slice::from_ref(&kpi),
                    |k| KpiRow::from(k),
                    unit_label,
                )?;
                output::print_output(&out, global.quiet);
                Ok(())
            }
            None if matches!(global.output, OutputFormat::Table) => {
                let (units, kpis) = tokio::join!(dashboard.units(), dashboard.fleet_kpis(range));
                let (units, kpis) = (units?, kpis?);
                let mut out =
                    output::render_list(&global.output, &kpis, |k| KpiRow::from(k), unit_label)?;
                out.push('\n');
                out.push_str(&summary_line(&FleetSummary::compute(&units, &kpis)));
                output::print_output(&out, global.quiet);
                Ok(())
            }
            None => {
                let kpis = dashboard.fleet_kpis(range).await?;
                let out =
                    output::render_list(&global.output, &kpis, |k| KpiRow::from(k), unit_label)?;
                output::print_output(&out, global.quiet);
                Ok(())
            }
        },

        Some(KpisCommand::History { id, buckets }) => {
            let points = dashboard
                .kpi_history(&UnitId::from(id.as_str()), range)
                .await?;

            let out = if buckets {
                let series = aggregate::bucket_series(&points, range, Utc::now());
                output::render_list(
                    &global.output,
                    &series,
                    |b| BucketRow::from(b),
                    |b| b.label.clone(),
                )?
            } else {
                output::render_list(
                    &global.output,
                    &points,
                    |p| HistoryRow::from(p),
                    |p| p.timestamp.to_rfc3339(),
                )?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
