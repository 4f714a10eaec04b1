//! Unit command handlers.

use chrono::Utc;
use tabled::Tabled;

use moorfleet_core::aggregate::{self, time_ago};
use moorfleet_core::{Dashboard, StateHistoryPoint, Unit, UnitId};

use crate::cli::{GlobalOpts, OutputFormat, UnitsArgs, UnitsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Unit> for UnitRow {
    fn from(u: &Unit) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            location: output::text(u.location.as_deref()),
            state: u.state_description.clone(),
            online: if u.online { "yes" } else { "no" }.into(),
            updated: time_ago(u.last_updated, Utc::now()),
        }
    }
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Entered")]
    entered: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Minutes")]
    minutes: String,
}

impl From<&StateHistoryPoint> for StateRow {
    fn from(p: &StateHistoryPoint) -> Self {
        Self {
            entered: p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            state: p.state.to_string(),
            minutes: format!("{:.1}", p.duration_minutes),
        }
    }
}

// ── Detail view ─────────────────────────────────────────────────────

fn detail(u: &Unit) -> String {
    let m = &u.metadata;
    let year = |y: Option<i32>| y.map_or_else(|| "-".into(), |y| y.to_string());
    let sla = match m.sla_active {
        Some(true) => "active",
        Some(false) => "inactive",
        None => "-",
    };

    [
        format!("ID:            {}", u.id),
        format!("Name:          {}", u.name),
        format!("Location:      {}", output::text(u.location.as_deref())),
        format!("State:         {} ({})", u.state_description, u.state),
        format!("Online:        {}", if u.online { "yes" } else { "no" }),
        format!(
            "Updated:       {} ({})",
            u.last_updated.format("%Y-%m-%d %H:%M:%S UTC"),
            time_ago(u.last_updated, Utc::now())
        ),
        format!("Serial:        {}", output::text(m.serial_number.as_deref())),
        format!("Asset type:    {}", output::text(m.asset_type.as_deref())),
        format!("Installed:     {}", year(m.installation_year)),
        format!("Commissioned:  {}", year(m.commissioned_year)),
        format!("SLA:           {sla}"),
        format!("Site:          {}", output::text(m.site_name.as_deref())),
        format!("End user:      {}", output::text(m.end_user.as_deref())),
        format!("Country:       {}", output::text(m.country.as_deref())),
        format!("Warranty:      {}", output::text(m.warranty_status.as_deref())),
    ]
    .join("\n")
}

/// Per-state totals printed under the history table.
fn distribution_footer(points: &[StateHistoryPoint]) -> String {
    let mut lines: Vec<String> = aggregate::state_distribution(points)
        .into_iter()
        .map(|(state, minutes)| format!("  {state:<18} {minutes:>8.1} min"))
        .collect();
    match aggregate::most_active_state(points) {
        Some((state, minutes)) => lines.push(format!("Most active: {state} ({minutes:.1} min)")),
        None => lines.push("Most active: no data".into()),
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: UnitsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UnitsCommand::List => {
            let units = dashboard.units().await?;
            let out = output::render_list(
                &global.output,
                &units,
                |u| UnitRow::from(u),
                |u| u.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UnitsCommand::Get { id } => {
            let unit = dashboard.unit(&UnitId::from(id.as_str())).await?;
            let out = output::render_single(&global.output, &unit, detail, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UnitsCommand::History { id } => {
            let range = util::range(dashboard, global);
            let points = dashboard
                .state_history(&UnitId::from(id.as_str()), range)
                .await?;
            let mut out = output::render_list(
                &global.output,
                &points,
                |p| StateRow::from(p),
                |p| p.state.to_string(),
            )?;
            if matches!(global.output, OutputFormat::Table) {
                out.push('\n');
                out.push_str(&distribution_footer(&points));
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
