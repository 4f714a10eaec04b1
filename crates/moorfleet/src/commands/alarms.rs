//! Alarm command handlers.

use chrono::Utc;
use tabled::Tabled;

use moorfleet_core::aggregate::time_ago;
use moorfleet_core::{Alarm, AlarmId, Dashboard, UnitId};

use crate::cli::{AlarmsArgs, AlarmsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlarmRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    alarm_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Raised")]
    raised: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&Alarm> for AlarmRow {
    fn from(a: &Alarm) -> Self {
        Self {
            id: a.id.to_string(),
            unit: a
                .unit_id
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string),
            priority: a.priority.to_string(),
            alarm_type: a.alarm_type.to_string(),
            status: a.status().to_string(),
            raised: time_ago(a.timestamp, Utc::now()),
            message: a.message.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: AlarmsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlarmsCommand::List { unit, open } => {
            let unit = unit.map(UnitId::from);
            let mut alarms = dashboard.recent_alarms(unit.as_ref()).await?;
            if open {
                alarms.retain(Alarm::is_open);
            }
            let out = output::render_list(
                &global.output,
                &alarms,
                |a| AlarmRow::from(a),
                |a| a.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlarmsCommand::Ack { id } => {
            let alarm = dashboard.acknowledge_alarm(&AlarmId::from(id.as_str())).await?;
            if !global.quiet {
                eprintln!("Alarm {} is {}", alarm.id, alarm.status());
            }
            Ok(())
        }

        AlarmsCommand::Clear { id } => {
            if !util::confirm(&format!("Clear alarm {id}?"), "alarms clear", global.yes)? {
                return Ok(());
            }
            let alarm = dashboard.clear_alarm(&AlarmId::from(id.as_str())).await?;
            if !global.quiet {
                eprintln!("Alarm {} is {}", alarm.id, alarm.status());
            }
            Ok(())
        }
    }
}
