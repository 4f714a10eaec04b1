//! Command dispatch: bridges CLI args -> dashboard queries -> output formatting.

pub mod alarms;
pub mod config_cmd;
pub mod kpis;
pub mod units;
pub mod util;
pub mod watch;

use moorfleet_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Units(args) => units::handle(dashboard, args, global).await,
        Command::Kpis(args) => kpis::handle(dashboard, args, global).await,
        Command::Alarms(args) => alarms::handle(dashboard, args, global).await,
        Command::Watch(args) => watch::handle(dashboard, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
