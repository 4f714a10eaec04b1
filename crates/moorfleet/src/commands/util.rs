//! Shared helpers for command handlers.

use std::io::IsTerminal;

use moorfleet_core::{Dashboard, TimeRange};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Range for this invocation: `--range`, else the profile's default.
pub fn range(dashboard: &Dashboard, global: &GlobalOpts) -> TimeRange {
    global.range.unwrap_or(dashboard.config().default_range)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the operation is refused.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
