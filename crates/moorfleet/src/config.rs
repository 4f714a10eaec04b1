//! CLI configuration: a thin wrapper around `moorfleet_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--backend, --range, etc.).

use moorfleet_core::FleetConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use moorfleet_config::{Config, Profile, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `FleetConfig` from the config file, active profile, and flags.
///
/// Flags take priority over profile values. With no matching profile a
/// `--backend` alone is enough; an explicitly named profile must exist.
pub fn resolve_fleet_config(global: &GlobalOpts) -> Result<FleetConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.backend.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);

    let mut fleet =
        moorfleet_config::profile_to_fleet_config(&profile, &profile_name, &cfg.defaults)?;
    if let Some(range) = global.range {
        fleet.default_range = range;
    }
    Ok(fleet)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref backend) = global.backend {
        profile.backend.clone_from(backend);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
