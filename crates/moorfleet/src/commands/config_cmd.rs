//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const RANGE_CHOICES: [&str; 4] = ["1day", "7days", "1month", "1year"];

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// TOML rendering for `config show` in table mode.
fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# could not render config: {e}"))
}

/// Ask for one profile interactively.
fn prompt_profile() -> Result<(String, Profile), CliError> {
    let name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let backend: String = Input::new()
        .with_prompt("Backend URL")
        .default("http://127.0.0.1:5000".into())
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let insecure = Confirm::new()
        .with_prompt("Accept self-signed TLS certificates?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let range_idx = Select::new()
        .with_prompt("Default time range")
        .items(&RANGE_CHOICES)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let profile = Profile {
        backend,
        insecure: insecure.then_some(true),
        default_range: RANGE_CHOICES.get(range_idx).map(|r| (*r).to_owned()),
        ..Profile::default()
    };
    Ok((name, profile))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            if !std::io::stdin().is_terminal() {
                return Err(CliError::Validation {
                    field: "interactive".into(),
                    reason: "config init needs a terminal".into(),
                });
            }

            let config_path = config::config_path();
            eprintln!("MoorFleet configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config()?;
            let (name, profile) = prompt_profile()?;

            if cfg.profiles.contains_key(&name)
                && !Confirm::new()
                    .with_prompt(format!("Profile '{name}' exists. Overwrite?"))
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?
            {
                return Ok(());
            }

            let has_default = cfg
                .default_profile
                .as_ref()
                .is_some_and(|d| cfg.profiles.contains_key(d));
            if !has_default {
                cfg.default_profile = Some(name.clone());
            }
            cfg.profiles.insert(name.clone(), profile);

            let path = config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("   Saved profile '{name}' to {}", path.display());
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                config::active_profile_name(global, c)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
