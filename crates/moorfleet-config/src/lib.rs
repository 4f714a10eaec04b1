//! Shared configuration for MoorFleet Insights tools.
//!
//! TOML profiles overlaid with `MOORFLEET_*` environment variables, and
//! translation to `moorfleet_core::FleetConfig`. The CLI adds flag-aware
//! wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use moorfleet_core::{FleetConfig, TimeRange, TlsVerification, UnitId, UnitIdMap};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "MOORFLEET_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile to use: `name` if given, else the default profile.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Range views open with, e.g. `"1day"`.
    #[serde(default = "default_range")]
    pub range: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            range: default_range(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_range() -> String {
    TimeRange::OneDay.as_str().into()
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://10.0.0.5:5000").
    pub backend: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Fleet overview refresh period (seconds).
    pub fleet_refresh_secs: Option<u64>,

    /// Unit detail refresh period (seconds).
    pub unit_refresh_secs: Option<u64>,

    /// Override the default range.
    pub default_range: Option<String>,

    /// Display unit id → backend unit id (e.g. `"1" = "U1"`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unit_ids: BTreeMap<String, String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$MOORFLEET_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("io", "moorfleet", "moorfleet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("moorfleet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, overlaid with the environment.
///
/// Nested keys use a double underscore: `MOORFLEET_DEFAULTS__RANGE=7days`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MOORFLEET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse a range selector, reporting which setting it came from.
pub fn parse_range(field: &str, value: &str) -> Result<TimeRange, ConfigError> {
    value.parse().map_err(|e: moorfleet_core::InvalidRange| ConfigError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}

fn refresh_period(field: &str, secs: Option<u64>, fallback: Duration) -> Result<Duration, ConfigError> {
    match secs {
        None => Ok(fallback),
        Some(0) => Err(ConfigError::Validation {
            field: field.into(),
            reason: "refresh period must be at least 1 second".into(),
        }),
        Some(n) => Ok(Duration::from_secs(n)),
    }
}

/// Build a `FleetConfig` from a profile and the global defaults. No CLI
/// flag overrides.
pub fn profile_to_fleet_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<FleetConfig, ConfigError> {
    let url: url::Url = profile
        .backend
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: format!("profiles.{profile_name}.backend"),
            reason: format!("invalid URL: {}", profile.backend),
        })?;

    let mut config = FleetConfig::new(url);

    config.tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.fleet_refresh_interval = refresh_period(
        "fleet_refresh_secs",
        profile.fleet_refresh_secs,
        config.fleet_refresh_interval,
    )?;
    config.unit_refresh_interval = refresh_period(
        "unit_refresh_secs",
        profile.unit_refresh_secs,
        config.unit_refresh_interval,
    )?;
    config.default_range = match profile.default_range {
        Some(ref range) => parse_range(&format!("profiles.{profile_name}.default_range"), range)?,
        None => parse_range("defaults.range", &defaults.range)?,
    };
    config.unit_ids = profile
        .unit_ids
        .iter()
        .map(|(display, backend)| (UnitId::from(display.as_str()), backend.clone()))
        .collect::<UnitIdMap>();

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "harbour"

[defaults]
output = "json"
range = "7days"

[profiles.harbour]
backend = "http://10.0.0.5:5000"
timeout = 10
unit_refresh_secs = 5

[profiles.harbour.unit_ids]
"1" = "U1"
"2" = "U2"

[profiles.lab]
backend = "https://lab.example:8443"
insecure = true
default_range = "1year"
"#;

    fn load(text: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, text).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let config = load(SAMPLE);
        assert_eq!(config.default_profile.as_deref(), Some("harbour"));
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.color, "auto");
        assert_eq!(config.profiles.len(), 2);
        let (name, profile) = config.profile(None).unwrap();
        assert_eq!(name, "harbour");
        assert_eq!(profile.unit_ids.get("1").map(String::as_str), Some("U1"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = load(SAMPLE);
        assert!(matches!(
            config.profile(Some("offshore")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_translates_to_fleet_config() {
        let config = load(SAMPLE);
        let (name, profile) = config.profile(None).unwrap();
        let fleet = profile_to_fleet_config(profile, name, &config.defaults).unwrap();
        assert_eq!(fleet.base_url.as_str(), "http://10.0.0.5:5000/");
        assert_eq!(fleet.tls, TlsVerification::SystemDefaults);
        assert_eq!(fleet.timeout, Duration::from_secs(10));
        assert_eq!(fleet.unit_refresh_interval, Duration::from_secs(5));
        assert_eq!(fleet.fleet_refresh_interval, Duration::from_secs(30));
        assert_eq!(fleet.default_range, TimeRange::SevenDays);
        assert_eq!(fleet.unit_ids.backend_id(&UnitId::from("2")), "U2");
    }

    #[test]
    fn profile_range_and_tls_overrides() {
        let config = load(SAMPLE);
        let (name, profile) = config.profile(Some("lab")).unwrap();
        let fleet = profile_to_fleet_config(profile, name, &config.defaults).unwrap();
        assert_eq!(fleet.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(fleet.default_range, TimeRange::OneYear);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let defaults = Defaults::default();
        let bad_url = Profile {
            backend: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_fleet_config(&bad_url, "x", &defaults),
            Err(ConfigError::Validation { .. })
        ));

        let bad_range = Profile {
            backend: "http://localhost:5000".into(),
            default_range: Some("30D".into()),
            ..Profile::default()
        };
        let err = profile_to_fleet_config(&bad_range, "x", &defaults).unwrap_err();
        assert!(err.to_string().contains("profiles.x.default_range"), "{err}");

        let zero = Profile {
            backend: "http://localhost:5000".into(),
            fleet_refresh_secs: Some(0),
            ..Profile::default()
        };
        assert!(profile_to_fleet_config(&zero, "x", &defaults).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                backend: "http://127.0.0.1:5000".into(),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }
}
