//! Clap derive structures for the `moorfleet` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use moorfleet_core::TimeRange;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// moorfleet -- fleet telemetry for mooring units
#[derive(Debug, Parser)]
#[command(
    name = "moorfleet",
    version,
    about = "Query and watch a mooring fleet from the command line",
    long_about = "Reads unit state, KPIs, and alarms of a mooring fleet from a MoorFleet backend.\n\n\
        One-shot commands print a single snapshot; `watch` keeps a live view\n\
        refreshing on the same cadence as the dashboard.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "MOORFLEET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "MOORFLEET_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Time range: 1day, 7days, 1month, 1year
    #[arg(long, short = 'r', value_name = "RANGE", global = true)]
    pub range: Option<TimeRange>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MOORFLEET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "MOORFLEET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MOORFLEET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect mooring units
    #[command(alias = "u")]
    Units(UnitsArgs),

    /// Show KPI snapshots and history
    #[command(alias = "k")]
    Kpis(KpisArgs),

    /// List, acknowledge, and clear alarms
    #[command(alias = "a")]
    Alarms(AlarmsArgs),

    /// Keep a live view open, printing every refresh
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Units ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UnitsArgs {
    #[command(subcommand)]
    pub command: UnitsCommand,
}

#[derive(Debug, Subcommand)]
pub enum UnitsCommand {
    /// List all units with their current state
    #[command(alias = "ls")]
    List,

    /// Show one unit in detail
    Get {
        /// Unit id as shown by `units list`
        id: String,
    },

    /// Show the state history of a unit within the range
    History {
        /// Unit id
        id: String,
    },
}

// ── KPIs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct KpisArgs {
    #[command(subcommand)]
    pub command: Option<KpisCommand>,

    /// Only show this unit
    #[arg(long, short = 'u')]
    pub unit: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum KpisCommand {
    /// Show the KPI history of a unit within the range
    History {
        /// Unit id
        id: String,

        /// Aggregate into the range's display buckets
        #[arg(long)]
        buckets: bool,
    },
}

// ── Alarms ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlarmsArgs {
    #[command(subcommand)]
    pub command: AlarmsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlarmsCommand {
    /// List the most recent alarms
    #[command(alias = "ls")]
    List {
        /// Only alarms raised by this unit
        #[arg(long, short = 'u')]
        unit: Option<String>,

        /// Hide cleared alarms
        #[arg(long)]
        open: bool,
    },

    /// Acknowledge an alarm
    Ack {
        /// Alarm id
        id: String,
    },

    /// Clear an acknowledged alarm
    Clear {
        /// Alarm id
        id: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Watch a single unit instead of the whole fleet
    #[arg(long, short = 'u')]
    pub unit: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
