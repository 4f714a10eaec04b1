//! Domain layer for MoorFleet Insights.
//!
//! Sits between the raw HTTP client (`moorfleet-api`) and consumers
//! (the CLI, or any UI). It provides:
//!
//! - **[`Dashboard`]**: entry point holding the backend handle and
//!   configuration; answers one-shot queries and opens live views.
//! - **[`View`]**: one open screen (fleet overview or unit detail) with
//!   its own [`ViewStore`] and a background refresh loop. Cycles run
//!   immediately, on a fixed interval, and whenever the range or unit
//!   changes; a new cycle cancels the one still in flight.
//! - **[`AlarmGate`]**: acknowledge/clear with forward-only status and
//!   backend confirmation before any local change.
//! - **[`aggregate`]**: range filtering, means, state totals and chart
//!   buckets over history series.
//! - **[`model`]**: canonical domain types, including [`TimeRange`] and
//!   its backend token and bucket mapping.
//! - **[`FleetBackend`]**: the seam over the HTTP client, so tests can
//!   run views against an in-memory backend.

pub mod aggregate;
pub mod alarm_gate;
pub mod backend;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
mod fetch;
pub mod model;
pub mod notify;
pub mod store;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{Bucket, FleetSummary};
pub use alarm_gate::AlarmGate;
pub use backend::FleetBackend;
pub use config::{FleetConfig, TlsVerification, UnitIdMap};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use store::{AlarmBook, ViewStore};
pub use view::{View, ViewKind, ViewTarget};

// ── Model re-exports ────────────────────────────────────────────────
pub use model::{
    Alarm, AlarmAction, AlarmId, AlarmPriority, AlarmStatus, AlarmType, InvalidRange,
    KpiHistoryPoint, KpiSnapshot, LabelFormat, MooringState, StateHistoryPoint, TimeRange,
    Timestamped, Unit, UnitId, UnitMetadata,
};
