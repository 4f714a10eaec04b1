//! Async client for the MoorFleet Insights backend.
//!
//! Thin, typed wrapper over the dashboard's REST contract: units, KPI
//! snapshots and history, recent alarms, and the alarm lifecycle POSTs.
//! Responses are returned as wire records ([`models`]); `moorfleet-core`
//! turns them into domain types.

pub mod alarms;
pub mod client;
pub mod error;
pub mod kpis;
pub mod models;
pub mod transport;
pub mod units;

pub use client::FleetClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
