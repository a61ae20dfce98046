//! KPI post-processing for simulation event logs.
//!
//! The event log is the only input: throughput, WIP, throughput time, and
//! per-resource time-in-state shares are all reconstructed from the recorded
//! transitions, never from engine internals. The raw log can also be
//! exported as CSV or JSON.

pub mod error;
pub mod export;
pub mod kpi;
pub mod post_processing;
pub mod resource_states;

pub use error::MetricsError;
pub use export::{write_csv, write_json};
pub use kpi::{ResourceStateKpi, SimulationResults, ThroughputKpi, ThroughputTimeKpi, WipSummary};
pub use post_processing::PostProcessor;
