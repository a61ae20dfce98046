//! KPI result types.

use serde::Serialize;

/// Output counts per product type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputKpi {
    pub product_type: String,
    /// Products that reached their sink within the horizon.
    pub finished: u64,
    /// Finished per time unit.
    pub rate: f64,
}

/// Work-in-process statistics over the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WipSummary {
    /// Time-weighted average WIP across all product types.
    pub average: f64,
    pub maximum: u64,
    /// WIP at the horizon.
    pub at_end: u64,
    /// Time-weighted average per product type.
    pub per_type: Vec<(String, f64)>,
}

/// Throughput-time statistics per product type, in time units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputTimeKpi {
    pub product_type: String,
    pub count: u64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
}

/// Share of the horizon a resource spent per composite state, in percent.
///
/// PR = productive, SB = standby, ST = setup, UD = unscheduled down. The four
/// shares sum to 100 within numeric tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceStateKpi {
    pub resource: String,
    #[serde(rename = "PR")]
    pub productive: f64,
    #[serde(rename = "SB")]
    pub standby: f64,
    #[serde(rename = "ST")]
    pub setup: f64,
    #[serde(rename = "UD")]
    pub down: f64,
}

/// Aggregated KPIs of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResults {
    pub horizon: f64,
    pub throughput: Vec<ThroughputKpi>,
    pub wip: WipSummary,
    pub throughput_time: Vec<ThroughputTimeKpi>,
    pub resource_states: Vec<ResourceStateKpi>,
}
