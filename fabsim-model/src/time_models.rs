//! Time model records.
//!
//! The four kinds are distinguished structurally: a function model carries
//! `distribution_function`, a distance model carries `speed`, a schedule
//! carries `timestamps`, and a sample model carries `samples`.

use serde::{Deserialize, Serialize};

/// Distribution function names accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionFunctionData {
    Constant,
    Normal,
    Lognormal,
    Exponential,
}

/// Distance metric names accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricData {
    Manhattan,
    Euclidean,
}

fn default_batch_size() -> u32 {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeModelData {
    /// Draws from a parameterized distribution.
    Function {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        distribution_function: DistributionFunctionData,
        location: f64,
        #[serde(default)]
        scale: f64,
        #[serde(default = "default_batch_size")]
        batch_size: u32,
    },
    /// Travel time from distance, speed and reaction time.
    Distance {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        speed: f64,
        #[serde(default)]
        reaction_time: f64,
        #[serde(default = "MetricData::default")]
        metric: MetricData,
    },
    /// Follows a schedule of deltas or absolute timestamps.
    Schedule {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        timestamps: Vec<f64>,
        #[serde(default)]
        absolute: bool,
        #[serde(default)]
        cyclic: bool,
    },
    /// Replays a fixed sample list.
    Sample {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        samples: Vec<f64>,
        #[serde(default)]
        randomized: bool,
    },
}

impl Default for MetricData {
    fn default() -> Self {
        MetricData::Manhattan
    }
}

impl TimeModelData {
    pub fn id(&self) -> &str {
        match self {
            TimeModelData::Function { id, .. }
            | TimeModelData::Distance { id, .. }
            | TimeModelData::Schedule { id, .. }
            | TimeModelData::Sample { id, .. } => id,
        }
    }
}
