//! Queue, node, and resource records.

use serde::{Deserialize, Serialize};

/// A bounded product buffer. Capacity 0 means unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capacity: i64,
    /// Physical position; only meaningful for auxiliary storages.
    #[serde(default)]
    pub location: Option<[f64; 2]>,
}

/// A named location in the layout, usable as a link-transport endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub location: [f64; 2],
}

/// Controller flavor of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerKind {
    PipelineController,
    TransportController,
}

/// Sequencing policy of a resource's controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ControlPolicyKind {
    FIFO,
    LIFO,
    SPT,
    SPT_transport,
}

fn default_capacity() -> i64 {
    1
}

/// An actor that executes processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_capacity")]
    pub capacity: i64,
    pub location: [f64; 2],
    #[serde(default)]
    pub input_location: Option<[f64; 2]>,
    #[serde(default)]
    pub output_location: Option<[f64; 2]>,
    pub controller: ControllerKind,
    pub control_policy: ControlPolicyKind,
    pub process_ids: Vec<String>,
    /// Per-process concurrency limits, parallel to `process_ids`. Missing or
    /// zero entries fall back to the resource capacity.
    #[serde(default)]
    pub process_capacities: Option<Vec<i64>>,
    #[serde(default)]
    pub state_ids: Vec<String>,
    #[serde(default)]
    pub input_queues: Option<Vec<String>>,
    #[serde(default)]
    pub output_queues: Option<Vec<String>>,
}

impl ResourceData {
    /// Effective concurrency limit for the process at `index`.
    pub fn process_capacity(&self, index: usize) -> i64 {
        match &self.process_capacities {
            Some(caps) => match caps.get(index) {
                Some(&c) if c > 0 => c,
                _ => self.capacity,
            },
            None => self.capacity,
        }
    }
}
