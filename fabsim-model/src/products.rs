//! Product, source, sink, and auxiliary records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product's required processes: either an ordered list or a precedence
/// graph mapping each process to its successors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessPlanData {
    Sequence(Vec<String>),
    Precedence(BTreeMap<String, Vec<String>>),
}

impl ProcessPlanData {
    /// All process ids referenced by the plan, deduplicated, in a
    /// deterministic order.
    pub fn process_ids(&self) -> Vec<&str> {
        match self {
            ProcessPlanData::Sequence(ids) => {
                let mut seen = Vec::new();
                for id in ids {
                    if !seen.contains(&id.as_str()) {
                        seen.push(id.as_str());
                    }
                }
                seen
            }
            ProcessPlanData::Precedence(adjacency) => {
                let mut seen: Vec<&str> = Vec::new();
                for (node, successors) in adjacency {
                    if !seen.contains(&node.as_str()) {
                        seen.push(node.as_str());
                    }
                    for succ in successors {
                        if !seen.contains(&succ.as_str()) {
                            seen.push(succ.as_str());
                        }
                    }
                }
                seen
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub product_type: String,
    pub processes: ProcessPlanData,
    pub transport_process: String,
}

/// System-wide routing policy names accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingHeuristicKind {
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "shortest_queue")]
    ShortestQueue,
    #[serde(rename = "FIFO")]
    Fifo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub location: [f64; 2],
    pub product_type: String,
    pub time_model_id: String,
    pub routing_heuristic: RoutingHeuristicKind,
    pub output_queues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub location: [f64; 2],
    pub product_type: String,
    pub input_queues: Vec<String>,
}

/// A typed tool with finite copies held in named storages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryData {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub storages: Vec<String>,
    pub quantity_in_storages: Vec<i64>,
}
