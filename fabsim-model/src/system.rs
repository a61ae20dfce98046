//! The top-level production system document.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::processes::ProcessData;
use crate::products::{AuxiliaryData, ProductData, SinkData, SourceData};
use crate::resources::{NodeData, QueueData, ResourceData};
use crate::states::StateData;
use crate::time_models::TimeModelData;
use fabsim_core::SimResult;

/// The complete declarative description of a production system.
///
/// This is the stable wire format: one array per entity collection, all
/// cross-referencing each other by `ID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSystemData {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub time_model_data: Vec<TimeModelData>,
    #[serde(default)]
    pub state_data: Vec<StateData>,
    #[serde(default)]
    pub process_data: Vec<ProcessData>,
    #[serde(default)]
    pub queue_data: Vec<QueueData>,
    #[serde(default)]
    pub node_data: Vec<NodeData>,
    #[serde(default)]
    pub resource_data: Vec<ResourceData>,
    #[serde(default)]
    pub product_data: Vec<ProductData>,
    #[serde(default)]
    pub sink_data: Vec<SinkData>,
    #[serde(default)]
    pub source_data: Vec<SourceData>,
    #[serde(default)]
    pub auxiliary_data: Vec<AuxiliaryData>,
    #[serde(default)]
    pub scenario_data: Option<serde_json::Value>,
    #[serde(default)]
    pub valid_configuration: bool,
    #[serde(default)]
    pub reconfiguration_cost: f64,
}

impl ProductionSystemData {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text).map_err(std::io::Error::other)?)
    }

    /// Serialize in the normalized wire form (compact JSON, declaration
    /// field order). Two configurations with equal content produce
    /// byte-identical output after [`Self::normalize`].
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize human-readably.
    pub fn to_json_string_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the configuration to a JSON file.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let text = self.to_json_string_pretty().map_err(std::io::Error::other)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Sort every collection by `ID` so that equal systems serialize to
    /// identical bytes.
    pub fn normalize(&mut self) {
        self.time_model_data.sort_by(|a, b| a.id().cmp(b.id()));
        self.state_data.sort_by(|a, b| a.id().cmp(b.id()));
        self.process_data.sort_by(|a, b| a.id().cmp(b.id()));
        self.queue_data.sort_by(|a, b| a.id.cmp(&b.id));
        self.node_data.sort_by(|a, b| a.id.cmp(&b.id));
        self.resource_data.sort_by(|a, b| a.id.cmp(&b.id));
        self.product_data.sort_by(|a, b| a.id.cmp(&b.id));
        self.sink_data.sort_by(|a, b| a.id.cmp(&b.id));
        self.source_data.sort_by(|a, b| a.id.cmp(&b.id));
        self.auxiliary_data.sort_by(|a, b| a.id.cmp(&b.id));
    }

    pub fn time_model(&self, id: &str) -> Option<&TimeModelData> {
        self.time_model_data.iter().find(|t| t.id() == id)
    }

    pub fn state(&self, id: &str) -> Option<&StateData> {
        self.state_data.iter().find(|s| s.id() == id)
    }

    pub fn process(&self, id: &str) -> Option<&ProcessData> {
        self.process_data.iter().find(|p| p.id() == id)
    }

    pub fn queue(&self, id: &str) -> Option<&QueueData> {
        self.queue_data.iter().find(|q| q.id == id)
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceData> {
        self.resource_data.iter().find(|r| r.id == id)
    }
}
