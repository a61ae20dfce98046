//! Process records.
//!
//! A process is a capability applied to a product at a resource. Production
//! and transport processes match by id; capability processes additionally
//! carry a capability tag that a `RequiredCapabilityProcess` in a product
//! plan can match by type; a `LinkTransportProcess` matches only a specific
//! `{from_resource, to_resource}` move.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProcessData {
    ProductionProcesses {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        time_model_id: String,
        #[serde(default)]
        lot_dependency: bool,
        #[serde(default)]
        max_lot_size: Option<u32>,
        #[serde(default)]
        tool_dependency: Option<String>,
    },
    TransportProcesses {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        time_model_id: String,
        #[serde(default)]
        loading_time_model_id: Option<String>,
        #[serde(default)]
        unloading_time_model_id: Option<String>,
    },
    CapabilityProcess {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        time_model_id: String,
        capability: String,
        #[serde(default)]
        lot_dependency: bool,
        #[serde(default)]
        max_lot_size: Option<u32>,
        #[serde(default)]
        tool_dependency: Option<String>,
    },
    /// Plan-side placeholder matched against capability processes by tag.
    RequiredCapabilityProcess {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        capability: String,
    },
    LinkTransportProcess {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        time_model_id: String,
        from_resource: String,
        to_resource: String,
        #[serde(default)]
        loading_time_model_id: Option<String>,
        #[serde(default)]
        unloading_time_model_id: Option<String>,
    },
}

/// Coarse classification used by validation and the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    Production,
    Transport,
    Capability,
    RequiredCapability,
    LinkTransport,
}

impl ProcessData {
    pub fn id(&self) -> &str {
        match self {
            ProcessData::ProductionProcesses { id, .. }
            | ProcessData::TransportProcesses { id, .. }
            | ProcessData::CapabilityProcess { id, .. }
            | ProcessData::RequiredCapabilityProcess { id, .. }
            | ProcessData::LinkTransportProcess { id, .. } => id,
        }
    }

    pub fn kind(&self) -> ProcessKind {
        match self {
            ProcessData::ProductionProcesses { .. } => ProcessKind::Production,
            ProcessData::TransportProcesses { .. } => ProcessKind::Transport,
            ProcessData::CapabilityProcess { .. } => ProcessKind::Capability,
            ProcessData::RequiredCapabilityProcess { .. } => ProcessKind::RequiredCapability,
            ProcessData::LinkTransportProcess { .. } => ProcessKind::LinkTransport,
        }
    }

    pub fn time_model_id(&self) -> Option<&str> {
        match self {
            ProcessData::ProductionProcesses { time_model_id, .. }
            | ProcessData::TransportProcesses { time_model_id, .. }
            | ProcessData::CapabilityProcess { time_model_id, .. }
            | ProcessData::LinkTransportProcess { time_model_id, .. } => Some(time_model_id),
            ProcessData::RequiredCapabilityProcess { .. } => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            ProcessKind::Transport | ProcessKind::LinkTransport
        )
    }
}
