//! State records: breakdowns, process breakdowns, and setups.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateData {
    /// Resource-wide breakdown: `time_model_id` samples time to failure,
    /// `repair_time_model_id` samples the repair duration.
    BreakDownState {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        time_model_id: String,
        repair_time_model_id: String,
    },
    /// Breakdown affecting a single process of the resource.
    ProcessBreakDownState {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        time_model_id: String,
        repair_time_model_id: String,
        process_id: String,
    },
    /// Directed setup transition between two process configurations.
    SetupState {
        #[serde(rename = "ID")]
        id: String,
        #[serde(default)]
        description: String,
        time_model_id: String,
        origin_setup: String,
        target_setup: String,
    },
}

impl StateData {
    pub fn id(&self) -> &str {
        match self {
            StateData::BreakDownState { id, .. }
            | StateData::ProcessBreakDownState { id, .. }
            | StateData::SetupState { id, .. } => id,
        }
    }

    pub fn time_model_id(&self) -> &str {
        match self {
            StateData::BreakDownState { time_model_id, .. }
            | StateData::ProcessBreakDownState { time_model_id, .. }
            | StateData::SetupState { time_model_id, .. } => time_model_id,
        }
    }
}
