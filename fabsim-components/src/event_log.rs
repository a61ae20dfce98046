//! The simulation event log.
//!
//! Every observable transition appends one immutable record: state starts and
//! ends, breakdown interrupts, product creation and completion, and horizon
//! truncation. The log is the single source of truth for all KPIs; nothing
//! is derived from engine internals after a run.

use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    #[serde(rename = "created state")]
    CreatedState,
    #[serde(rename = "start state")]
    StartState,
    #[serde(rename = "start interrupt")]
    StartInterrupt,
    #[serde(rename = "end interrupt")]
    EndInterrupt,
    #[serde(rename = "end state")]
    EndState,
    #[serde(rename = "created product")]
    CreatedProduct,
    #[serde(rename = "finished product")]
    FinishedProduct,
    #[serde(rename = "truncated")]
    Truncated,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::CreatedState => "created state",
            ActivityKind::StartState => "start state",
            ActivityKind::StartInterrupt => "start interrupt",
            ActivityKind::EndInterrupt => "end interrupt",
            ActivityKind::EndState => "end state",
            ActivityKind::CreatedProduct => "created product",
            ActivityKind::FinishedProduct => "finished product",
            ActivityKind::Truncated => "truncated",
        }
    }
}

/// Which kind of state the record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateTypeKind {
    Production,
    Transport,
    Breakdown,
    ProcessBreakdown,
    Setup,
    Source,
    Sink,
}

impl StateTypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateTypeKind::Production => "Production",
            StateTypeKind::Transport => "Transport",
            StateTypeKind::Breakdown => "Breakdown",
            StateTypeKind::ProcessBreakdown => "ProcessBreakdown",
            StateTypeKind::Setup => "Setup",
            StateTypeKind::Source => "Source",
            StateTypeKind::Sink => "Sink",
        }
    }
}

/// One immutable history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "Resource")]
    pub resource: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "State Type")]
    pub state_type: StateTypeKind,
    #[serde(rename = "Activity")]
    pub activity: ActivityKind,
    #[serde(rename = "Product")]
    pub product: Option<String>,
    #[serde(rename = "Expected End Time")]
    pub expected_end_time: Option<f64>,
    #[serde(rename = "Origin location")]
    pub origin_location: Option<String>,
    #[serde(rename = "Target location")]
    pub target_location: Option<String>,
    #[serde(rename = "Empty Transport")]
    pub empty_transport: Option<bool>,
}

/// Append-only collector for [`EventRecord`]s.
#[derive(Debug, Default)]
pub struct EventLogger {
    records: Vec<EventRecord>,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn push(&mut self, record: EventRecord) {
        self.records.push(record);
    }

    pub fn created_state(&mut self, time: f64, resource: &str, state: &str, state_type: StateTypeKind) {
        self.push(EventRecord {
            time,
            resource: resource.to_string(),
            state: state.to_string(),
            state_type,
            activity: ActivityKind::CreatedState,
            product: None,
            expected_end_time: None,
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn start_state(
        &mut self,
        time: f64,
        resource: &str,
        state: &str,
        state_type: StateTypeKind,
        product: Option<&str>,
        expected_end_time: f64,
    ) {
        self.push(EventRecord {
            time,
            resource: resource.to_string(),
            state: state.to_string(),
            state_type,
            activity: ActivityKind::StartState,
            product: product.map(str::to_string),
            expected_end_time: Some(expected_end_time),
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn start_transport(
        &mut self,
        time: f64,
        resource: &str,
        state: &str,
        product: Option<&str>,
        expected_end_time: f64,
        origin: &str,
        target: &str,
        empty_transport: bool,
    ) {
        self.push(EventRecord {
            time,
            resource: resource.to_string(),
            state: state.to_string(),
            state_type: StateTypeKind::Transport,
            activity: ActivityKind::StartState,
            product: product.map(str::to_string),
            expected_end_time: Some(expected_end_time),
            origin_location: Some(origin.to_string()),
            target_location: Some(target.to_string()),
            empty_transport: Some(empty_transport),
        });
    }

    pub fn end_state(
        &mut self,
        time: f64,
        resource: &str,
        state: &str,
        state_type: StateTypeKind,
        product: Option<&str>,
    ) {
        self.push(EventRecord {
            time,
            resource: resource.to_string(),
            state: state.to_string(),
            state_type,
            activity: ActivityKind::EndState,
            product: product.map(str::to_string),
            expected_end_time: None,
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }

    pub fn start_interrupt(
        &mut self,
        time: f64,
        resource: &str,
        state: &str,
        state_type: StateTypeKind,
        product: Option<&str>,
    ) {
        self.push(EventRecord {
            time,
            resource: resource.to_string(),
            state: state.to_string(),
            state_type,
            activity: ActivityKind::StartInterrupt,
            product: product.map(str::to_string),
            expected_end_time: None,
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }

    pub fn end_interrupt(
        &mut self,
        time: f64,
        resource: &str,
        state: &str,
        state_type: StateTypeKind,
        product: Option<&str>,
        expected_end_time: f64,
    ) {
        self.push(EventRecord {
            time,
            resource: resource.to_string(),
            state: state.to_string(),
            state_type,
            activity: ActivityKind::EndInterrupt,
            product: product.map(str::to_string),
            expected_end_time: Some(expected_end_time),
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }

    pub fn created_product(&mut self, time: f64, source: &str, product: &str) {
        self.push(EventRecord {
            time,
            resource: source.to_string(),
            state: source.to_string(),
            state_type: StateTypeKind::Source,
            activity: ActivityKind::CreatedProduct,
            product: Some(product.to_string()),
            expected_end_time: None,
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }

    pub fn finished_product(&mut self, time: f64, sink: &str, product: &str) {
        self.push(EventRecord {
            time,
            resource: sink.to_string(),
            state: sink.to_string(),
            state_type: StateTypeKind::Sink,
            activity: ActivityKind::FinishedProduct,
            product: Some(product.to_string()),
            expected_end_time: None,
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }

    pub fn truncated(
        &mut self,
        time: f64,
        resource: &str,
        state: &str,
        state_type: StateTypeKind,
        product: Option<&str>,
    ) {
        self.push(EventRecord {
            time,
            resource: resource.to_string(),
            state: state.to_string(),
            state_type,
            activity: ActivityKind::Truncated,
            product: product.map(str::to_string),
            expected_end_time: None,
            origin_location: None,
            target_location: None,
            empty_transport: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_accumulate_in_order() {
        let mut log = EventLogger::new();
        log.created_product(0.0, "S1", "Product_1_1");
        log.start_state(0.5, "M1", "P1", StateTypeKind::Production, Some("Product_1_1"), 1.5);
        log.end_state(1.5, "M1", "P1", StateTypeKind::Production, Some("Product_1_1"));

        assert_eq!(log.len(), 3);
        assert_eq!(log.records()[0].activity, ActivityKind::CreatedProduct);
        assert_eq!(log.records()[1].expected_end_time, Some(1.5));
        assert_eq!(log.records()[2].activity, ActivityKind::EndState);
    }

    #[test]
    fn test_activity_serializes_to_log_vocabulary() {
        let json = serde_json::to_string(&ActivityKind::StartState).unwrap();
        assert_eq!(json, r#""start state""#);
        let back: ActivityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ActivityKind::StartState);
    }

    #[test]
    fn test_record_uses_column_names() {
        let mut log = EventLogger::new();
        log.start_transport(1.0, "TR1", "TP1", Some("Product_1_1"), 2.0, "S1", "M1", false);
        let json = serde_json::to_value(&log.records()[0]).unwrap();
        assert_eq!(json["Time"], 1.0);
        assert_eq!(json["State Type"], "Transport");
        assert_eq!(json["Target location"], "M1");
        assert_eq!(json["Empty Transport"], false);
    }
}
