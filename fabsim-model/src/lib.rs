//! Declarative configuration model for production systems.
//!
//! A production system is described as a JSON document with one array per
//! entity collection (time models, states, processes, queues, nodes,
//! resources, products, sinks, sources, auxiliaries), all cross-referencing
//! each other by `ID`. This crate owns that wire format: the serde data
//! types, load/save, normalization (collections sorted by `ID`), and the
//! validation pass that turns a raw document into something the simulation
//! factory can trust.
//!
//! Validation failures are reported as [`fabsim_core::ConfigError`] naming
//! the offending record kind, its id, and the reason.

pub mod processes;
pub mod products;
pub mod resources;
pub mod states;
pub mod system;
pub mod time_models;
pub mod validate;

pub use processes::{ProcessData, ProcessKind};
pub use products::{
    AuxiliaryData, ProcessPlanData, ProductData, RoutingHeuristicKind, SinkData, SourceData,
};
pub use resources::{ControlPolicyKind, ControllerKind, NodeData, QueueData, ResourceData};
pub use states::StateData;
pub use system::ProductionSystemData;
pub use time_models::{DistributionFunctionData, MetricData, TimeModelData};
pub use validate::validate;
