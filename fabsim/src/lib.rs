//! # fabsim — production system simulation
//!
//! fabsim is a deterministic, single-threaded discrete-event simulator for
//! production systems described as products, processes, and resources. A
//! declarative JSON configuration defines arrival sources, transformation
//! and transport processes, resources with sequencing policies and
//! stochastic breakdown/setup behavior, routing policies, and bounded
//! queues; the engine advances simulated time, routes every product through
//! its required process steps, and emits a complete event log from which
//! throughput, WIP, throughput time, and per-resource time-in-state KPIs
//! are derived.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fabsim::prelude::*;
//!
//! let mut runner = Runner::from_json_file("factory.json").unwrap();
//! runner.initialize().unwrap();
//! runner.run(2880.0).unwrap();
//! let results = runner.results().unwrap();
//! println!("{}", serde_json::to_string_pretty(&results).unwrap());
//! ```
//!
//! ## Determinism
//!
//! For a given configuration and seed, a run is bit-identical across
//! executions: events at equal simulated time are ordered by insertion, the
//! engine is single-threaded, and every stochastic time model owns a random
//! stream derived from the root seed and its own id.

pub use fabsim_components as components;
pub use fabsim_core as core;
pub use fabsim_metrics as metrics;
pub use fabsim_model as model;

pub mod runner;

pub use runner::Runner;

pub mod prelude {
    //! Commonly used types and traits

    pub use crate::runner::Runner;
    pub use fabsim_components::{ActivityKind, EventRecord, Simulation, StateTypeKind};
    pub use fabsim_core::{
        init_simulation_logging, init_simulation_logging_with_level, SimError, SimResult, SimTime,
    };
    pub use fabsim_metrics::{PostProcessor, SimulationResults};
    pub use fabsim_model::ProductionSystemData;
}
