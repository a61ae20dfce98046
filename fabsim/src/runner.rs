//! The simulation runner.
//!
//! Ties the crates together: load and validate a configuration, build the
//! simulation objects, run to a horizon, and hand out the event log and the
//! aggregated KPIs.

use std::path::Path;

use fabsim_components::{factory, EventRecord, Simulation};
use fabsim_core::{SimError, SimResult};
use fabsim_metrics::{self as metrics, PostProcessor, SimulationResults};
use fabsim_model::ProductionSystemData;

/// Runs a production system simulation based on a declarative configuration.
pub struct Runner {
    config: ProductionSystemData,
    seed_override: Option<u64>,
    simulation: Option<Simulation>,
    horizon: f64,
}

impl Runner {
    pub fn new(config: ProductionSystemData) -> Self {
        Self {
            config,
            seed_override: None,
            simulation: None,
            horizon: 0.0,
        }
    }

    /// Load the configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        Ok(Self::new(ProductionSystemData::from_json_file(path)?))
    }

    /// Override the seed embedded in the configuration.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_override = Some(seed);
        self
    }

    pub fn config(&self) -> &ProductionSystemData {
        &self.config
    }

    /// Validate the configuration and build all simulation objects. Must be
    /// called before [`Runner::run`].
    pub fn initialize(&mut self) -> SimResult<()> {
        let seed = self.seed_override.unwrap_or(self.config.seed);
        self.simulation = Some(factory::build_with_seed(&self.config, seed)?);
        Ok(())
    }

    /// Run the simulation for `horizon` time units. Initializes on demand.
    pub fn run(&mut self, horizon: f64) -> SimResult<()> {
        if self.simulation.is_none() {
            self.initialize()?;
        }
        let simulation = self.simulation.as_mut().expect("initialized above");
        simulation.run(horizon)?;
        self.horizon = horizon;
        Ok(())
    }

    fn simulation_ref(&self) -> SimResult<&Simulation> {
        self.simulation.as_ref().ok_or(SimError::NotInitialized)
    }

    /// The built simulation, for inspection.
    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    /// The raw event log rows.
    pub fn event_log(&self) -> SimResult<&[EventRecord]> {
        Ok(self.simulation_ref()?.event_records())
    }

    /// A post-processor over the run's event log.
    pub fn post_processor(&self) -> SimResult<PostProcessor> {
        let records = self.event_log()?.to_vec();
        Ok(PostProcessor::new(records, self.horizon))
    }

    /// Aggregated KPIs: throughput, WIP, throughput time, time-in-state.
    pub fn results(&self) -> SimResult<SimulationResults> {
        Ok(self.post_processor()?.results())
    }

    /// Save the event log as a CSV file.
    pub fn save_event_log_csv(&self, path: impl AsRef<Path>) -> SimResult<()> {
        metrics::write_csv(path, self.event_log()?).map_err(io_error)
    }

    /// Save the event log as a JSON file.
    pub fn save_event_log_json(&self, path: impl AsRef<Path>) -> SimResult<()> {
        metrics::write_json(path, self.event_log()?).map_err(io_error)
    }
}

fn io_error(err: metrics::MetricsError) -> SimError {
    match err {
        metrics::MetricsError::Io(e) => SimError::Io(e),
        metrics::MetricsError::Json(e) => SimError::Io(std::io::Error::other(e)),
    }
}
