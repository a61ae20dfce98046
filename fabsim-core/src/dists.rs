//! Duration samplers ("time models") for every timed behavior in a run.
//!
//! A time model turns a stream of random numbers into non-negative durations:
//! processing times, inter-arrival times, times to failure, repair times, and
//! transport times. The set of kinds is closed:
//!
//! - [`FunctionModel`]: draws from a parameterized distribution (constant,
//!   normal, lognormal, exponential). Draws are pre-filled in batches to
//!   amortize sampling.
//! - [`SampleModel`]: replays a fixed list of durations, cyclically or in
//!   random order.
//! - [`ScheduleModel`]: follows a schedule of relative deltas (cyclic or
//!   one-shot) or absolute timestamps.
//! - [`DistanceModel`]: `reaction_time + distance(origin, target) / speed`
//!   in Manhattan or Euclidean metric; origin and target come from the
//!   per-call [`SampleContext`].
//!
//! A negative draw is clamped to zero and logged once per model.

use rand_distr::{Distribution as _, Exp, LogNormal, Normal};
use tracing::warn;

use crate::error::{ConfigError, SimResult};
use crate::rng::SimRng;

/// Per-call context for sampling.
///
/// Distance models need the endpoints of the move; schedule models need the
/// current simulation time to turn absolute timestamps into waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleContext {
    pub now: f64,
    pub origin: Option<[f64; 2]>,
    pub target: Option<[f64; 2]>,
}

impl SampleContext {
    pub fn at(now: f64) -> Self {
        Self {
            now,
            origin: None,
            target: None,
        }
    }

    pub fn travel(now: f64, origin: [f64; 2], target: [f64; 2]) -> Self {
        Self {
            now,
            origin: Some(origin),
            target: Some(target),
        }
    }
}

/// Supported distribution functions for [`FunctionModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionFunction {
    Constant,
    Normal,
    Lognormal,
    Exponential,
}

enum Sampler {
    Constant(f64),
    Normal(Normal<f64>),
    Lognormal(LogNormal<f64>),
    Exponential(Exp<f64>),
}

/// Distribution-backed time model with batch pre-draw.
pub struct FunctionModel {
    id: String,
    location: f64,
    sampler: Sampler,
    batch_size: usize,
    buffer: Vec<f64>,
    rng: SimRng,
    clamp_warned: bool,
}

impl FunctionModel {
    /// Build the model, validating distribution parameters. Unsupported
    /// parameter combinations are fatal at setup.
    pub fn new(
        id: &str,
        function: DistributionFunction,
        location: f64,
        scale: f64,
        batch_size: usize,
        rng: SimRng,
    ) -> SimResult<Self> {
        let sampler = match function {
            DistributionFunction::Constant => Sampler::Constant(location),
            DistributionFunction::Normal => {
                Sampler::Normal(Normal::new(location, scale).map_err(|e| {
                    ConfigError::new("time_model_data", id, format!("invalid normal: {e}"))
                })?)
            }
            DistributionFunction::Lognormal => {
                Sampler::Lognormal(LogNormal::new(location, scale).map_err(|e| {
                    ConfigError::new("time_model_data", id, format!("invalid lognormal: {e}"))
                })?)
            }
            DistributionFunction::Exponential => {
                if location <= 0.0 {
                    return Err(ConfigError::new(
                        "time_model_data",
                        id,
                        format!("exponential mean must be positive, got {location}"),
                    )
                    .into());
                }
                Sampler::Exponential(Exp::new(1.0 / location).map_err(|e| {
                    ConfigError::new("time_model_data", id, format!("invalid exponential: {e}"))
                })?)
            }
        };
        Ok(Self {
            id: id.to_string(),
            location,
            sampler,
            batch_size: batch_size.max(1),
            buffer: Vec::new(),
            rng,
            clamp_warned: false,
        })
    }

    fn fill_buffer(&mut self) {
        let rng = self.rng.inner();
        self.buffer = (0..self.batch_size)
            .map(|_| match &self.sampler {
                Sampler::Constant(v) => *v,
                Sampler::Normal(d) => d.sample(rng),
                Sampler::Lognormal(d) => d.sample(rng),
                Sampler::Exponential(d) => d.sample(rng),
            })
            .collect();
        self.buffer.reverse();
    }

    fn next_value(&mut self) -> f64 {
        let value = match self.buffer.pop() {
            Some(v) => v,
            None => {
                self.fill_buffer();
                self.buffer.pop().expect("batch size is at least 1")
            }
        };
        if value < 0.0 {
            if !self.clamp_warned {
                warn!(
                    time_model = %self.id,
                    sample = value,
                    "negative sample clamped to zero"
                );
                self.clamp_warned = true;
            }
            return 0.0;
        }
        value
    }
}

/// Replays a fixed list of durations.
pub struct SampleModel {
    samples: Vec<f64>,
    cursor: usize,
    randomize: bool,
    rng: SimRng,
}

impl SampleModel {
    pub fn new(id: &str, samples: Vec<f64>, randomize: bool, rng: SimRng) -> SimResult<Self> {
        if samples.is_empty() {
            return Err(ConfigError::new("time_model_data", id, "samples list is empty").into());
        }
        Ok(Self {
            samples,
            cursor: 0,
            randomize,
            rng,
        })
    }

    fn next_value(&mut self) -> f64 {
        let value = if self.randomize {
            self.samples[self.rng.index(self.samples.len())]
        } else {
            let v = self.samples[self.cursor];
            self.cursor = (self.cursor + 1) % self.samples.len();
            v
        };
        value.max(0.0)
    }
}

/// Follows a schedule of deltas or absolute timestamps.
///
/// Relative schedules yield their deltas in order, wrapping around when
/// cyclic. Absolute schedules yield the wait until the next timestamp; once
/// exhausted (one-shot) they return infinity, which callers treat as "never
/// again".
pub struct ScheduleModel {
    entries: Vec<f64>,
    absolute: bool,
    cyclic: bool,
    cursor: usize,
}

impl ScheduleModel {
    pub fn new(id: &str, entries: Vec<f64>, absolute: bool, cyclic: bool) -> SimResult<Self> {
        if entries.is_empty() {
            return Err(ConfigError::new("time_model_data", id, "schedule is empty").into());
        }
        if absolute && cyclic {
            return Err(ConfigError::new(
                "time_model_data",
                id,
                "absolute schedules cannot be cyclic",
            )
            .into());
        }
        Ok(Self {
            entries,
            absolute,
            cyclic,
            cursor: 0,
        })
    }

    fn next_value(&mut self, now: f64) -> f64 {
        if self.cursor >= self.entries.len() {
            if !self.cyclic {
                return f64::INFINITY;
            }
            self.cursor = 0;
        }
        let entry = self.entries[self.cursor];
        self.cursor += 1;
        if self.absolute {
            (entry - now).max(0.0)
        } else {
            entry.max(0.0)
        }
    }
}

/// Distance metric for [`DistanceModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Manhattan,
    Euclidean,
}

/// Travel-time model: `reaction_time + distance / speed`.
pub struct DistanceModel {
    speed: f64,
    reaction_time: f64,
    metric: Metric,
}

impl DistanceModel {
    pub fn new(id: &str, speed: f64, reaction_time: f64, metric: Metric) -> SimResult<Self> {
        if speed <= 0.0 {
            return Err(ConfigError::new(
                "time_model_data",
                id,
                format!("speed must be positive, got {speed}"),
            )
            .into());
        }
        Ok(Self {
            speed,
            reaction_time,
            metric,
        })
    }

    fn distance(&self, origin: [f64; 2], target: [f64; 2]) -> f64 {
        let dx = origin[0] - target[0];
        let dy = origin[1] - target[1];
        match self.metric {
            Metric::Manhattan => dx.abs() + dy.abs(),
            Metric::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }

    fn travel_time(&self, ctx: &SampleContext) -> f64 {
        match (ctx.origin, ctx.target) {
            (Some(origin), Some(target)) => {
                self.reaction_time + self.distance(origin, target) / self.speed
            }
            // Co-located endpoints are passed as equal coordinates; missing
            // endpoints mean the caller asked for a reaction-only delay.
            _ => self.reaction_time,
        }
    }
}

/// A duration sampler of one of the closed set of kinds.
pub enum TimeModel {
    Function(FunctionModel),
    Sample(SampleModel),
    Schedule(ScheduleModel),
    Distance(DistanceModel),
}

impl TimeModel {
    /// Draw the next duration. Always `>= 0`; may be infinite for exhausted
    /// one-shot schedules.
    pub fn sample(&mut self, ctx: &SampleContext) -> f64 {
        match self {
            TimeModel::Function(m) => m.next_value(),
            TimeModel::Sample(m) => m.next_value(),
            TimeModel::Schedule(m) => m.next_value(ctx.now),
            TimeModel::Distance(m) => m.travel_time(ctx),
        }
    }

    /// Expected duration, used by shortest-processing-time policies.
    pub fn expected(&self, ctx: &SampleContext) -> f64 {
        match self {
            TimeModel::Function(m) => m.location,
            TimeModel::Sample(m) => {
                m.samples.iter().sum::<f64>() / m.samples.len() as f64
            }
            TimeModel::Schedule(m) => {
                m.entries.iter().sum::<f64>() / m.entries.len() as f64
            }
            TimeModel::Distance(m) => m.travel_time(ctx),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TimeModel::Function(_) => "function",
            TimeModel::Sample(_) => "sample",
            TimeModel::Schedule(_) => "schedule",
            TimeModel::Distance(_) => "distance",
        }
    }
}
