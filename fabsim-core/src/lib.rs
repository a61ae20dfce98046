//! Core discrete event simulation kernel.
//!
//! This crate provides the fundamental building blocks for the production
//! system simulator: time management, event scheduling, deterministic random
//! streams, and the duration samplers ("time models") that drive every timed
//! behavior in a run.
//!
//! # Architecture Overview
//!
//! The kernel is built around two types:
//!
//! - [`SimTime`]: a point in simulation time (not wall-clock time), stored
//!   with nanosecond precision. All scheduling is expressed in `SimTime`.
//!
//! - [`Scheduler`]: a logical clock plus a priority queue of pending wakeups
//!   ordered by `(time, seq)`, where `seq` is a monotone insertion counter
//!   that breaks ties deterministically (FIFO at equal time).
//!
//! The scheduler is generic over the event payload: higher layers define a
//! closed event enum and dispatch on it. Cancellation is modeled by marking
//! an entry stale via its [`EventKey`] and discarding it on pop.
//!
//! # Determinism
//!
//! For a given seed and configuration a run is bit-identical across
//! executions. Every sampler owns an independent [`rand_pcg::Pcg64`] stream
//! derived from `(root seed, model id)` via [`rng::stream_seed`], so adding
//! or removing one model never shifts the draws of another.

pub mod dists;
pub mod error;
pub mod logging;
pub mod rng;
pub mod scheduler;
pub mod time;

pub use dists::{SampleContext, TimeModel};
pub use error::{ConfigError, SimError, SimResult};
pub use logging::{init_simulation_logging, init_simulation_logging_with_level};
pub use rng::{stream_seed, SimRng};
pub use scheduler::{EventEntry, EventKey, Scheduler};
pub use time::SimTime;
