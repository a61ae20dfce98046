//! Simulation time management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// Simulation time with nanosecond precision
///
/// `SimTime` represents a point in simulation time, stored as nanoseconds
/// since the simulation start. Configuration files and KPIs express durations
/// as floating point "time units"; one unit corresponds to one second of
/// internal resolution, converted via [`SimTime::from_units`] and
/// [`SimTime::as_units`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

const NANOS_PER_UNIT: f64 = 1_000_000_000.0;

impl SimTime {
    /// Create a new SimTime at the simulation start (time zero)
    pub const fn zero() -> Self {
        SimTime(0)
    }

    /// Create a SimTime from nanoseconds
    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    /// Create a SimTime from whole time units
    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1_000_000_000)
    }

    /// Create a SimTime from fractional time units.
    ///
    /// Negative, non-finite, or overflowing inputs saturate to the nearest
    /// representable value; samplers clamp negatives before conversion, so
    /// this path only matters for defense at the API boundary.
    pub fn from_units(units: f64) -> Self {
        if !units.is_finite() || units <= 0.0 {
            return SimTime(0);
        }
        let nanos = units * NANOS_PER_UNIT;
        if nanos >= u64::MAX as f64 {
            return SimTime(u64::MAX);
        }
        SimTime(nanos as u64)
    }

    /// Convert to fractional time units.
    pub fn as_units(&self) -> f64 {
        self.0 as f64 / NANOS_PER_UNIT
    }

    /// Get the raw nanosecond value
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Convert SimTime to a Duration
    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    /// Calculate the duration since another SimTime
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// Add a duration to this SimTime
    pub fn add_duration(&self, duration: Duration) -> Self {
        SimTime(self.0.saturating_add(duration.as_nanos() as u64))
    }

    /// Subtract a duration from this SimTime
    pub fn sub_duration(&self, duration: Duration) -> Self {
        SimTime(self.0.saturating_sub(duration.as_nanos() as u64))
    }
}

impl Add<SimTime> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> Self::Output {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> Self::Output {
        self.add_duration(rhs)
    }
}

impl Sub<Duration> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.sub_duration(rhs)
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_units())
    }
}
