//! Per-resource time-in-state reconstruction.
//!
//! Walks a resource's log records in time order and classifies every interval
//! between consecutive events:
//!
//! - `UD` while a resource-wide breakdown is active,
//! - `ST` while a setup transition runs,
//! - `PR` while at least one activity is executing (interrupted activities
//!   stop counting until their interrupt ends),
//! - `SB` otherwise.
//!
//! A process-specific breakdown does not force `UD`: other processes keep
//! running, so the interval classifies by the remaining activity. The
//! interval from the last event to the horizon is classified by the final
//! flags, which makes the four shares sum to the horizon exactly.

use fabsim_components::{ActivityKind, EventRecord, StateTypeKind};

use crate::kpi::ResourceStateKpi;

#[derive(Debug, Default)]
struct StateFlags {
    used: i64,
    down: i64,
    setup: i64,
}

impl StateFlags {
    fn classify(&self) -> usize {
        if self.down > 0 {
            3 // UD
        } else if self.setup > 0 {
            2 // ST
        } else if self.used > 0 {
            0 // PR
        } else {
            1 // SB
        }
    }

    fn apply(&mut self, record: &EventRecord) {
        let delta = match record.activity {
            ActivityKind::StartState | ActivityKind::EndInterrupt => 1,
            ActivityKind::EndState | ActivityKind::StartInterrupt | ActivityKind::Truncated => -1,
            _ => return,
        };
        match record.state_type {
            StateTypeKind::Production | StateTypeKind::Transport => self.used += delta,
            StateTypeKind::Breakdown => self.down += delta,
            StateTypeKind::Setup => self.setup += delta,
            // Process breakdowns only gate their own process; the resource
            // keeps classifying by what still runs.
            StateTypeKind::ProcessBreakdown => {}
            StateTypeKind::Source | StateTypeKind::Sink => {}
        }
    }
}

/// Compute PR/SB/ST/UD percentages for every resource appearing in the log.
///
/// Resources are reported in order of first appearance. Source and sink
/// records carry no resource state and are skipped.
pub fn time_in_states(records: &[EventRecord], horizon: f64) -> Vec<ResourceStateKpi> {
    let mut order: Vec<&str> = Vec::new();
    for r in records {
        if matches!(r.state_type, StateTypeKind::Source | StateTypeKind::Sink) {
            continue;
        }
        if !order.contains(&r.resource.as_str()) {
            order.push(&r.resource);
        }
    }

    order
        .into_iter()
        .map(|resource| {
            // buckets: PR, SB, ST, UD
            let mut buckets = [0.0f64; 4];
            let mut flags = StateFlags::default();
            let mut last_time = 0.0f64;
            for record in records.iter().filter(|r| r.resource == resource) {
                if matches!(r_type(record), None) {
                    continue;
                }
                let t = record.time.min(horizon);
                if t > last_time {
                    buckets[flags.classify()] += t - last_time;
                    last_time = t;
                }
                flags.apply(record);
            }
            if horizon > last_time {
                buckets[flags.classify()] += horizon - last_time;
            }
            let pct = |v: f64| if horizon > 0.0 { v / horizon * 100.0 } else { 0.0 };
            ResourceStateKpi {
                resource: resource.to_string(),
                productive: pct(buckets[0]),
                standby: pct(buckets[1]),
                setup: pct(buckets[2]),
                down: pct(buckets[3]),
            }
        })
        .collect()
}

fn r_type(record: &EventRecord) -> Option<StateTypeKind> {
    match record.state_type {
        StateTypeKind::Source | StateTypeKind::Sink => None,
        other => Some(other),
    }
}
