//! Resource runtimes.
//!
//! A resource executes processes through its controller. Besides the pending
//! request list it carries the per-process concurrency slots, the current
//! setup configuration, the directed setup transitions, and its breakdown
//! machines. All state transitions are driven by the simulation driver; this
//! module holds the data and the pure queries.

use fabsim_core::scheduler::EventKey;
use fabsim_core::SimTime;
use fabsim_model::{ControlPolicyKind, ControllerKind};

use crate::ids::{ProcessIdx, QueueIdx, ResourceIdx, TimeModelIdx};
use crate::request::Request;

/// Per-process concurrency slot.
#[derive(Debug)]
pub struct ProcessSlot {
    pub process: ProcessIdx,
    pub capacity: usize,
    pub active: usize,
}

/// Directed setup transition between two process configurations.
#[derive(Debug)]
pub struct SetupTransition {
    pub state_id: String,
    pub origin: ProcessIdx,
    pub target: ProcessIdx,
    pub time_model: TimeModelIdx,
}

/// What a breakdown machine takes down when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownScope {
    Resource,
    Process(ProcessIdx),
}

/// One concurrent breakdown state machine of a resource.
#[derive(Debug)]
pub struct BreakdownMachine {
    pub state_id: String,
    pub scope: BreakdownScope,
    pub ttf_model: TimeModelIdx,
    pub repair_model: TimeModelIdx,
    pub down: bool,
    /// Activities this machine paused; resumed exactly once on repair.
    pub paused_activities: Vec<u64>,
    pub paused_setup: bool,
}

/// An in-progress setup transition.
#[derive(Debug)]
pub struct SetupRun {
    pub state_id: String,
    pub target: ProcessIdx,
    pub ends_at: SimTime,
    pub key: EventKey,
    /// Remaining duration in time units while paused by a breakdown.
    pub remaining: Option<f64>,
    pub paused_by: u32,
}

#[derive(Debug)]
pub struct ResourceRuntime {
    pub idx: ResourceIdx,
    pub id: String,
    pub controller: ControllerKind,
    pub policy: ControlPolicyKind,
    pub location: [f64; 2],
    pub input_location: Option<[f64; 2]>,
    pub output_location: Option<[f64; 2]>,
    pub capacity: usize,
    pub active: usize,
    pub slots: Vec<ProcessSlot>,
    pub setups: Vec<SetupTransition>,
    pub breakdowns: Vec<BreakdownMachine>,
    pub current_setup: Option<ProcessIdx>,
    pub setup_run: Option<SetupRun>,
    /// Number of resource-wide breakdowns currently active.
    pub down_count: u32,
    pub pending: Vec<Request>,
    pub poll_scheduled: bool,
    pub input_queues: Vec<QueueIdx>,
    pub output_queues: Vec<QueueIdx>,
    /// Transports move; production resources stay at `location`.
    pub position: [f64; 2],
    /// Id of the site the transport currently stands at, for transport log
    /// records.
    pub position_site: String,
}

impl ResourceRuntime {
    pub fn is_transport(&self) -> bool {
        self.controller == ControllerKind::TransportController
    }

    pub fn is_down(&self) -> bool {
        self.down_count > 0
    }

    /// The slot executing `process`, if this resource provides it.
    pub fn slot_of(&self, process: ProcessIdx) -> Option<usize> {
        self.slots.iter().position(|s| s.process == process)
    }

    pub fn provides(&self, process: ProcessIdx) -> bool {
        self.slot_of(process).is_some()
    }

    pub fn slot_has_capacity(&self, slot: usize) -> bool {
        self.slots[slot].active < self.slots[slot].capacity
    }

    pub fn has_free_capacity(&self) -> bool {
        self.active < self.capacity && self.setup_run.is_none()
    }

    pub fn process_down(&self, process: ProcessIdx) -> bool {
        self.breakdowns
            .iter()
            .any(|m| m.down && m.scope == BreakdownScope::Process(process))
    }

    /// Whether executing `process` first needs a setup transition, and which.
    ///
    /// The first configuration is adopted for free; an undeclared direction
    /// means no setup time.
    pub fn setup_needed(&self, process: ProcessIdx) -> Option<usize> {
        let current = self.current_setup?;
        if current == process {
            return None;
        }
        self.setups
            .iter()
            .position(|s| s.origin == current && s.target == process)
    }

    /// Point where transports drop products off.
    pub fn input_point(&self) -> [f64; 2] {
        self.input_location.unwrap_or(self.location)
    }

    /// Point where transports pick products up.
    pub fn output_point(&self) -> [f64; 2] {
        self.output_location.unwrap_or(self.location)
    }
}
