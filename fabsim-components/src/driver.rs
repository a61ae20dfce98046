//! The simulation driver.
//!
//! Single-threaded, cooperative, event-driven. The driver owns every arena
//! for the run's duration and advances by popping `(time, seq)`-ordered
//! wakeups from the scheduler. Each wakeup resumes one suspended behavior:
//! a source arrival, an activity completion, a setup or repair finishing, a
//! breakdown firing, or a controller/router re-evaluation. Mutual exclusion
//! is structural: only the currently resumed continuation executes.
//!
//! Pausing (breakdown preemption) cancels the pending completion wakeup and
//! stores the remaining duration; resuming re-schedules it. Cancellation is
//! the scheduler's stale-entry mechanism, so the heap never needs surgery.

use std::collections::{BTreeMap, HashMap};

use fabsim_core::scheduler::EventKey;
use fabsim_core::{SampleContext, SimError, SimResult, SimTime, TimeModel};
use fabsim_model::RoutingHeuristicKind;
use tracing::{debug, trace};

use crate::auxiliary::AuxiliaryPool;
use crate::controller;
use crate::event_log::{EventLogger, EventRecord, StateTypeKind};
use crate::ids::{
    AuxiliaryIdx, ProcessIdx, ProductIdx, QueueIdx, ResourceIdx, SinkIdx, SourceIdx, TimeModelIdx,
};
use crate::product::{PlanRuntime, ProductRuntime};
use crate::queue::{ProductQueue, QueueVerdict, ReservationId};
use crate::request::{Request, RequestKind, SiteRef, TargetRef};
use crate::resource::{BreakdownScope, ResourceRuntime, SetupRun};
use crate::router::{self, RouteCandidate, Router};

/// Runtime form of a process record, fully resolved to indices.
#[derive(Debug)]
pub struct ProcessRuntime {
    pub idx: ProcessIdx,
    pub id: String,
    pub kind: ProcessFlavor,
    pub time_model: Option<TimeModelIdx>,
    pub loading_time_model: Option<TimeModelIdx>,
    pub unloading_time_model: Option<TimeModelIdx>,
    /// 1 means no lot formation.
    pub max_lot_size: u32,
    pub tool: Option<AuxiliaryIdx>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessFlavor {
    Production,
    Transport,
    Capability(String),
    RequiredCapability(String),
    LinkTransport { from: String, to: String },
}

impl ProcessRuntime {
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            ProcessFlavor::Transport | ProcessFlavor::LinkTransport { .. }
        )
    }
}

/// Prototype from which a source stamps new products.
#[derive(Debug)]
pub struct PlanProto {
    pub product_type: String,
    pub plan: PlanRuntime,
    pub transport_process: ProcessIdx,
}

#[derive(Debug)]
pub struct SourceRuntime {
    pub idx: SourceIdx,
    pub id: String,
    pub location: [f64; 2],
    pub product_type: String,
    /// Index into the plan prototype arena.
    pub proto: usize,
    pub time_model: TimeModelIdx,
    pub routing: RoutingHeuristicKind,
    pub output_queues: Vec<QueueIdx>,
    /// A created product that found no output slot yet.
    pub blocked: Option<ProductIdx>,
    pub created: u64,
}

#[derive(Debug)]
pub struct SinkRuntime {
    pub idx: SinkIdx,
    pub id: String,
    pub location: [f64; 2],
    pub product_type: String,
    pub input_queues: Vec<QueueIdx>,
    pub finished: u64,
}

/// An in-flight timed activity.
#[derive(Debug)]
pub struct ActivityRun {
    pub id: u64,
    pub resource: ResourceIdx,
    pub process: ProcessIdx,
    pub slot: usize,
    pub members: Vec<ProductIdx>,
    /// Plan entries fulfilled per member (None for sink moves).
    pub member_plans: Vec<Option<ProcessIdx>>,
    pub flavor: ActivityFlavor,
    /// State column of the log records this activity emits.
    pub state_id: String,
    pub ends_at: SimTime,
    pub key: EventKey,
    /// Remaining duration in time units while paused.
    pub remaining: Option<f64>,
    pub paused_by: u32,
    /// Production: output-slot promise per member.
    pub outputs: Vec<(QueueIdx, ReservationId)>,
    pub tool: Option<AuxiliaryIdx>,
}

#[derive(Debug)]
pub enum ActivityFlavor {
    Production,
    /// Deadheading to the pickup point; the transport order rides along.
    TransportEmpty { request: Request },
    TransportLoaded { request: Request },
}

impl ActivityRun {
    fn state_type(&self) -> StateTypeKind {
        match self.flavor {
            ActivityFlavor::Production => StateTypeKind::Production,
            _ => StateTypeKind::Transport,
        }
    }
}

/// Wakeup payloads. Each variant is a resume point of one suspended
/// behavior.
#[derive(Debug)]
pub enum SimEvent {
    SourceArrival(SourceIdx),
    ActivityDone(u64),
    SetupDone(ResourceIdx),
    BreakdownBegin(ResourceIdx, usize),
    RepairDone(ResourceIdx, usize),
    ControllerPoll(ResourceIdx),
    RouterPoll,
}

/// The assembled, runnable production system.
pub struct Simulation {
    pub(crate) seed: u64,
    pub(crate) scheduler: fabsim_core::Scheduler<SimEvent>,
    pub(crate) time_models: Vec<TimeModel>,
    pub(crate) processes: Vec<ProcessRuntime>,
    pub(crate) queues: Vec<ProductQueue>,
    pub(crate) resources: Vec<ResourceRuntime>,
    pub(crate) sources: Vec<SourceRuntime>,
    pub(crate) sinks: Vec<SinkRuntime>,
    pub(crate) products: Vec<ProductRuntime>,
    pub(crate) auxiliaries: Vec<AuxiliaryPool>,
    pub(crate) plan_protos: Vec<PlanProto>,
    pub(crate) router: Router,
    pub(crate) logger: EventLogger,
    pub(crate) activities: BTreeMap<u64, ActivityRun>,
    pub(crate) next_activity: u64,
    pub(crate) next_reservation: u64,
    pub(crate) next_request_seq: u64,
    pub(crate) product_counters: HashMap<String, u64>,
    /// Resources that read each queue as an output buffer; polled when a
    /// slot frees.
    pub(crate) queue_output_owners: Vec<Vec<ResourceIdx>>,
    pub(crate) queue_sources: Vec<Vec<SourceIdx>>,
    pub(crate) horizon: SimTime,
    pub(crate) started: bool,
    pub(crate) event_index: u64,
    pub(crate) wip: u64,
}

impl Simulation {
    // ------------------------------------------------------------------
    // Public surface
    // ------------------------------------------------------------------

    /// Run until the horizon (in time units). Events scheduled past the
    /// horizon stay unpopped; in-flight activities are logged as truncated.
    pub fn run(&mut self, horizon: f64) -> SimResult<()> {
        self.horizon = SimTime::from_units(horizon);
        if !self.started {
            self.start();
            self.started = true;
        }
        while let Some(t) = self.scheduler.peek_time() {
            if t > self.horizon {
                break;
            }
            let entry = self.scheduler.pop().expect("peeked entry exists");
            self.event_index += 1;
            trace!(seq = entry.seq, time = entry.time.as_units(), event = ?entry.event, "dispatch");
            self.dispatch(entry.event)?;
        }
        self.truncate_in_flight();
        debug!(
            events = self.event_index,
            records = self.logger.len(),
            finished = self.finished_products(),
            "run complete"
        );
        Ok(())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time_units(&self) -> f64 {
        self.scheduler.time().as_units()
    }

    pub fn horizon_units(&self) -> f64 {
        self.horizon.as_units()
    }

    /// Work-in-process: products created and not yet finished.
    pub fn wip(&self) -> u64 {
        self.wip
    }

    pub fn finished_products(&self) -> u64 {
        self.sinks.iter().map(|s| s.finished).sum()
    }

    pub fn event_records(&self) -> &[EventRecord] {
        self.logger.records()
    }

    pub fn take_event_log(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.logger).into_records()
    }

    pub fn products(&self) -> &[ProductRuntime] {
        &self.products
    }

    pub fn queues(&self) -> &[ProductQueue] {
        &self.queues
    }

    pub fn resources(&self) -> &[ResourceRuntime] {
        &self.resources
    }

    pub fn auxiliaries(&self) -> &[AuxiliaryPool] {
        &self.auxiliaries
    }

    // ------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------

    fn start(&mut self) {
        // Observable machinery exists from t = 0.
        for r in &self.resources {
            for slot in &r.slots {
                let state_type = if self.processes[slot.process.idx()].is_transport() {
                    StateTypeKind::Transport
                } else {
                    StateTypeKind::Production
                };
                self.logger
                    .created_state(0.0, &r.id, &self.processes[slot.process.idx()].id, state_type);
            }
            for m in &r.breakdowns {
                let state_type = match m.scope {
                    BreakdownScope::Resource => StateTypeKind::Breakdown,
                    BreakdownScope::Process(_) => StateTypeKind::ProcessBreakdown,
                };
                self.logger.created_state(0.0, &r.id, &m.state_id, state_type);
            }
            for s in &r.setups {
                self.logger
                    .created_state(0.0, &r.id, &s.state_id, StateTypeKind::Setup);
            }
        }
        for si in 0..self.sources.len() {
            self.schedule_next_arrival(SourceIdx(si as u32));
        }
        for ri in 0..self.resources.len() {
            for mi in 0..self.resources[ri].breakdowns.len() {
                let ttf_model = self.resources[ri].breakdowns[mi].ttf_model;
                let ttf = self.sample(ttf_model, &SampleContext::at(0.0));
                if ttf.is_finite() {
                    self.scheduler.schedule(
                        SimTime::from_units(ttf),
                        SimEvent::BreakdownBegin(ResourceIdx(ri as u32), mi),
                    );
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    fn dispatch(&mut self, event: SimEvent) -> SimResult<()> {
        match event {
            SimEvent::SourceArrival(s) => self.handle_source_arrival(s),
            SimEvent::ActivityDone(a) => self.handle_activity_done(a),
            SimEvent::SetupDone(r) => self.handle_setup_done(r),
            SimEvent::BreakdownBegin(r, m) => self.handle_breakdown_begin(r, m),
            SimEvent::RepairDone(r, m) => self.handle_repair_done(r, m),
            SimEvent::ControllerPoll(r) => self.handle_controller_poll(r),
            SimEvent::RouterPoll => self.handle_router_poll(),
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn now(&self) -> f64 {
        self.scheduler.time().as_units()
    }

    fn sample(&mut self, tm: TimeModelIdx, ctx: &SampleContext) -> f64 {
        self.time_models[tm.idx()].sample(ctx)
    }

    fn expected(&self, tm: TimeModelIdx, ctx: &SampleContext) -> f64 {
        self.time_models[tm.idx()].expected(ctx)
    }

    fn invariant(&self, message: impl Into<String>) -> SimError {
        SimError::Invariant {
            message: message.into(),
            seed: self.seed,
            time: self.now(),
            event_index: self.event_index,
        }
    }

    fn schedule_poll(&mut self, ri: ResourceIdx) {
        let r = &mut self.resources[ri.idx()];
        if !r.poll_scheduled {
            r.poll_scheduled = true;
            self.scheduler.schedule_now(SimEvent::ControllerPoll(ri));
        }
    }

    fn schedule_router_poll(&mut self) {
        if self.router.has_waiting() && !self.router.poll_scheduled {
            self.router.poll_scheduled = true;
            self.scheduler.schedule_now(SimEvent::RouterPoll);
        }
    }

    /// A slot in `q` was freed: re-offer waiting products, wake resources
    /// blocked on it as an output buffer, and unblock sources feeding it.
    fn notify_queue_freed(&mut self, q: QueueIdx) {
        self.schedule_router_poll();
        let owners = self.queue_output_owners[q.idx()].clone();
        for ri in owners {
            self.schedule_poll(ri);
        }
        let sources = self.queue_sources[q.idx()].clone();
        for si in sources {
            if self.sources[si.idx()].blocked.is_some() {
                self.scheduler.schedule_now(SimEvent::SourceArrival(si));
            }
        }
    }

    fn site_id(&self, site: SiteRef) -> &str {
        match site {
            SiteRef::Source(s) => &self.sources[s.idx()].id,
            SiteRef::Resource(r) => &self.resources[r.idx()].id,
            SiteRef::Sink(k) => &self.sinks[k.idx()].id,
            SiteRef::Transport(r) => &self.resources[r.idx()].id,
        }
    }

    /// Pickup coordinates of a site (output side for resources).
    fn site_output_point(&self, site: SiteRef) -> [f64; 2] {
        match site {
            SiteRef::Source(s) => self.sources[s.idx()].location,
            SiteRef::Resource(r) => self.resources[r.idx()].output_point(),
            SiteRef::Sink(k) => self.sinks[k.idx()].location,
            SiteRef::Transport(r) => self.resources[r.idx()].position,
        }
    }

    fn target_point(&self, target: TargetRef) -> [f64; 2] {
        match target {
            TargetRef::ResourceInput { resource, .. } => self.resources[resource.idx()].input_point(),
            TargetRef::SinkInput { sink, .. } => self.sinks[sink.idx()].location,
        }
    }

    fn target_id(&self, target: TargetRef) -> &str {
        match target {
            TargetRef::ResourceInput { resource, .. } => &self.resources[resource.idx()].id,
            TargetRef::SinkInput { sink, .. } => &self.sinks[sink.idx()].id,
        }
    }

    // ------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------

    fn schedule_next_arrival(&mut self, si: SourceIdx) {
        let tm = self.sources[si.idx()].time_model;
        let now = self.now();
        let delta = self.sample(tm, &SampleContext::at(now));
        if !delta.is_finite() {
            // One-shot schedule exhausted: the source retires.
            return;
        }
        // A zero inter-arrival would stall the clock; the smallest
        // representable step keeps the run finite.
        let delay = SimTime::from_units(delta).max(SimTime::from_nanos(1));
        self.scheduler.schedule(delay, SimEvent::SourceArrival(si));
    }

    fn handle_source_arrival(&mut self, si: SourceIdx) -> SimResult<()> {
        if let Some(p) = self.sources[si.idx()].blocked {
            return self.try_place_product(si, p);
        }

        // Stamp a fresh product from the source's prototype.
        let (proto_idx, product_type, routing) = {
            let src = &self.sources[si.idx()];
            (src.proto, src.product_type.clone(), src.routing)
        };
        let counter = self.product_counters.entry(product_type.clone()).or_insert(0);
        *counter += 1;
        let product_id = format!("{}_{}", product_type, counter);

        let proto = &self.plan_protos[proto_idx];
        let product = ProductRuntime {
            id: product_id,
            product_type,
            plan: proto.plan.clone(),
            transport_process: proto.transport_process,
            site: SiteRef::Source(si),
            queue: None,
            completed_steps: 0,
            pending_process: None,
            created_at: self.now(),
            finished_at: None,
            waiting_for_route: false,
            routing,
        };
        let p = ProductIdx(self.products.len() as u32);
        self.products.push(product);
        self.sources[si.idx()].created += 1;

        self.try_place_product(si, p)
    }

    /// Place `p` into one of the source's output queues. While every queue
    /// is full the source holds the product and its arrival loop pauses; a
    /// freed slot retries.
    fn try_place_product(&mut self, si: SourceIdx, p: ProductIdx) -> SimResult<()> {
        let slot = {
            let src = &self.sources[si.idx()];
            src.output_queues
                .iter()
                .copied()
                .find(|q| self.queues[q.idx()].has_space())
        };
        match slot {
            Some(q) => {
                if self.queues[q.idx()].push(p) != QueueVerdict::Accepted {
                    return Err(self.invariant(format!(
                        "queue '{}' rejected a put after reporting space",
                        self.queues[q.idx()].id
                    )));
                }
                self.products[p.idx()].queue = Some(q);
                self.sources[si.idx()].blocked = None;
                let now = self.now();
                self.logger.created_product(
                    now,
                    &self.sources[si.idx()].id,
                    &self.products[p.idx()].id,
                );
                self.wip += 1;
                self.product_continue(p)?;
                self.schedule_next_arrival(si);
                Ok(())
            }
            None => {
                self.sources[si.idx()].blocked = Some(p);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Products and routing
    // ------------------------------------------------------------------

    /// Decide the product's next step and hand it to the router.
    fn product_continue(&mut self, p: ProductIdx) -> SimResult<()> {
        let next = self.products[p.idx()].plan.next_ready();
        self.products[p.idx()].pending_process = next;
        if !self.try_route(p)? {
            self.products[p.idx()].waiting_for_route = true;
            self.router.park(p);
        }
        Ok(())
    }

    /// The concrete process `resource` would run for a plan entry, or `None`
    /// when the resource cannot serve it.
    fn match_plan_process(&self, r: &ResourceRuntime, plan_proc: ProcessIdx) -> Option<ProcessIdx> {
        match &self.processes[plan_proc.idx()].kind {
            ProcessFlavor::RequiredCapability(tag) => r
                .slots
                .iter()
                .map(|s| s.process)
                .find(|&offered| {
                    matches!(
                        &self.processes[offered.idx()].kind,
                        ProcessFlavor::Capability(t) if t == tag
                    )
                }),
            _ => r.provides(plan_proc).then_some(plan_proc),
        }
    }

    /// Try to pick and reserve a target for the product's pending process
    /// (or its sink) and submit the transport request. `Ok(false)` means no
    /// feasible candidate right now.
    fn try_route(&mut self, p: ProductIdx) -> SimResult<bool> {
        if self.products[p.idx()].finished_at.is_some() {
            return Ok(true);
        }
        let pending = self.products[p.idx()].pending_process;
        let routing = self.products[p.idx()].routing;
        let site = self.products[p.idx()].site;
        let transport_process = self.products[p.idx()].transport_process;

        // A link transport pins both endpoints of the move.
        let link = match &self.processes[transport_process.idx()].kind {
            ProcessFlavor::LinkTransport { from, to } => Some((from.clone(), to.clone())),
            _ => None,
        };
        if let Some((from, _)) = &link {
            if self.site_id(site) != from {
                // The product's transport cannot start here; it stays parked
                // until the configuration is fixed. Routing treats this as
                // infeasible rather than failing the run.
                return Ok(false);
            }
        }

        let choice = match pending {
            Some(plan_proc) => {
                let mut found: Vec<(ResourceIdx, ProcessIdx, QueueIdx)> = Vec::new();
                let mut candidates: Vec<RouteCandidate> = Vec::new();
                for r in &self.resources {
                    if r.is_transport() {
                        continue;
                    }
                    let Some(concrete) = self.match_plan_process(r, plan_proc) else {
                        continue;
                    };
                    if let Some((_, to)) = &link {
                        if &r.id != to {
                            continue;
                        }
                    }
                    let Some(&q) = r
                        .input_queues
                        .iter()
                        .find(|q| self.queues[q.idx()].has_space())
                    else {
                        continue;
                    };
                    candidates.push(RouteCandidate {
                        id: r.id.clone(),
                        load: self.queues[q.idx()].load(),
                        arrival_rank: found.len(),
                    });
                    found.push((r.idx, concrete, q));
                }
                router::choose(routing, &candidates, &mut self.router.rng).map(|i| {
                    let (ri, concrete, q) = found[i];
                    (
                        TargetRef::ResourceInput {
                            resource: ri,
                            queue: q,
                        },
                        Some(concrete),
                        Some(plan_proc),
                    )
                })
            }
            None => {
                let product_type = self.products[p.idx()].product_type.clone();
                let mut found: Vec<(SinkIdx, QueueIdx)> = Vec::new();
                let mut candidates: Vec<RouteCandidate> = Vec::new();
                for sink in &self.sinks {
                    if sink.product_type != product_type {
                        continue;
                    }
                    if let Some((_, to)) = &link {
                        if &sink.id != to {
                            continue;
                        }
                    }
                    let Some(&q) = sink
                        .input_queues
                        .iter()
                        .find(|q| self.queues[q.idx()].has_space())
                    else {
                        continue;
                    };
                    candidates.push(RouteCandidate {
                        id: sink.id.clone(),
                        load: self.queues[q.idx()].load(),
                        arrival_rank: found.len(),
                    });
                    found.push((sink.idx, q));
                }
                router::choose(routing, &candidates, &mut self.router.rng).map(|i| {
                    let (k, q) = found[i];
                    (TargetRef::SinkInput { sink: k, queue: q }, None, None)
                })
            }
        };

        let Some((target, next_process, plan_process)) = choice else {
            return Ok(false);
        };

        // Routers never choose a full target: the slot is promised here,
        // before any controller sees the request.
        let reservation = self.queues[target.queue().idx()]
            .reserve(&mut self.next_reservation)
            .map_err(|_| {
                self.invariant(format!(
                    "routed to queue '{}' without space",
                    self.queues[target.queue().idx()].id
                ))
            })?;

        self.submit_transport_request(p, target, reservation, next_process, plan_process)?;
        self.products[p.idx()].waiting_for_route = false;
        Ok(true)
    }

    fn submit_transport_request(
        &mut self,
        p: ProductIdx,
        target: TargetRef,
        reservation: ReservationId,
        next_process: Option<ProcessIdx>,
        plan_process: Option<ProcessIdx>,
    ) -> SimResult<()> {
        let transport_process = self.products[p.idx()].transport_process;
        let routing = self.products[p.idx()].routing;
        let origin_site = self.products[p.idx()].site;
        let Some(origin_queue) = self.products[p.idx()].queue else {
            return Err(self.invariant(format!(
                "product '{}' requested transport while not in a queue",
                self.products[p.idx()].id
            )));
        };

        // Transport resources providing the product's transport process, in
        // configuration order; load compares queued work.
        let mut found: Vec<ResourceIdx> = Vec::new();
        let mut candidates: Vec<RouteCandidate> = Vec::new();
        for r in &self.resources {
            if !r.is_transport() || !r.provides(transport_process) {
                continue;
            }
            candidates.push(RouteCandidate {
                id: r.id.clone(),
                load: r.pending.len() + r.active,
                arrival_rank: found.len(),
            });
            found.push(r.idx);
        }
        let Some(i) = router::choose(routing, &candidates, &mut self.router.rng) else {
            return Err(self.invariant(format!(
                "no transport resource provides process '{}'",
                self.processes[transport_process.idx()].id
            )));
        };
        let carrier = found[i];

        self.next_request_seq += 1;
        let request = Request {
            seq: self.next_request_seq,
            kind: RequestKind::Transport,
            product: p,
            process: transport_process,
            plan_process,
            resource: carrier,
            origin_queue,
            origin_site,
            target: Some(target),
            reservation: Some(reservation),
            next_process,
        };
        trace!(
            product = %self.products[p.idx()].id,
            carrier = %self.resources[carrier.idx()].id,
            target = %self.target_id(target),
            "transport routed"
        );
        self.resources[carrier.idx()].pending.push(request);
        self.schedule_poll(carrier);
        Ok(())
    }

    fn handle_router_poll(&mut self) -> SimResult<()> {
        self.router.poll_scheduled = false;
        for p in self.router.drain_waiting() {
            if !self.try_route(p)? {
                self.router.park(p);
            } else {
                self.products[p.idx()].waiting_for_route = false;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Controllers
    // ------------------------------------------------------------------

    /// Re-evaluate one resource: start every executable request capacity
    /// allows, or begin a setup when only incompatible work is waiting.
    fn handle_controller_poll(&mut self, ri: ResourceIdx) -> SimResult<()> {
        self.resources[ri.idx()].poll_scheduled = false;
        if self.resources[ri.idx()].is_down() {
            return Ok(());
        }
        loop {
            {
                let r = &self.resources[ri.idx()];
                if r.setup_run.is_some() || r.active >= r.capacity || r.pending.is_empty() {
                    return Ok(());
                }
            }
            let (ready, needs_setup, stale) = self.classify_requests(ri);

            if !stale.is_empty() {
                // Contract: a request whose reservation is no longer held is
                // returned to the router for re-routing.
                for &i in stale.iter().rev() {
                    let req = self.resources[ri.idx()].pending.remove(i);
                    debug!(
                        product = %self.products[req.product.idx()].id,
                        resource = %self.resources[ri.idx()].id,
                        "reservation lost, re-routing"
                    );
                    self.product_continue(req.product)?;
                }
                continue;
            }

            // A request whose setup transition could start now is executable
            // too ("compatible or reachable"); the policy ranks it against
            // the compatible ones. Setups only begin on an idle resource.
            let idle = self.resources[ri.idx()].active == 0;
            let candidates: Vec<usize> = if idle {
                let mut all = ready.clone();
                all.extend(needs_setup.iter().copied());
                all
            } else {
                ready.clone()
            };
            if candidates.is_empty() {
                return Ok(());
            }
            let pick = self.pick(ri, &candidates);
            if needs_setup.contains(&pick) {
                self.begin_setup(ri, pick)?;
                return Ok(());
            }
            self.dispatch_request(ri, pick)?;
        }
    }

    /// Partition pending requests into executable now, blocked only by a
    /// setup transition, and stale (lost reservation).
    fn classify_requests(&self, ri: ResourceIdx) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        let r = &self.resources[ri.idx()];
        let mut ready = Vec::new();
        let mut needs_setup = Vec::new();
        let mut stale = Vec::new();
        for (i, req) in r.pending.iter().enumerate() {
            if let (Some(target), Some(reservation)) = (req.target, req.reservation) {
                if !self.queues[target.queue().idx()].holds(reservation) {
                    stale.push(i);
                    continue;
                }
            }
            let Some(slot) = r.slot_of(req.process) else {
                continue;
            };
            if !r.slot_has_capacity(slot) || r.process_down(req.process) {
                continue;
            }
            if req.kind == RequestKind::Production {
                // The product must already sit in the input buffer.
                if !self.queues[req.origin_queue.idx()].contains(req.product) {
                    continue;
                }
                // The result must have somewhere to go.
                if !r
                    .output_queues
                    .iter()
                    .any(|q| self.queues[q.idx()].has_space())
                {
                    continue;
                }
            }
            if let Some(tool) = self.processes[req.process.idx()].tool {
                if self.auxiliaries[tool.idx()].available() == 0 {
                    continue;
                }
            }
            if r.setup_needed(req.process).is_some() {
                needs_setup.push(i);
            } else {
                ready.push(i);
            }
        }
        (ready, needs_setup, stale)
    }

    /// Apply the resource's control policy over candidate positions.
    fn pick(&self, ri: ResourceIdx, candidates: &[usize]) -> usize {
        let r = &self.resources[ri.idx()];
        let now = self.now();
        controller::select(r.policy, &r.pending, candidates, |req| {
            let process = &self.processes[req.process.idx()];
            let Some(tm) = process.time_model else {
                return 0.0;
            };
            if req.is_transport() {
                // Empty move to the pickup plus the loaded move.
                let origin = self.site_output_point(req.origin_site);
                let target = req
                    .target
                    .map(|t| self.target_point(t))
                    .unwrap_or(origin);
                let deadhead =
                    self.expected(tm, &SampleContext::travel(now, r.position, origin));
                let loaded = self.expected(tm, &SampleContext::travel(now, origin, target));
                deadhead + loaded
            } else {
                self.expected(tm, &SampleContext::at(now))
            }
        })
        .expect("candidates are non-empty")
    }

    fn dispatch_request(&mut self, ri: ResourceIdx, pending_index: usize) -> SimResult<()> {
        let request = self.resources[ri.idx()].pending.remove(pending_index);
        match request.kind {
            RequestKind::Production => self.dispatch_production(ri, request),
            RequestKind::Transport => self.dispatch_transport(ri, request),
        }
    }

    // ------------------------------------------------------------------
    // Production activities
    // ------------------------------------------------------------------

    fn dispatch_production(&mut self, ri: ResourceIdx, request: Request) -> SimResult<()> {
        let now = self.now();
        let process = request.process;
        let slot = self.resources[ri.idx()]
            .slot_of(process)
            .ok_or_else(|| self.invariant("dispatched process not provided by resource"))?;

        // Lot formation: group compatible pending requests while the shared
        // target queue can promise slots.
        let out_queue = {
            let r = &self.resources[ri.idx()];
            r.output_queues
                .iter()
                .copied()
                .find(|q| self.queues[q.idx()].has_space())
                .ok_or_else(|| self.invariant("dispatch without output space"))?
        };
        let max_lot = self.processes[process.idx()].max_lot_size.max(1) as usize;
        let mut lot = vec![request];
        if max_lot > 1 {
            let mut free_slots = self.queues[out_queue.idx()]
                .capacity()
                .map(|c| c.saturating_sub(self.queues[out_queue.idx()].load()))
                .unwrap_or(usize::MAX);
            // One slot is consumed by the selected request itself.
            free_slots = free_slots.saturating_sub(1);
            let mut extra = Vec::new();
            {
                let r = &self.resources[ri.idx()];
                for (i, req) in r.pending.iter().enumerate() {
                    if lot.len() + extra.len() >= max_lot || free_slots == 0 {
                        break;
                    }
                    if req.kind == RequestKind::Production
                        && req.process == process
                        && self.queues[req.origin_queue.idx()].contains(req.product)
                    {
                        extra.push(i);
                        free_slots -= 1;
                    }
                }
            }
            for &i in extra.iter().rev() {
                lot.push(self.resources[ri.idx()].pending.remove(i));
            }
            // Preserve arrival order inside the lot.
            lot.sort_by_key(|req| req.seq);
        }

        // Take the members out of the input buffer and promise their output
        // slots.
        let mut members = Vec::with_capacity(lot.len());
        let mut member_plans = Vec::with_capacity(lot.len());
        let mut outputs = Vec::with_capacity(lot.len());
        let mut freed = Vec::new();
        for req in &lot {
            if !self.queues[req.origin_queue.idx()].take(req.product) {
                return Err(self.invariant(format!(
                    "product '{}' missing from queue '{}' at dispatch",
                    self.products[req.product.idx()].id,
                    self.queues[req.origin_queue.idx()].id
                )));
            }
            freed.push(req.origin_queue);
            self.products[req.product.idx()].queue = None;
            let reservation = self.queues[out_queue.idx()]
                .reserve(&mut self.next_reservation)
                .map_err(|_| self.invariant("lot outgrew its shared target queue"))?;
            members.push(req.product);
            member_plans.push(req.plan_process);
            outputs.push((out_queue, reservation));
        }

        let tool = self.processes[process.idx()].tool;
        if let Some(t) = tool {
            let at = self.resources[ri.idx()].location;
            if self.auxiliaries[t.idx()].acquire_nearest(at).is_none() {
                return Err(self.invariant(format!(
                    "auxiliary '{}' exhausted at dispatch",
                    self.auxiliaries[t.idx()].id
                )));
            }
        }

        self.resources[ri.idx()].slots[slot].active += 1;
        self.resources[ri.idx()].active += 1;
        // The first configuration is adopted for free; an undeclared setup
        // direction switches without cost.
        self.resources[ri.idx()].current_setup = Some(process);

        // One duration sample covers the whole lot.
        let tm = self.processes[process.idx()]
            .time_model
            .ok_or_else(|| self.invariant("production process without time model"))?;
        let duration = self.sample(tm, &SampleContext::at(now));
        let ends_at = self.scheduler.time() + SimTime::from_units(duration);

        for &m in &members {
            self.logger.start_state(
                now,
                &self.resources[ri.idx()].id,
                &self.processes[process.idx()].id,
                StateTypeKind::Production,
                Some(&self.products[m.idx()].id),
                ends_at.as_units(),
            );
        }

        self.next_activity += 1;
        let id = self.next_activity;
        let key = self.scheduler.schedule_at(ends_at, SimEvent::ActivityDone(id));
        self.activities.insert(
            id,
            ActivityRun {
                id,
                resource: ri,
                process,
                slot,
                members,
                member_plans,
                flavor: ActivityFlavor::Production,
                state_id: self.processes[process.idx()].id.clone(),
                ends_at,
                key,
                remaining: None,
                paused_by: 0,
                outputs,
                tool,
            },
        );

        for q in freed {
            self.notify_queue_freed(q);
        }
        Ok(())
    }

    fn finish_production(&mut self, activity: ActivityRun) -> SimResult<()> {
        let now = self.now();
        let ri = activity.resource;
        for ((&m, plan), &(q_out, reservation)) in activity
            .members
            .iter()
            .zip(&activity.member_plans)
            .zip(&activity.outputs)
        {
            self.logger.end_state(
                now,
                &self.resources[ri.idx()].id,
                &activity.state_id,
                StateTypeKind::Production,
                Some(&self.products[m.idx()].id),
            );
            self.queues[q_out.idx()]
                .commit(reservation, m)
                .map_err(|e| self.invariant(e))?;
            let product = &mut self.products[m.idx()];
            product.queue = Some(q_out);
            product.site = SiteRef::Resource(ri);
            if let Some(pp) = plan {
                product.plan.complete(*pp);
                product.completed_steps += 1;
            }
            product.pending_process = None;
        }
        if let Some(t) = activity.tool {
            let at = self.resources[ri.idx()].location;
            self.auxiliaries[t.idx()].release_nearest(at);
        }
        self.resources[ri.idx()].slots[activity.slot].active -= 1;
        self.resources[ri.idx()].active -= 1;

        for &m in &activity.members {
            self.product_continue(m)?;
        }
        self.schedule_poll(ri);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transport activities
    // ------------------------------------------------------------------

    fn dispatch_transport(&mut self, ri: ResourceIdx, request: Request) -> SimResult<()> {
        let slot = self.resources[ri.idx()]
            .slot_of(request.process)
            .ok_or_else(|| self.invariant("dispatched transport not provided by resource"))?;
        self.resources[ri.idx()].slots[slot].active += 1;
        self.resources[ri.idx()].active += 1;
        self.resources[ri.idx()].current_setup = Some(request.process);

        let pickup = self.site_output_point(request.origin_site);
        if self.resources[ri.idx()].position != pickup {
            self.start_empty_leg(ri, slot, request)
        } else {
            self.start_loaded_leg(ri, slot, request)
        }
    }

    fn start_empty_leg(&mut self, ri: ResourceIdx, slot: usize, request: Request) -> SimResult<()> {
        let now = self.now();
        let process = request.process;
        let tm = self.processes[process.idx()]
            .time_model
            .ok_or_else(|| self.invariant("transport process without time model"))?;
        let from = self.resources[ri.idx()].position;
        let to = self.site_output_point(request.origin_site);
        let duration = self.sample(tm, &SampleContext::travel(now, from, to));
        let ends_at = self.scheduler.time() + SimTime::from_units(duration);

        let origin_label = self.resources[ri.idx()].position_site.clone();
        let target_label = self.site_id(request.origin_site).to_string();
        let product_id = self.products[request.product.idx()].id.clone();
        self.logger.start_transport(
            now,
            &self.resources[ri.idx()].id,
            &self.processes[process.idx()].id,
            Some(&product_id),
            ends_at.as_units(),
            &origin_label,
            &target_label,
            true,
        );

        self.next_activity += 1;
        let id = self.next_activity;
        let key = self.scheduler.schedule_at(ends_at, SimEvent::ActivityDone(id));
        self.activities.insert(
            id,
            ActivityRun {
                id,
                resource: ri,
                process,
                slot,
                members: vec![request.product],
                member_plans: vec![request.plan_process],
                state_id: self.processes[process.idx()].id.clone(),
                flavor: ActivityFlavor::TransportEmpty { request },
                ends_at,
                key,
                remaining: None,
                paused_by: 0,
                outputs: Vec::new(),
                tool: None,
            },
        );
        Ok(())
    }

    fn start_loaded_leg(&mut self, ri: ResourceIdx, slot: usize, request: Request) -> SimResult<()> {
        let now = self.now();
        let process = request.process;
        let target = request
            .target
            .ok_or_else(|| self.invariant("transport request without target"))?;

        // Pick the product up.
        if !self.queues[request.origin_queue.idx()].take(request.product) {
            return Err(self.invariant(format!(
                "product '{}' missing from queue '{}' at pickup",
                self.products[request.product.idx()].id,
                self.queues[request.origin_queue.idx()].id
            )));
        }
        let freed = request.origin_queue;
        self.products[request.product.idx()].queue = None;
        self.products[request.product.idx()].site = SiteRef::Transport(ri);

        let tm = self.processes[process.idx()]
            .time_model
            .ok_or_else(|| self.invariant("transport process without time model"))?;
        let from = self.site_output_point(request.origin_site);
        let to = self.target_point(target);
        let mut duration = self.sample(tm, &SampleContext::travel(now, from, to));
        if let Some(loading) = self.processes[process.idx()].loading_time_model {
            duration += self.sample(loading, &SampleContext::at(now));
        }
        if let Some(unloading) = self.processes[process.idx()].unloading_time_model {
            duration += self.sample(unloading, &SampleContext::at(now));
        }
        let ends_at = self.scheduler.time() + SimTime::from_units(duration);

        let origin_label = self.site_id(request.origin_site).to_string();
        let target_label = self.target_id(target).to_string();
        let product_id = self.products[request.product.idx()].id.clone();
        self.logger.start_transport(
            now,
            &self.resources[ri.idx()].id,
            &self.processes[process.idx()].id,
            Some(&product_id),
            ends_at.as_units(),
            &origin_label,
            &target_label,
            false,
        );

        self.next_activity += 1;
        let id = self.next_activity;
        let key = self.scheduler.schedule_at(ends_at, SimEvent::ActivityDone(id));
        self.activities.insert(
            id,
            ActivityRun {
                id,
                resource: ri,
                process,
                slot,
                members: vec![request.product],
                member_plans: vec![request.plan_process],
                state_id: self.processes[process.idx()].id.clone(),
                flavor: ActivityFlavor::TransportLoaded { request },
                ends_at,
                key,
                remaining: None,
                paused_by: 0,
                outputs: Vec::new(),
                tool: None,
            },
        );
        self.notify_queue_freed(freed);
        Ok(())
    }

    fn finish_transport_empty(&mut self, activity: ActivityRun) -> SimResult<()> {
        let now = self.now();
        let ri = activity.resource;
        let ActivityFlavor::TransportEmpty { request } = activity.flavor else {
            return Err(self.invariant("finish_transport_empty on wrong flavor"));
        };
        self.logger.end_state(
            now,
            &self.resources[ri.idx()].id,
            &activity.state_id,
            StateTypeKind::Transport,
            Some(&self.products[request.product.idx()].id),
        );
        // The carrier now stands at the pickup point.
        let pickup = self.site_output_point(request.origin_site);
        let pickup_site = self.site_id(request.origin_site).to_string();
        let r = &mut self.resources[ri.idx()];
        r.position = pickup;
        r.position_site = pickup_site;
        self.start_loaded_leg(ri, activity.slot, request)
    }

    fn finish_transport_loaded(&mut self, activity: ActivityRun) -> SimResult<()> {
        let now = self.now();
        let ri = activity.resource;
        let ActivityFlavor::TransportLoaded { request } = activity.flavor else {
            return Err(self.invariant("finish_transport_loaded on wrong flavor"));
        };
        let target = request
            .target
            .ok_or_else(|| self.invariant("loaded transport without target"))?;
        let reservation = request
            .reservation
            .ok_or_else(|| self.invariant("loaded transport without reservation"))?;
        let p = request.product;

        self.logger.end_state(
            now,
            &self.resources[ri.idx()].id,
            &activity.state_id,
            StateTypeKind::Transport,
            Some(&self.products[p.idx()].id),
        );

        // Drop the product off at the promised slot.
        let drop_point = self.target_point(target);
        let drop_site = self.target_id(target).to_string();
        {
            let r = &mut self.resources[ri.idx()];
            r.position = drop_point;
            r.position_site = drop_site;
        }
        self.queues[target.queue().idx()]
            .commit(reservation, p)
            .map_err(|e| self.invariant(e))?;

        self.resources[ri.idx()].slots[activity.slot].active -= 1;
        self.resources[ri.idx()].active -= 1;

        match target {
            TargetRef::ResourceInput { resource, queue } => {
                self.products[p.idx()].queue = Some(queue);
                self.products[p.idx()].site = SiteRef::Resource(resource);
                let next_process = request.next_process.ok_or_else(|| {
                    self.invariant("transport to a resource without a follow-up process")
                })?;
                self.next_request_seq += 1;
                let production = Request {
                    seq: self.next_request_seq,
                    kind: RequestKind::Production,
                    product: p,
                    process: next_process,
                    plan_process: request.plan_process,
                    resource,
                    origin_queue: queue,
                    origin_site: SiteRef::Resource(resource),
                    target: None,
                    reservation: None,
                    next_process: None,
                };
                self.resources[resource.idx()].pending.push(production);
                self.schedule_poll(resource);
            }
            TargetRef::SinkInput { sink, queue } => {
                // Sinks consume immediately; the slot frees again.
                if !self.queues[queue.idx()].take(p) {
                    return Err(self.invariant("sink failed to consume delivered product"));
                }
                self.logger
                    .finished_product(now, &self.sinks[sink.idx()].id, &self.products[p.idx()].id);
                self.products[p.idx()].queue = None;
                self.products[p.idx()].site = SiteRef::Sink(sink);
                self.products[p.idx()].finished_at = Some(now);
                self.sinks[sink.idx()].finished += 1;
                self.wip -= 1;
                self.notify_queue_freed(queue);
            }
        }
        self.schedule_poll(ri);
        Ok(())
    }

    fn handle_activity_done(&mut self, id: u64) -> SimResult<()> {
        let Some(activity) = self.activities.remove(&id) else {
            return Err(self.invariant(format!("completion wakeup for unknown activity {id}")));
        };
        match activity.flavor {
            ActivityFlavor::Production => self.finish_production(activity),
            ActivityFlavor::TransportEmpty { .. } => self.finish_transport_empty(activity),
            ActivityFlavor::TransportLoaded { .. } => self.finish_transport_loaded(activity),
        }
    }

    // ------------------------------------------------------------------
    // Setups
    // ------------------------------------------------------------------

    fn begin_setup(&mut self, ri: ResourceIdx, pending_index: usize) -> SimResult<()> {
        let now = self.now();
        let process = self.resources[ri.idx()].pending[pending_index].process;
        let transition = self.resources[ri.idx()]
            .setup_needed(process)
            .ok_or_else(|| self.invariant("begin_setup without a transition"))?;
        let (state_id, tm) = {
            let t = &self.resources[ri.idx()].setups[transition];
            (t.state_id.clone(), t.time_model)
        };
        let duration = self.sample(tm, &SampleContext::at(now));
        let ends_at = self.scheduler.time() + SimTime::from_units(duration);
        self.logger.start_state(
            now,
            &self.resources[ri.idx()].id,
            &state_id,
            StateTypeKind::Setup,
            None,
            ends_at.as_units(),
        );
        let key = self.scheduler.schedule_at(ends_at, SimEvent::SetupDone(ri));
        self.resources[ri.idx()].setup_run = Some(SetupRun {
            state_id,
            target: process,
            ends_at,
            key,
            remaining: None,
            paused_by: 0,
        });
        Ok(())
    }

    fn handle_setup_done(&mut self, ri: ResourceIdx) -> SimResult<()> {
        let now = self.now();
        let run = self.resources[ri.idx()]
            .setup_run
            .take()
            .ok_or_else(|| self.invariant("setup completion without a setup run"))?;
        self.logger.end_state(
            now,
            &self.resources[ri.idx()].id,
            &run.state_id,
            StateTypeKind::Setup,
            None,
        );
        self.resources[ri.idx()].current_setup = Some(run.target);
        self.schedule_poll(ri);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Breakdowns
    // ------------------------------------------------------------------

    fn pause_activity(&mut self, id: u64) {
        let now = self.scheduler.time();
        let Some(activity) = self.activities.get_mut(&id) else {
            return;
        };
        activity.paused_by += 1;
        if activity.paused_by > 1 {
            return;
        }
        self.scheduler.cancel(activity.key);
        activity.remaining = Some((activity.ends_at - now).as_secs_f64());
        let state_type = activity.state_type();
        let resource_id = self.resources[activity.resource.idx()].id.clone();
        let state_id = activity.state_id.clone();
        let members: Vec<String> = activity
            .members
            .iter()
            .map(|&m| self.products[m.idx()].id.clone())
            .collect();
        let now_units = now.as_units();
        for m in &members {
            self.logger
                .start_interrupt(now_units, &resource_id, &state_id, state_type, Some(m));
        }
    }

    fn resume_activity(&mut self, id: u64) {
        let now = self.scheduler.time();
        let Some(activity) = self.activities.get_mut(&id) else {
            return;
        };
        activity.paused_by = activity.paused_by.saturating_sub(1);
        if activity.paused_by > 0 {
            return;
        }
        let remaining = activity.remaining.take().unwrap_or(0.0);
        let ends_at = now + SimTime::from_units(remaining);
        activity.ends_at = ends_at;
        let state_type = activity.state_type();
        let resource_id = self.resources[activity.resource.idx()].id.clone();
        let state_id = activity.state_id.clone();
        let members: Vec<String> = activity
            .members
            .iter()
            .map(|&m| self.products[m.idx()].id.clone())
            .collect();
        activity.key = self.scheduler.schedule_at(ends_at, SimEvent::ActivityDone(id));
        let now_units = now.as_units();
        for m in &members {
            self.logger.end_interrupt(
                now_units,
                &resource_id,
                &state_id,
                state_type,
                Some(m),
                ends_at.as_units(),
            );
        }
    }

    fn handle_breakdown_begin(&mut self, ri: ResourceIdx, mi: usize) -> SimResult<()> {
        let now = self.now();
        let (scope, state_id, repair_model) = {
            let m = &self.resources[ri.idx()].breakdowns[mi];
            (m.scope, m.state_id.clone(), m.repair_model)
        };
        let repair = self.sample(repair_model, &SampleContext::at(now));
        let ends_at = self.scheduler.time() + SimTime::from_units(repair);

        // Preempt the affected in-flight activities.
        let affected: Vec<u64> = self
            .activities
            .values()
            .filter(|a| {
                a.resource == ri
                    && match scope {
                        BreakdownScope::Resource => true,
                        BreakdownScope::Process(p) => a.process == p,
                    }
            })
            .map(|a| a.id)
            .collect();
        for &id in &affected {
            self.pause_activity(id);
        }

        // Setups are interrupted by both breakdown flavors.
        let paused_setup = {
            let now_t = self.scheduler.time();
            let mut cancel_key = None;
            let r = &mut self.resources[ri.idx()];
            let paused = if let Some(run) = r.setup_run.as_mut() {
                run.paused_by += 1;
                if run.paused_by == 1 {
                    cancel_key = Some(run.key);
                    run.remaining = Some((run.ends_at - now_t).as_secs_f64());
                }
                true
            } else {
                false
            };
            if let Some(key) = cancel_key {
                self.scheduler.cancel(key);
                let state_id = self.resources[ri.idx()]
                    .setup_run
                    .as_ref()
                    .map(|run| run.state_id.clone())
                    .unwrap_or_default();
                let resource_id = self.resources[ri.idx()].id.clone();
                self.logger
                    .start_interrupt(now, &resource_id, &state_id, StateTypeKind::Setup, None);
            }
            paused
        };

        let state_type = match scope {
            BreakdownScope::Resource => {
                self.resources[ri.idx()].down_count += 1;
                StateTypeKind::Breakdown
            }
            BreakdownScope::Process(_) => StateTypeKind::ProcessBreakdown,
        };
        {
            let m = &mut self.resources[ri.idx()].breakdowns[mi];
            m.down = true;
            m.paused_activities = affected;
            m.paused_setup = paused_setup;
        }
        self.logger.start_state(
            now,
            &self.resources[ri.idx()].id,
            &state_id,
            state_type,
            None,
            ends_at.as_units(),
        );
        self.scheduler
            .schedule_at(ends_at, SimEvent::RepairDone(ri, mi));
        Ok(())
    }

    fn handle_repair_done(&mut self, ri: ResourceIdx, mi: usize) -> SimResult<()> {
        let now = self.now();
        let (scope, state_id, ttf_model, paused, paused_setup) = {
            let m = &mut self.resources[ri.idx()].breakdowns[mi];
            m.down = false;
            (
                m.scope,
                m.state_id.clone(),
                m.ttf_model,
                std::mem::take(&mut m.paused_activities),
                std::mem::take(&mut m.paused_setup),
            )
        };
        let state_type = match scope {
            BreakdownScope::Resource => {
                self.resources[ri.idx()].down_count -= 1;
                StateTypeKind::Breakdown
            }
            BreakdownScope::Process(_) => StateTypeKind::ProcessBreakdown,
        };
        self.logger.end_state(
            now,
            &self.resources[ri.idx()].id,
            &state_id,
            state_type,
            None,
        );

        for id in paused {
            self.resume_activity(id);
        }
        if paused_setup {
            let now_t = self.scheduler.time();
            let mut resume: Option<(String, SimTime)> = None;
            if let Some(run) = self.resources[ri.idx()].setup_run.as_mut() {
                run.paused_by = run.paused_by.saturating_sub(1);
                if run.paused_by == 0 {
                    let remaining = run.remaining.take().unwrap_or(0.0);
                    let ends_at = now_t + SimTime::from_units(remaining);
                    run.ends_at = ends_at;
                    resume = Some((run.state_id.clone(), ends_at));
                }
            }
            if let Some((setup_state, ends_at)) = resume {
                let key = self.scheduler.schedule_at(ends_at, SimEvent::SetupDone(ri));
                if let Some(run) = self.resources[ri.idx()].setup_run.as_mut() {
                    run.key = key;
                }
                let resource_id = self.resources[ri.idx()].id.clone();
                self.logger.end_interrupt(
                    now,
                    &resource_id,
                    &setup_state,
                    StateTypeKind::Setup,
                    None,
                    ends_at.as_units(),
                );
            }
        }

        // Arm the next failure.
        let ttf = self.sample(ttf_model, &SampleContext::at(now));
        if ttf.is_finite() {
            self.scheduler
                .schedule(SimTime::from_units(ttf), SimEvent::BreakdownBegin(ri, mi));
        }
        self.schedule_poll(ri);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Horizon truncation
    // ------------------------------------------------------------------

    fn truncate_in_flight(&mut self) {
        let horizon = self.horizon.as_units();
        for activity in self.activities.values() {
            let resource_id = &self.resources[activity.resource.idx()].id;
            let state_type = activity.state_type();
            for &m in &activity.members {
                self.logger.truncated(
                    horizon,
                    resource_id,
                    &activity.state_id,
                    state_type,
                    Some(&self.products[m.idx()].id),
                );
            }
        }
        for r in &self.resources {
            if let Some(run) = &r.setup_run {
                self.logger
                    .truncated(horizon, &r.id, &run.state_id, StateTypeKind::Setup, None);
            }
        }
    }
}
