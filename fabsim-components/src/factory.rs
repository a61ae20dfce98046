//! Assembles a runnable [`Simulation`] from a validated configuration.
//!
//! All `ID` cross-references are resolved to typed arena indices here; the
//! event loop never touches strings for lookups. Every time model gets its
//! own random stream keyed by `(seed, "time_model/<ID>")`, the router gets
//! `(seed, "router")`.

use std::collections::HashMap;

use fabsim_core::dists::{
    DistanceModel, DistributionFunction, FunctionModel, Metric, SampleModel, ScheduleModel,
};
use fabsim_core::{SimRng, SimResult, SimTime, TimeModel};
use fabsim_model::{
    DistributionFunctionData, MetricData, ProcessData, ProcessPlanData, ProductionSystemData,
    StateData,
};

use crate::auxiliary::{AuxiliaryPool, StorageSlot};
use crate::driver::{
    PlanProto, ProcessFlavor, ProcessRuntime, Simulation, SinkRuntime, SourceRuntime,
};
use crate::event_log::EventLogger;
use crate::ids::{
    AuxiliaryIdx, ProcessIdx, QueueIdx, ResourceIdx, SinkIdx, SourceIdx, TimeModelIdx,
};
use crate::product::PlanRuntime;
use crate::queue::ProductQueue;
use crate::resource::{BreakdownMachine, BreakdownScope, ResourceRuntime, SetupTransition};
use crate::router::Router;

/// Build with the seed embedded in the configuration.
pub fn build(config: &ProductionSystemData) -> SimResult<Simulation> {
    build_with_seed(config, config.seed)
}

/// Build with an explicit seed override.
pub fn build_with_seed(config: &ProductionSystemData, seed: u64) -> SimResult<Simulation> {
    fabsim_model::validate(config)?;

    let tm_index: HashMap<&str, TimeModelIdx> = config
        .time_model_data
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id(), TimeModelIdx(i as u32)))
        .collect();
    let process_index: HashMap<&str, ProcessIdx> = config
        .process_data
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id(), ProcessIdx(i as u32)))
        .collect();
    let queue_index: HashMap<&str, QueueIdx> = config
        .queue_data
        .iter()
        .enumerate()
        .map(|(i, q)| (q.id.as_str(), QueueIdx(i as u32)))
        .collect();
    let auxiliary_index: HashMap<&str, AuxiliaryIdx> = config
        .auxiliary_data
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id.as_str(), AuxiliaryIdx(i as u32)))
        .collect();

    let time_models = build_time_models(config, seed)?;
    let processes = build_processes(config, &tm_index, &auxiliary_index);
    let queues: Vec<ProductQueue> = config
        .queue_data
        .iter()
        .enumerate()
        .map(|(i, q)| ProductQueue::new(&q.id, QueueIdx(i as u32), q.capacity, q.location))
        .collect();
    let auxiliaries = build_auxiliaries(config, &queue_index, &queues);
    let resources = build_resources(config, &tm_index, &process_index, &queue_index);
    let (plan_protos, proto_by_type) = build_plan_protos(config, &process_index);

    let sinks: Vec<SinkRuntime> = config
        .sink_data
        .iter()
        .enumerate()
        .map(|(i, s)| SinkRuntime {
            idx: SinkIdx(i as u32),
            id: s.id.clone(),
            location: s.location,
            product_type: s.product_type.clone(),
            input_queues: s.input_queues.iter().map(|q| queue_index[q.as_str()]).collect(),
            finished: 0,
        })
        .collect();

    let sources: Vec<SourceRuntime> = config
        .source_data
        .iter()
        .enumerate()
        .map(|(i, s)| SourceRuntime {
            idx: SourceIdx(i as u32),
            id: s.id.clone(),
            location: s.location,
            product_type: s.product_type.clone(),
            proto: proto_by_type[s.product_type.as_str()],
            time_model: tm_index[s.time_model_id.as_str()],
            routing: s.routing_heuristic,
            output_queues: s.output_queues.iter().map(|q| queue_index[q.as_str()]).collect(),
            blocked: None,
            created: 0,
        })
        .collect();

    // Who to wake when a queue slot frees.
    let mut queue_output_owners = vec![Vec::new(); queues.len()];
    for r in &resources {
        for &q in &r.output_queues {
            queue_output_owners[q.idx()].push(r.idx);
        }
    }
    let mut queue_sources = vec![Vec::new(); queues.len()];
    for s in &sources {
        for &q in &s.output_queues {
            queue_sources[q.idx()].push(s.idx);
        }
    }

    Ok(Simulation {
        seed,
        scheduler: fabsim_core::Scheduler::default(),
        time_models,
        processes,
        queues,
        resources,
        sources,
        sinks,
        products: Vec::new(),
        auxiliaries,
        plan_protos,
        router: Router::new(SimRng::for_stream(seed, "router")),
        logger: EventLogger::new(),
        activities: Default::default(),
        next_activity: 0,
        next_reservation: 0,
        next_request_seq: 0,
        product_counters: HashMap::new(),
        queue_output_owners,
        queue_sources,
        horizon: SimTime::zero(),
        started: false,
        event_index: 0,
        wip: 0,
    })
}

fn build_time_models(config: &ProductionSystemData, seed: u64) -> SimResult<Vec<TimeModel>> {
    config
        .time_model_data
        .iter()
        .map(|data| {
            let rng = SimRng::for_stream(seed, &format!("time_model/{}", data.id()));
            Ok(match data {
                fabsim_model::TimeModelData::Function {
                    id,
                    distribution_function,
                    location,
                    scale,
                    batch_size,
                    ..
                } => TimeModel::Function(FunctionModel::new(
                    id,
                    match distribution_function {
                        DistributionFunctionData::Constant => DistributionFunction::Constant,
                        DistributionFunctionData::Normal => DistributionFunction::Normal,
                        DistributionFunctionData::Lognormal => DistributionFunction::Lognormal,
                        DistributionFunctionData::Exponential => DistributionFunction::Exponential,
                    },
                    *location,
                    *scale,
                    *batch_size as usize,
                    rng,
                )?),
                fabsim_model::TimeModelData::Distance {
                    id,
                    speed,
                    reaction_time,
                    metric,
                    ..
                } => TimeModel::Distance(DistanceModel::new(
                    id,
                    *speed,
                    *reaction_time,
                    match metric {
                        MetricData::Manhattan => Metric::Manhattan,
                        MetricData::Euclidean => Metric::Euclidean,
                    },
                )?),
                fabsim_model::TimeModelData::Schedule {
                    id,
                    timestamps,
                    absolute,
                    cyclic,
                    ..
                } => TimeModel::Schedule(ScheduleModel::new(
                    id,
                    timestamps.clone(),
                    *absolute,
                    *cyclic,
                )?),
                fabsim_model::TimeModelData::Sample {
                    id,
                    samples,
                    randomized,
                    ..
                } => TimeModel::Sample(SampleModel::new(id, samples.clone(), *randomized, rng)?),
            })
        })
        .collect()
}

fn build_processes(
    config: &ProductionSystemData,
    tm_index: &HashMap<&str, TimeModelIdx>,
    auxiliary_index: &HashMap<&str, AuxiliaryIdx>,
) -> Vec<ProcessRuntime> {
    config
        .process_data
        .iter()
        .enumerate()
        .map(|(i, data)| {
            let idx = ProcessIdx(i as u32);
            let time_model = data.time_model_id().map(|t| tm_index[t]);
            let mut loading = None;
            let mut unloading = None;
            let mut max_lot_size = 1;
            let mut tool = None;
            let kind = match data {
                ProcessData::ProductionProcesses {
                    lot_dependency,
                    max_lot_size: lot,
                    tool_dependency,
                    ..
                } => {
                    if *lot_dependency {
                        max_lot_size = lot.unwrap_or(1).max(1);
                    }
                    tool = tool_dependency
                        .as_deref()
                        .map(|t| auxiliary_index[t]);
                    ProcessFlavor::Production
                }
                ProcessData::CapabilityProcess {
                    capability,
                    lot_dependency,
                    max_lot_size: lot,
                    tool_dependency,
                    ..
                } => {
                    if *lot_dependency {
                        max_lot_size = lot.unwrap_or(1).max(1);
                    }
                    tool = tool_dependency
                        .as_deref()
                        .map(|t| auxiliary_index[t]);
                    ProcessFlavor::Capability(capability.clone())
                }
                ProcessData::RequiredCapabilityProcess { capability, .. } => {
                    ProcessFlavor::RequiredCapability(capability.clone())
                }
                ProcessData::TransportProcesses {
                    loading_time_model_id,
                    unloading_time_model_id,
                    ..
                } => {
                    loading = loading_time_model_id.as_deref().map(|t| tm_index[t]);
                    unloading = unloading_time_model_id.as_deref().map(|t| tm_index[t]);
                    ProcessFlavor::Transport
                }
                ProcessData::LinkTransportProcess {
                    from_resource,
                    to_resource,
                    loading_time_model_id,
                    unloading_time_model_id,
                    ..
                } => {
                    loading = loading_time_model_id.as_deref().map(|t| tm_index[t]);
                    unloading = unloading_time_model_id.as_deref().map(|t| tm_index[t]);
                    ProcessFlavor::LinkTransport {
                        from: from_resource.clone(),
                        to: to_resource.clone(),
                    }
                }
            };
            ProcessRuntime {
                idx,
                id: data.id().to_string(),
                kind,
                time_model,
                loading_time_model: loading,
                unloading_time_model: unloading,
                max_lot_size,
                tool,
            }
        })
        .collect()
}

fn build_auxiliaries(
    config: &ProductionSystemData,
    queue_index: &HashMap<&str, QueueIdx>,
    queues: &[ProductQueue],
) -> Vec<AuxiliaryPool> {
    config
        .auxiliary_data
        .iter()
        .enumerate()
        .map(|(i, data)| AuxiliaryPool {
            idx: AuxiliaryIdx(i as u32),
            id: data.id.clone(),
            storages: data
                .storages
                .iter()
                .zip(&data.quantity_in_storages)
                .map(|(storage, &quantity)| {
                    let q = queue_index[storage.as_str()];
                    StorageSlot {
                        queue: q,
                        location: queues[q.idx()].location.unwrap_or([0.0, 0.0]),
                        available: quantity.max(0) as usize,
                    }
                })
                .collect(),
        })
        .collect()
}

fn build_resources(
    config: &ProductionSystemData,
    tm_index: &HashMap<&str, TimeModelIdx>,
    process_index: &HashMap<&str, ProcessIdx>,
    queue_index: &HashMap<&str, QueueIdx>,
) -> Vec<ResourceRuntime> {
    config
        .resource_data
        .iter()
        .enumerate()
        .map(|(i, data)| {
            let slots = data
                .process_ids
                .iter()
                .enumerate()
                .map(|(pi, pid)| crate::resource::ProcessSlot {
                    process: process_index[pid.as_str()],
                    capacity: data.process_capacity(pi).max(1) as usize,
                    active: 0,
                })
                .collect();

            let mut setups = Vec::new();
            let mut breakdowns = Vec::new();
            for state_id in &data.state_ids {
                match config.state(state_id).expect("validated state ref") {
                    StateData::SetupState {
                        id,
                        time_model_id,
                        origin_setup,
                        target_setup,
                        ..
                    } => setups.push(SetupTransition {
                        state_id: id.clone(),
                        origin: process_index[origin_setup.as_str()],
                        target: process_index[target_setup.as_str()],
                        time_model: tm_index[time_model_id.as_str()],
                    }),
                    StateData::BreakDownState {
                        id,
                        time_model_id,
                        repair_time_model_id,
                        ..
                    } => breakdowns.push(BreakdownMachine {
                        state_id: id.clone(),
                        scope: BreakdownScope::Resource,
                        ttf_model: tm_index[time_model_id.as_str()],
                        repair_model: tm_index[repair_time_model_id.as_str()],
                        down: false,
                        paused_activities: Vec::new(),
                        paused_setup: false,
                    }),
                    StateData::ProcessBreakDownState {
                        id,
                        time_model_id,
                        repair_time_model_id,
                        process_id,
                        ..
                    } => breakdowns.push(BreakdownMachine {
                        state_id: id.clone(),
                        scope: BreakdownScope::Process(process_index[process_id.as_str()]),
                        ttf_model: tm_index[time_model_id.as_str()],
                        repair_model: tm_index[repair_time_model_id.as_str()],
                        down: false,
                        paused_activities: Vec::new(),
                        paused_setup: false,
                    }),
                }
            }

            ResourceRuntime {
                idx: ResourceIdx(i as u32),
                id: data.id.clone(),
                controller: data.controller,
                policy: data.control_policy,
                location: data.location,
                input_location: data.input_location,
                output_location: data.output_location,
                capacity: data.capacity.max(1) as usize,
                active: 0,
                slots,
                setups,
                breakdowns,
                current_setup: None,
                setup_run: None,
                down_count: 0,
                pending: Vec::new(),
                poll_scheduled: false,
                input_queues: data
                    .input_queues
                    .iter()
                    .flatten()
                    .map(|q| queue_index[q.as_str()])
                    .collect(),
                output_queues: data
                    .output_queues
                    .iter()
                    .flatten()
                    .map(|q| queue_index[q.as_str()])
                    .collect(),
                position: data.location,
                position_site: data.id.clone(),
            }
        })
        .collect()
}

fn build_plan_protos<'a>(
    config: &'a ProductionSystemData,
    process_index: &HashMap<&str, ProcessIdx>,
) -> (Vec<PlanProto>, HashMap<&'a str, usize>) {
    let mut protos = Vec::new();
    let mut by_type: HashMap<&str, usize> = HashMap::new();
    for product in &config.product_data {
        let plan = match &product.processes {
            ProcessPlanData::Sequence(ids) => PlanRuntime::sequence(
                ids.iter().map(|p| process_index[p.as_str()]).collect(),
            ),
            ProcessPlanData::Precedence(adjacency) => {
                let node_ids = product.processes.process_ids();
                let positions: HashMap<&str, usize> = node_ids
                    .iter()
                    .enumerate()
                    .map(|(i, &id)| (id, i))
                    .collect();
                let successors = node_ids
                    .iter()
                    .map(|id| {
                        adjacency
                            .get(*id)
                            .map(|succs| {
                                succs.iter().map(|s| positions[s.as_str()]).collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect();
                let nodes = node_ids
                    .iter()
                    .map(|id| process_index[*id])
                    .collect();
                PlanRuntime::dag(nodes, successors)
            }
        };
        by_type
            .entry(product.product_type.as_str())
            .or_insert(protos.len());
        protos.push(PlanProto {
            product_type: product.product_type.clone(),
            plan,
            transport_process: process_index[product.transport_process.as_str()],
        });
    }
    (protos, by_type)
}
