//! Configuration validation.
//!
//! Runs before any simulation object is built. Every failure names the
//! offending record: `(record kind, id, reason)`. The first error found is
//! returned; the checks run collection by collection in reference order so
//! the reported record is the root cause, not a downstream symptom.

use std::collections::{BTreeMap, HashSet};

use crate::processes::{ProcessData, ProcessKind};
use crate::products::ProcessPlanData;
use crate::resources::ControllerKind;
use crate::states::StateData;
use crate::system::ProductionSystemData;
use fabsim_core::ConfigError;

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(ConfigError::new(kind, id, "ID must not be empty"));
        }
        if !seen.insert(id) {
            return Err(ConfigError::new(kind, id, "duplicate ID"));
        }
    }
    Ok(())
}

/// Validate a configuration document. Returns the first violation found.
pub fn validate(system: &ProductionSystemData) -> Result<(), ConfigError> {
    check_unique("time_model_data", system.time_model_data.iter().map(|t| t.id()))?;
    check_unique("state_data", system.state_data.iter().map(|s| s.id()))?;
    check_unique("process_data", system.process_data.iter().map(|p| p.id()))?;
    check_unique("queue_data", system.queue_data.iter().map(|q| q.id.as_str()))?;
    check_unique("node_data", system.node_data.iter().map(|n| n.id.as_str()))?;
    check_unique("resource_data", system.resource_data.iter().map(|r| r.id.as_str()))?;
    check_unique("product_data", system.product_data.iter().map(|p| p.id.as_str()))?;
    check_unique("sink_data", system.sink_data.iter().map(|s| s.id.as_str()))?;
    check_unique("source_data", system.source_data.iter().map(|s| s.id.as_str()))?;
    check_unique("auxiliary_data", system.auxiliary_data.iter().map(|a| a.id.as_str()))?;

    let time_models: HashSet<&str> = system.time_model_data.iter().map(|t| t.id()).collect();
    let queues: HashSet<&str> = system.queue_data.iter().map(|q| q.id.as_str()).collect();
    let processes: HashSet<&str> = system.process_data.iter().map(|p| p.id()).collect();
    let resources: HashSet<&str> = system.resource_data.iter().map(|r| r.id.as_str()).collect();
    let nodes: HashSet<&str> = system.node_data.iter().map(|n| n.id.as_str()).collect();
    let auxiliaries: HashSet<&str> = system.auxiliary_data.iter().map(|a| a.id.as_str()).collect();

    validate_states(system, &time_models, &processes)?;
    validate_processes(system, &time_models, &resources, &nodes, &auxiliaries)?;
    validate_queues(system)?;
    validate_resources(system, &queues)?;
    validate_products(system)?;
    validate_sources_and_sinks(system, &time_models, &queues)?;
    validate_auxiliaries(system, &queues)?;
    Ok(())
}

fn validate_states(
    system: &ProductionSystemData,
    time_models: &HashSet<&str>,
    processes: &HashSet<&str>,
) -> Result<(), ConfigError> {
    for state in &system.state_data {
        if !time_models.contains(state.time_model_id()) {
            return Err(ConfigError::new(
                "state_data",
                state.id(),
                format!("unknown time_model_id '{}'", state.time_model_id()),
            ));
        }
        match state {
            StateData::BreakDownState {
                repair_time_model_id,
                ..
            }
            | StateData::ProcessBreakDownState {
                repair_time_model_id,
                ..
            } => {
                if !time_models.contains(repair_time_model_id.as_str()) {
                    return Err(ConfigError::new(
                        "state_data",
                        state.id(),
                        format!("unknown repair_time_model_id '{repair_time_model_id}'"),
                    ));
                }
            }
            StateData::SetupState {
                origin_setup,
                target_setup,
                ..
            } => {
                for setup in [origin_setup, target_setup] {
                    if !processes.contains(setup.as_str()) {
                        return Err(ConfigError::new(
                            "state_data",
                            state.id(),
                            format!("unknown setup process '{setup}'"),
                        ));
                    }
                }
            }
        }
        if let StateData::ProcessBreakDownState { process_id, .. } = state {
            if !processes.contains(process_id.as_str()) {
                return Err(ConfigError::new(
                    "state_data",
                    state.id(),
                    format!("unknown process_id '{process_id}'"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_processes(
    system: &ProductionSystemData,
    time_models: &HashSet<&str>,
    resources: &HashSet<&str>,
    nodes: &HashSet<&str>,
    auxiliaries: &HashSet<&str>,
) -> Result<(), ConfigError> {
    for process in &system.process_data {
        if let Some(tm) = process.time_model_id() {
            if !time_models.contains(tm) {
                return Err(ConfigError::new(
                    "process_data",
                    process.id(),
                    format!("unknown time_model_id '{tm}'"),
                ));
            }
        }
        match process {
            ProcessData::ProductionProcesses {
                lot_dependency,
                max_lot_size,
                tool_dependency,
                ..
            }
            | ProcessData::CapabilityProcess {
                lot_dependency,
                max_lot_size,
                tool_dependency,
                ..
            } => {
                if *lot_dependency && max_lot_size.map_or(true, |n| n < 1) {
                    return Err(ConfigError::new(
                        "process_data",
                        process.id(),
                        "lot_dependency requires max_lot_size >= 1",
                    ));
                }
                if let Some(tool) = tool_dependency {
                    if !auxiliaries.contains(tool.as_str()) {
                        return Err(ConfigError::new(
                            "process_data",
                            process.id(),
                            format!("unknown tool_dependency '{tool}'"),
                        ));
                    }
                }
            }
            ProcessData::TransportProcesses {
                loading_time_model_id,
                unloading_time_model_id,
                ..
            }
            | ProcessData::LinkTransportProcess {
                loading_time_model_id,
                unloading_time_model_id,
                ..
            } => {
                for tm in [loading_time_model_id, unloading_time_model_id]
                    .into_iter()
                    .flatten()
                {
                    if !time_models.contains(tm.as_str()) {
                        return Err(ConfigError::new(
                            "process_data",
                            process.id(),
                            format!("unknown handling time model '{tm}'"),
                        ));
                    }
                }
            }
            ProcessData::RequiredCapabilityProcess { .. } => {}
        }
        if let ProcessData::LinkTransportProcess {
            from_resource,
            to_resource,
            ..
        } = process
        {
            for endpoint in [from_resource, to_resource] {
                if !resources.contains(endpoint.as_str()) && !nodes.contains(endpoint.as_str()) {
                    return Err(ConfigError::new(
                        "process_data",
                        process.id(),
                        format!("unknown link endpoint '{endpoint}'"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_queues(system: &ProductionSystemData) -> Result<(), ConfigError> {
    for queue in &system.queue_data {
        if queue.capacity < 0 {
            return Err(ConfigError::new(
                "queue_data",
                &queue.id,
                format!("capacity must be >= 0, got {}", queue.capacity),
            ));
        }
    }
    Ok(())
}

fn validate_resources(
    system: &ProductionSystemData,
    queues: &HashSet<&str>,
) -> Result<(), ConfigError> {
    for resource in &system.resource_data {
        if resource.capacity < 1 {
            return Err(ConfigError::new(
                "resource_data",
                &resource.id,
                format!("capacity must be >= 1, got {}", resource.capacity),
            ));
        }
        if resource.process_ids.is_empty() {
            return Err(ConfigError::new(
                "resource_data",
                &resource.id,
                "process_ids must not be empty",
            ));
        }
        if let Some(caps) = &resource.process_capacities {
            if caps.len() != resource.process_ids.len() {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    format!(
                        "process_capacities has {} entries for {} processes",
                        caps.len(),
                        resource.process_ids.len()
                    ),
                ));
            }
            if caps.iter().any(|&c| c < 0) {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    "process_capacities must be >= 0",
                ));
            }
        }
        for process_id in &resource.process_ids {
            let Some(process) = system.process(process_id) else {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    format!("unknown process '{process_id}'"),
                ));
            };
            let transport = process.is_transport();
            match resource.controller {
                ControllerKind::TransportController if !transport => {
                    return Err(ConfigError::new(
                        "resource_data",
                        &resource.id,
                        format!("transport controller cannot execute process '{process_id}'"),
                    ));
                }
                ControllerKind::PipelineController if transport => {
                    return Err(ConfigError::new(
                        "resource_data",
                        &resource.id,
                        format!("pipeline controller cannot execute transport '{process_id}'"),
                    ));
                }
                _ => {}
            }
            if process.kind() == ProcessKind::RequiredCapability {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    format!("'{process_id}' is a required capability, not an executable process"),
                ));
            }
        }
        for state_id in &resource.state_ids {
            if system.state(state_id).is_none() {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    format!("unknown state '{state_id}'"),
                ));
            }
        }
        for queue_id in resource
            .input_queues
            .iter()
            .flatten()
            .chain(resource.output_queues.iter().flatten())
        {
            if !queues.contains(queue_id.as_str()) {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    format!("unknown queue '{queue_id}'"),
                ));
            }
        }
        if resource.controller == ControllerKind::PipelineController {
            if resource.input_queues.as_deref().map_or(true, <[_]>::is_empty) {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    "production resource needs at least one input queue",
                ));
            }
            if resource.output_queues.as_deref().map_or(true, <[_]>::is_empty) {
                return Err(ConfigError::new(
                    "resource_data",
                    &resource.id,
                    "production resource needs at least one output queue",
                ));
            }
        }
    }
    Ok(())
}

/// Resources that could execute `process_id` for a plan: direct id match, or
/// a capability process whose tag equals the required capability.
fn providers(system: &ProductionSystemData, process_id: &str) -> usize {
    let required_capability = match system.process(process_id) {
        Some(ProcessData::RequiredCapabilityProcess { capability, .. }) => {
            Some(capability.as_str())
        }
        _ => None,
    };
    system
        .resource_data
        .iter()
        .filter(|resource| {
            resource.process_ids.iter().any(|offered| {
                if offered == process_id {
                    return true;
                }
                match (required_capability, system.process(offered)) {
                    (
                        Some(required),
                        Some(ProcessData::CapabilityProcess { capability, .. }),
                    ) => capability == required,
                    _ => false,
                }
            })
        })
        .count()
}

fn validate_products(system: &ProductionSystemData) -> Result<(), ConfigError> {
    for product in &system.product_data {
        let Some(transport) = system.process(&product.transport_process) else {
            return Err(ConfigError::new(
                "product_data",
                &product.id,
                format!("unknown transport_process '{}'", product.transport_process),
            ));
        };
        if !transport.is_transport() {
            return Err(ConfigError::new(
                "product_data",
                &product.id,
                format!("'{}' is not a transport process", product.transport_process),
            ));
        }
        if providers(system, &product.transport_process) == 0 {
            return Err(ConfigError::new(
                "product_data",
                &product.id,
                format!(
                    "no resource provides transport process '{}'",
                    product.transport_process
                ),
            ));
        }
        for process_id in product.processes.process_ids() {
            if system.process(process_id).is_none() {
                return Err(ConfigError::new(
                    "product_data",
                    &product.id,
                    format!("unknown process '{process_id}' in plan"),
                ));
            }
            if providers(system, process_id) == 0 {
                return Err(ConfigError::new(
                    "product_data",
                    &product.id,
                    format!("process '{process_id}' is unreachable: no resource provides it"),
                ));
            }
        }
        if let ProcessPlanData::Precedence(adjacency) = &product.processes {
            check_acyclic(&product.id, adjacency)?;
        }
        if !system
            .sink_data
            .iter()
            .any(|sink| sink.product_type == product.product_type)
        {
            return Err(ConfigError::new(
                "product_data",
                &product.id,
                format!("no sink accepts product_type '{}'", product.product_type),
            ));
        }
    }
    Ok(())
}

fn check_acyclic(
    product_id: &str,
    adjacency: &BTreeMap<String, Vec<String>>,
) -> Result<(), ConfigError> {
    // Kahn's algorithm over the declared nodes.
    let mut indegree: BTreeMap<&str, usize> = adjacency.keys().map(|k| (k.as_str(), 0)).collect();
    for successors in adjacency.values() {
        for succ in successors {
            if let Some(d) = indegree.get_mut(succ.as_str()) {
                *d += 1;
            }
        }
    }
    let mut ready: Vec<&str> = indegree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&n, _)| n)
        .collect();
    let mut visited = 0usize;
    while let Some(node) = ready.pop() {
        visited += 1;
        if let Some(successors) = adjacency.get(node) {
            for succ in successors {
                if let Some(d) = indegree.get_mut(succ.as_str()) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push(succ.as_str());
                    }
                }
            }
        }
    }
    if visited != indegree.len() {
        return Err(ConfigError::new(
            "product_data",
            product_id,
            "cycle in process precedence graph",
        ));
    }
    Ok(())
}

fn validate_sources_and_sinks(
    system: &ProductionSystemData,
    time_models: &HashSet<&str>,
    queues: &HashSet<&str>,
) -> Result<(), ConfigError> {
    for source in &system.source_data {
        if !time_models.contains(source.time_model_id.as_str()) {
            return Err(ConfigError::new(
                "source_data",
                &source.id,
                format!("unknown time_model_id '{}'", source.time_model_id),
            ));
        }
        if source.output_queues.is_empty() {
            return Err(ConfigError::new(
                "source_data",
                &source.id,
                "output_queues must not be empty",
            ));
        }
        for queue_id in &source.output_queues {
            if !queues.contains(queue_id.as_str()) {
                return Err(ConfigError::new(
                    "source_data",
                    &source.id,
                    format!("unknown queue '{queue_id}'"),
                ));
            }
        }
        if !system
            .product_data
            .iter()
            .any(|p| p.product_type == source.product_type)
        {
            return Err(ConfigError::new(
                "source_data",
                &source.id,
                format!("unknown product_type '{}'", source.product_type),
            ));
        }
    }
    for sink in &system.sink_data {
        if sink.input_queues.is_empty() {
            return Err(ConfigError::new(
                "sink_data",
                &sink.id,
                "input_queues must not be empty",
            ));
        }
        for queue_id in &sink.input_queues {
            if !queues.contains(queue_id.as_str()) {
                return Err(ConfigError::new(
                    "sink_data",
                    &sink.id,
                    format!("unknown queue '{queue_id}'"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_auxiliaries(
    system: &ProductionSystemData,
    queues: &HashSet<&str>,
) -> Result<(), ConfigError> {
    for auxiliary in &system.auxiliary_data {
        if auxiliary.storages.is_empty() {
            return Err(ConfigError::new(
                "auxiliary_data",
                &auxiliary.id,
                "storages must not be empty",
            ));
        }
        if auxiliary.storages.len() != auxiliary.quantity_in_storages.len() {
            return Err(ConfigError::new(
                "auxiliary_data",
                &auxiliary.id,
                format!(
                    "quantity_in_storages has {} entries for {} storages",
                    auxiliary.quantity_in_storages.len(),
                    auxiliary.storages.len()
                ),
            ));
        }
        for storage in &auxiliary.storages {
            if !queues.contains(storage.as_str()) {
                return Err(ConfigError::new(
                    "auxiliary_data",
                    &auxiliary.id,
                    format!("unknown storage queue '{storage}'"),
                ));
            }
        }
        if auxiliary.quantity_in_storages.iter().any(|&q| q < 0) {
            return Err(ConfigError::new(
                "auxiliary_data",
                &auxiliary.id,
                "quantity_in_storages must be >= 0",
            ));
        }
    }
    Ok(())
}
