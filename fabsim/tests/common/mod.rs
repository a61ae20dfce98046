//! Shared configurations for the integration suites.

// Each integration binary uses its own subset of these builders.
#![allow(dead_code)]

use fabsim::model::ProductionSystemData;

pub fn parse(json: &str) -> ProductionSystemData {
    ProductionSystemData::from_json_str(json).expect("test config parses")
}

/// One source (exponential 1.5), one machine (normal 1.0/0.1), one transport
/// (normal 0.3/0.2), one sink.
pub fn single_machine_line(seed: u64) -> ProductionSystemData {
    parse(&format!(
        r#"{{
        "ID": "single_machine_line", "seed": {seed},
        "time_model_data": [
            {{"ID": "TM_arrival", "distribution_function": "exponential", "location": 1.5}},
            {{"ID": "TM_mill", "distribution_function": "normal", "location": 1.0, "scale": 0.1}},
            {{"ID": "TM_move", "distribution_function": "normal", "location": 0.3, "scale": 0.2}}
        ],
        "state_data": [],
        "process_data": [
            {{"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_mill"}},
            {{"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}}
        ],
        "queue_data": [
            {{"ID": "SQ1"}}, {{"ID": "IQ1"}}, {{"ID": "OQ1"}}, {{"ID": "KQ1"}}
        ],
        "node_data": [],
        "resource_data": [
            {{"ID": "M1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]}},
            {{"ID": "TR1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}}
        ],
        "product_data": [
            {{"ID": "Product_1", "product_type": "Product_1",
             "processes": ["P1"], "transport_process": "TP1"}}
        ],
        "sink_data": [
            {{"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}}
        ],
        "source_data": [
            {{"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "random",
             "output_queues": ["SQ1"]}}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }}"#
    ))
}

/// Two machines providing the same process behind capacity-2 input queues,
/// fed faster than either alone can drain, under shortest_queue routing.
pub fn two_machine_overflow() -> ProductionSystemData {
    parse(
        r#"{
        "ID": "two_machine_overflow", "seed": 7,
        "time_model_data": [
            {"ID": "TM_arrival", "distribution_function": "constant", "location": 0.45},
            {"ID": "TM_proc", "distribution_function": "constant", "location": 1.0},
            {"ID": "TM_move", "distribution_function": "constant", "location": 0.05}
        ],
        "state_data": [],
        "process_data": [
            {"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_proc"},
            {"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}
        ],
        "queue_data": [
            {"ID": "SQ1"},
            {"ID": "IQ_A", "capacity": 2}, {"ID": "OQ_A"},
            {"ID": "IQ_B", "capacity": 2}, {"ID": "OQ_B"},
            {"ID": "KQ1"}
        ],
        "node_data": [],
        "resource_data": [
            {"ID": "M_A", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"],
             "input_queues": ["IQ_A"], "output_queues": ["OQ_A"]},
            {"ID": "M_B", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"],
             "input_queues": ["IQ_B"], "output_queues": ["OQ_B"]},
            {"ID": "TR1", "capacity": 4, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}
        ],
        "product_data": [
            {"ID": "Product_1", "product_type": "Product_1",
             "processes": ["P1"], "transport_process": "TP1"}
        ],
        "sink_data": [
            {"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}
        ],
        "source_data": [
            {"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "shortest_queue",
             "output_queues": ["SQ1"]}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }"#,
    )
}

/// An idle machine with exponential breakdowns (mean TTF 200, mean repair
/// 10). Expected down share 10/210 of the horizon.
pub fn breakdown_machine(seed: u64) -> ProductionSystemData {
    parse(&format!(
        r#"{{
        "ID": "breakdown_machine", "seed": {seed},
        "time_model_data": [
            {{"ID": "TM_proc", "distribution_function": "constant", "location": 1.0}},
            {{"ID": "TM_ttf", "distribution_function": "exponential", "location": 200.0}},
            {{"ID": "TM_repair", "distribution_function": "exponential", "location": 10.0}}
        ],
        "state_data": [
            {{"type": "BreakDownState", "ID": "BS1",
             "time_model_id": "TM_ttf", "repair_time_model_id": "TM_repair"}}
        ],
        "process_data": [
            {{"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_proc"}}
        ],
        "queue_data": [{{"ID": "IQ1"}}, {{"ID": "OQ1"}}],
        "node_data": [],
        "resource_data": [
            {{"ID": "M1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"], "state_ids": ["BS1"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]}}
        ],
        "product_data": [],
        "sink_data": [],
        "source_data": [],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }}"#
    ))
}

/// A work center alternating between a short process P1 and a long process
/// P2 with directed setups, fed by two bursty sample-driven sources. Under
/// FIFO the work center changes over almost every job; SPT batches the short
/// jobs and saves most setups.
pub fn setup_work_center(policy: &str) -> ProductionSystemData {
    parse(&format!(
        r#"{{
        "ID": "setup_work_center", "seed": 3,
        "time_model_data": [
            {{"ID": "TM_burst", "samples": [0.3, 0.3, 0.3, 0.3, 18.8]}},
            {{"ID": "TM_p1", "distribution_function": "constant", "location": 0.5}},
            {{"ID": "TM_p2", "distribution_function": "constant", "location": 2.0}},
            {{"ID": "TM_setup12", "distribution_function": "constant", "location": 0.2}},
            {{"ID": "TM_setup21", "distribution_function": "constant", "location": 0.3}},
            {{"ID": "TM_move", "distribution_function": "constant", "location": 0.05}}
        ],
        "state_data": [
            {{"type": "SetupState", "ID": "ST12", "time_model_id": "TM_setup12",
             "origin_setup": "P1", "target_setup": "P2"}},
            {{"type": "SetupState", "ID": "ST21", "time_model_id": "TM_setup21",
             "origin_setup": "P2", "target_setup": "P1"}}
        ],
        "process_data": [
            {{"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_p1"}},
            {{"type": "ProductionProcesses", "ID": "P2", "time_model_id": "TM_p2"}},
            {{"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}}
        ],
        "queue_data": [
            {{"ID": "SQ1"}}, {{"ID": "SQ2"}}, {{"ID": "IQ1"}}, {{"ID": "OQ1"}}, {{"ID": "KQ1"}}, {{"ID": "KQ2"}}
        ],
        "node_data": [],
        "resource_data": [
            {{"ID": "WC1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "{policy}",
             "process_ids": ["P1", "P2"], "state_ids": ["ST12", "ST21"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]}},
            {{"ID": "TR1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}}
        ],
        "product_data": [
            {{"ID": "housing_a", "product_type": "housing_a",
             "processes": ["P1"], "transport_process": "TP1"}},
            {{"ID": "housing_b", "product_type": "housing_b",
             "processes": ["P2"], "transport_process": "TP1"}}
        ],
        "sink_data": [
            {{"ID": "K1", "location": [0.0, 0.0], "product_type": "housing_a",
             "input_queues": ["KQ1"]}},
            {{"ID": "K2", "location": [0.0, 0.0], "product_type": "housing_b",
             "input_queues": ["KQ2"]}}
        ],
        "source_data": [
            {{"ID": "S1", "location": [0.0, 0.0], "product_type": "housing_a",
             "time_model_id": "TM_burst", "routing_heuristic": "FIFO",
             "output_queues": ["SQ1"]}},
            {{"ID": "S2", "location": [0.0, 0.0], "product_type": "housing_b",
             "time_model_id": "TM_burst", "routing_heuristic": "FIFO",
             "output_queues": ["SQ2"]}}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }}"#
    ))
}

/// A product whose plan is a precedence DAG: P1 and P2 both before P3.
pub fn dag_plan_line() -> ProductionSystemData {
    parse(
        r#"{
        "ID": "dag_plan_line", "seed": 5,
        "time_model_data": [
            {"ID": "TM_arrival", "distribution_function": "constant", "location": 6.0},
            {"ID": "TM_proc", "distribution_function": "constant", "location": 1.0},
            {"ID": "TM_move", "distribution_function": "constant", "location": 0.1}
        ],
        "state_data": [],
        "process_data": [
            {"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_proc"},
            {"type": "ProductionProcesses", "ID": "P2", "time_model_id": "TM_proc"},
            {"type": "ProductionProcesses", "ID": "P3", "time_model_id": "TM_proc"},
            {"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}
        ],
        "queue_data": [
            {"ID": "SQ1"}, {"ID": "IQ1"}, {"ID": "OQ1"}, {"ID": "KQ1"}
        ],
        "node_data": [],
        "resource_data": [
            {"ID": "M1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1", "P2", "P3"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]},
            {"ID": "TR1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}
        ],
        "product_data": [
            {"ID": "Product_1", "product_type": "Product_1",
             "processes": {"P1": ["P3"], "P2": ["P3"], "P3": []},
             "transport_process": "TP1"}
        ],
        "sink_data": [
            {"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}
        ],
        "source_data": [
            {"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "FIFO",
             "output_queues": ["SQ1"]}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }"#,
    )
}

/// A plan step expressed as a required capability, matched by a capability
/// process on the machine.
pub fn capability_line() -> ProductionSystemData {
    parse(
        r#"{
        "ID": "capability_line", "seed": 9,
        "time_model_data": [
            {"ID": "TM_arrival", "distribution_function": "constant", "location": 3.0},
            {"ID": "TM_drill", "distribution_function": "constant", "location": 1.0},
            {"ID": "TM_move", "distribution_function": "constant", "location": 0.1}
        ],
        "state_data": [],
        "process_data": [
            {"type": "CapabilityProcess", "ID": "CP_drill", "time_model_id": "TM_drill",
             "capability": "drilling"},
            {"type": "RequiredCapabilityProcess", "ID": "RC_drill", "capability": "drilling"},
            {"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}
        ],
        "queue_data": [
            {"ID": "SQ1"}, {"ID": "IQ1"}, {"ID": "OQ1"}, {"ID": "KQ1"}
        ],
        "node_data": [],
        "resource_data": [
            {"ID": "M1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["CP_drill"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]},
            {"ID": "TR1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}
        ],
        "product_data": [
            {"ID": "Product_1", "product_type": "Product_1",
             "processes": ["RC_drill"], "transport_process": "TP1"}
        ],
        "sink_data": [
            {"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}
        ],
        "source_data": [
            {"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "FIFO",
             "output_queues": ["SQ1"]}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }"#,
    )
}

/// A two-stage chain: P1 on M1, then P2 on M2, constant times throughout.
pub fn two_stage_chain() -> ProductionSystemData {
    parse(
        r#"{
        "ID": "two_stage_chain", "seed": 13,
        "time_model_data": [
            {"ID": "TM_arrival", "distribution_function": "constant", "location": 3.0},
            {"ID": "TM_p1", "distribution_function": "constant", "location": 1.0},
            {"ID": "TM_p2", "distribution_function": "constant", "location": 0.5},
            {"ID": "TM_move", "distribution_function": "constant", "location": 0.1}
        ],
        "state_data": [],
        "process_data": [
            {"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_p1"},
            {"type": "ProductionProcesses", "ID": "P2", "time_model_id": "TM_p2"},
            {"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}
        ],
        "queue_data": [
            {"ID": "SQ1"}, {"ID": "IQ1"}, {"ID": "OQ1"},
            {"ID": "IQ2"}, {"ID": "OQ2"}, {"ID": "KQ1"}
        ],
        "node_data": [],
        "resource_data": [
            {"ID": "M1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]},
            {"ID": "M2", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P2"],
             "input_queues": ["IQ2"], "output_queues": ["OQ2"]},
            {"ID": "TR1", "capacity": 2, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}
        ],
        "product_data": [
            {"ID": "Product_1", "product_type": "Product_1",
             "processes": ["P1", "P2"], "transport_process": "TP1"}
        ],
        "sink_data": [
            {"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}
        ],
        "source_data": [
            {"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "FIFO",
             "output_queues": ["SQ1"]}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }"#,
    )
}

/// A capacity-2 machine gated by a single tool copy.
pub fn tool_gated_line() -> ProductionSystemData {
    parse(
        r#"{
        "ID": "tool_gated_line", "seed": 17,
        "time_model_data": [
            {"ID": "TM_arrival", "distribution_function": "constant", "location": 0.2},
            {"ID": "TM_proc", "distribution_function": "constant", "location": 1.0},
            {"ID": "TM_move", "distribution_function": "constant", "location": 0.05}
        ],
        "state_data": [],
        "process_data": [
            {"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_proc",
             "tool_dependency": "Tool_1"},
            {"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}
        ],
        "queue_data": [
            {"ID": "SQ1"}, {"ID": "IQ1"}, {"ID": "OQ1"}, {"ID": "KQ1"},
            {"ID": "TQ1", "location": [0.0, 0.0]}
        ],
        "node_data": [],
        "resource_data": [
            {"ID": "M1", "capacity": 2, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"], "process_capacities": [2],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]},
            {"ID": "TR1", "capacity": 2, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}
        ],
        "product_data": [
            {"ID": "Product_1", "product_type": "Product_1",
             "processes": ["P1"], "transport_process": "TP1"}
        ],
        "sink_data": [
            {"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}
        ],
        "source_data": [
            {"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "FIFO",
             "output_queues": ["SQ1"]}
        ],
        "auxiliary_data": [
            {"ID": "Tool_1", "storages": ["TQ1"], "quantity_in_storages": [1]}
        ],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }"#,
    )
}

/// A machine whose single process suffers process-specific breakdowns.
pub fn process_breakdown_line() -> ProductionSystemData {
    parse(
        r#"{
        "ID": "process_breakdown_line", "seed": 21,
        "time_model_data": [
            {"ID": "TM_arrival", "distribution_function": "constant", "location": 2.0},
            {"ID": "TM_proc", "distribution_function": "constant", "location": 1.0},
            {"ID": "TM_move", "distribution_function": "constant", "location": 0.1},
            {"ID": "TM_ttf", "distribution_function": "exponential", "location": 50.0},
            {"ID": "TM_repair", "distribution_function": "constant", "location": 5.0}
        ],
        "state_data": [
            {"type": "ProcessBreakDownState", "ID": "PBS1",
             "time_model_id": "TM_ttf", "repair_time_model_id": "TM_repair",
             "process_id": "P1"}
        ],
        "process_data": [
            {"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_proc"},
            {"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}
        ],
        "queue_data": [
            {"ID": "SQ1"}, {"ID": "IQ1"}, {"ID": "OQ1"}, {"ID": "KQ1"}
        ],
        "node_data": [],
        "resource_data": [
            {"ID": "M1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"], "state_ids": ["PBS1"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]},
            {"ID": "TR1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}
        ],
        "product_data": [
            {"ID": "Product_1", "product_type": "Product_1",
             "processes": ["P1"], "transport_process": "TP1"}
        ],
        "sink_data": [
            {"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}
        ],
        "source_data": [
            {"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "FIFO",
             "output_queues": ["SQ1"]}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }"#,
    )
}

/// The DAG line with a precedence cycle injected (P3 feeds back into P1).
pub fn dag_plan_line_with_cycle() -> ProductionSystemData {
    use fabsim::model::ProcessPlanData;
    use std::collections::BTreeMap;

    let mut config = dag_plan_line();
    let mut adjacency = BTreeMap::new();
    adjacency.insert("P1".to_string(), vec!["P3".to_string()]);
    adjacency.insert("P2".to_string(), vec!["P3".to_string()]);
    adjacency.insert("P3".to_string(), vec!["P1".to_string()]);
    config.product_data[0].processes = ProcessPlanData::Precedence(adjacency);
    config
}

/// A lot-forming process: up to three queued jobs run as one activity.
pub fn lot_line() -> ProductionSystemData {
    parse(
        r#"{
        "ID": "lot_line", "seed": 11,
        "time_model_data": [
            {"ID": "TM_arrival", "distribution_function": "constant", "location": 0.5},
            {"ID": "TM_proc", "distribution_function": "constant", "location": 2.0},
            {"ID": "TM_move", "distribution_function": "constant", "location": 0.05}
        ],
        "state_data": [],
        "process_data": [
            {"type": "ProductionProcesses", "ID": "P1", "time_model_id": "TM_proc",
             "lot_dependency": true, "max_lot_size": 3},
            {"type": "TransportProcesses", "ID": "TP1", "time_model_id": "TM_move"}
        ],
        "queue_data": [
            {"ID": "SQ1"}, {"ID": "IQ1"}, {"ID": "OQ1"}, {"ID": "KQ1"}
        ],
        "node_data": [],
        "resource_data": [
            {"ID": "M1", "capacity": 1, "location": [0.0, 0.0],
             "controller": "PipelineController", "control_policy": "FIFO",
             "process_ids": ["P1"],
             "input_queues": ["IQ1"], "output_queues": ["OQ1"]},
            {"ID": "TR1", "capacity": 2, "location": [0.0, 0.0],
             "controller": "TransportController", "control_policy": "FIFO",
             "process_ids": ["TP1"]}
        ],
        "product_data": [
            {"ID": "Product_1", "product_type": "Product_1",
             "processes": ["P1"], "transport_process": "TP1"}
        ],
        "sink_data": [
            {"ID": "K1", "location": [0.0, 0.0], "product_type": "Product_1",
             "input_queues": ["KQ1"]}
        ],
        "source_data": [
            {"ID": "S1", "location": [0.0, 0.0], "product_type": "Product_1",
             "time_model_id": "TM_arrival", "routing_heuristic": "FIFO",
             "output_queues": ["SQ1"]}
        ],
        "auxiliary_data": [],
        "scenario_data": null,
        "valid_configuration": true,
        "reconfiguration_cost": 0.0
    }"#,
    )
}
