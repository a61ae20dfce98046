//! A minimal milling line: one source, one machine, one transport, one sink.
//!
//! Run with `cargo run --example milling_line`.

use fabsim::prelude::*;

const CONFIG: &str = r#"{
    "ID": "milling_line", "seed": 42,
    "time_model_data": [
        {"ID": "TM_arrival", "description": "order inter-arrival",
         "distribution_function": "exponential", "location": 1.5},
        {"ID": "TM_mill", "description": "milling time",
         "distribution_function": "normal", "location": 1.0, "scale": 0.1},
        {"ID": "TM_agv", "description": "AGV travel",
         "speed": 60.0, "reaction_time": 0.1, "metric": "manhattan"}
    ],
    "state_data": [],
    "process_data": [
        {"type": "ProductionProcesses", "ID": "P_mill", "time_model_id": "TM_mill"},
        {"type": "TransportProcesses", "ID": "TP_agv", "time_model_id": "TM_agv"}
    ],
    "queue_data": [
        {"ID": "SQ1"}, {"ID": "IQ1", "capacity": 4}, {"ID": "OQ1", "capacity": 4}, {"ID": "KQ1"}
    ],
    "node_data": [],
    "resource_data": [
        {"ID": "M1", "description": "milling center", "capacity": 1,
         "location": [10.0, 10.0],
         "controller": "PipelineController", "control_policy": "FIFO",
         "process_ids": ["P_mill"],
         "input_queues": ["IQ1"], "output_queues": ["OQ1"]},
        {"ID": "AGV1", "capacity": 1, "location": [0.0, 0.0],
         "controller": "TransportController", "control_policy": "SPT_transport",
         "process_ids": ["TP_agv"]}
    ],
    "product_data": [
        {"ID": "Product_1", "product_type": "Product_1",
         "processes": ["P_mill"], "transport_process": "TP_agv"}
    ],
    "sink_data": [
        {"ID": "K1", "location": [20.0, 10.0], "product_type": "Product_1",
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
}"#;

fn main() -> SimResult<()> {
    init_simulation_logging_with_level("info");

    let config = ProductionSystemData::from_json_str(CONFIG).map_err(std::io::Error::other)?;
    let mut runner = Runner::new(config);
    runner.run(60.0)?;

    let results = runner.results()?;
    for t in &results.throughput {
        println!(
            "{}: {} finished ({:.3}/unit)",
            t.product_type, t.finished, t.rate
        );
    }
    println!(
        "WIP: avg {:.2}, max {}, at end {}",
        results.wip.average, results.wip.maximum, results.wip.at_end
    );
    for r in &results.resource_states {
        println!(
            "{}: PR {:.1}%  SB {:.1}%  ST {:.1}%  UD {:.1}%",
            r.resource, r.productive, r.standby, r.setup, r.down
        );
    }

    runner.save_event_log_csv("milling_line_events.csv")?;
    Ok(())
}
