//! Structured logging for simulation debugging.
//!
//! Diagnostics use `tracing` throughout the workspace; the simulation event
//! log is a separate, first-class data structure and never depends on this
//! module. Initialization respects `RUST_LOG` when set:
//!
//! ```bash
//! RUST_LOG=fabsim_components::driver=trace cargo run
//! ```

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with sensible defaults (info level).
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level.
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{level},fabsim_core={level},fabsim_components={level}").into()
    });

    // try_init so tests and embedding applications can call this repeatedly.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_initialization_is_idempotent() {
        init_simulation_logging_with_level("debug");
        init_simulation_logging();
        tracing::info!("logging smoke test");
    }
}
