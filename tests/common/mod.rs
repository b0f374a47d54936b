//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::runner::{SimulationOutput, run};
use microgrid_sim::sim::event::EventCategory;
use microgrid_sim::sim::types::TimestepRecord;

/// Absolute tolerance for balances recomputed from rounded record fields.
pub const RECORD_TOLERANCE_KWH: f64 = 1e-5;

/// Baseline scenario shortened to `days`.
pub fn short_scenario(days: u64) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.days = days;
    cfg
}

/// Runs `scenario` for `days` at 30-minute steps with the given strategy and seed.
pub fn run_days(scenario: &ScenarioConfig, days: u64, strategy: &str, seed: u64) -> SimulationOutput {
    run(scenario, 30, days * 1440, 0.5, strategy, seed).expect("run should succeed")
}

/// Number of events of `category` in a run.
pub fn count_events(output: &SimulationOutput, category: EventCategory) -> usize {
    output.events.iter().filter(|e| e.category == category).count()
}

/// Bus-side balance residual of a logged step.
pub fn record_residual(r: &TimestepRecord) -> f64 {
    r.net_kwh
        - (r.battery_charged_kwh + r.grid_export_kwh + r.curtailed_kwh
            - r.battery_discharged_kwh
            - r.grid_import_kwh
            - r.unmet_load_kwh)
}
