//! Run entry points: validate inputs, assemble the site, and fold the engine over the horizon.

use tracing::debug;

use crate::config::{ConfigError, ScenarioConfig};
use crate::devices::{Battery, DemandModel, Inverter, SolarArray, WeatherState};
use crate::error::SimError;
use crate::sim::dispatch::DispatchStrategy;
use crate::sim::economics::EconomicRates;
use crate::sim::engine::Engine;
use crate::sim::grid::GridPolicy;
use crate::sim::kpi::RunSummary;
use crate::sim::types::SimConfig;

pub use crate::sim::engine::SimulationOutput;

/// Assembles an engine from a validated scenario.
///
/// Run-level parameters (timing, seed, SoC, strategy) come from the arguments,
/// everything else from `scenario`.
pub fn build_engine(
    scenario: &ScenarioConfig,
    config: SimConfig,
    initial_soc_fraction: f64,
    strategy: DispatchStrategy,
) -> Engine {
    let battery = Battery::new(
        scenario.battery.capacity_kwh,
        initial_soc_fraction,
        scenario.battery.min_soc_fraction,
        scenario.battery.round_trip_efficiency,
    );
    let solar = SolarArray::new(scenario.solar.peak_kw, scenario.inverter.max_output_kw);
    let demand = DemandModel::new(scenario.load.base_kw, scenario.load.peak_kw);
    let weather = WeatherState::new(scenario.simulation.season);
    let inverter = Inverter::new(
        scenario.inverter.failure_frequency,
        scenario.inverter.mean_outage_hours,
    );
    let mut grid = GridPolicy::new(
        scenario.grid.export_limit_kw,
        scenario.grid.monthly_export_quota_kwh,
        scenario.grid.month_length_days,
    );
    if let Some(limit) = scenario.grid.import_limit_kw {
        grid = grid.with_import_limit(limit);
    }
    let rates = EconomicRates::new(
        scenario.economics.import_cost_per_kwh,
        scenario.economics.export_revenue_per_kwh,
    );

    Engine::new(
        config, strategy, battery, solar, demand, weather, inverter, grid, rates,
    )
}

/// Runs one simulation and returns the timestep log, event log, and summary.
///
/// The strategy name is resolved and every argument validated before the
/// first step, so a bad input never produces a partial log.
///
/// # Arguments
///
/// * `scenario` - Site, device, grid, and tariff parameters
/// * `dt_minutes` - Step length in minutes
/// * `total_minutes` - Horizon; a trailing partial step is dropped
/// * `initial_soc_fraction` - Starting SoC as a fraction of capacity
/// * `strategy` - Dispatch strategy name
/// * `seed` - Seed for the run's single random generator
///
/// # Errors
///
/// * `SimError::UnknownStrategy` - `strategy` is not a known name
/// * `SimError::InvalidTiming` - zero step length or a horizon shorter than one step
/// * `SimError::InvalidConfig` - scenario or SoC out of range
pub fn run(
    scenario: &ScenarioConfig,
    dt_minutes: u64,
    total_minutes: u64,
    initial_soc_fraction: f64,
    strategy: &str,
    seed: u64,
) -> Result<SimulationOutput, SimError> {
    let strategy: DispatchStrategy = strategy.parse()?;

    if dt_minutes == 0 {
        return Err(SimError::InvalidTiming("dt_minutes must be > 0".to_string()));
    }
    if total_minutes < dt_minutes {
        return Err(SimError::InvalidTiming(format!(
            "horizon of {total_minutes} min is shorter than one {dt_minutes} min step"
        )));
    }

    // The [simulation] section is superseded by the arguments above.
    let mut errors: Vec<ConfigError> = scenario
        .validate()
        .into_iter()
        .filter(|e| !e.field.starts_with("simulation."))
        .collect();
    if !(0.0..=1.0).contains(&initial_soc_fraction) {
        errors.push(ConfigError::new(
            "initial_soc_fraction",
            format!("must be in [0.0, 1.0], got {initial_soc_fraction}"),
        ));
    }
    if !errors.is_empty() {
        return Err(SimError::InvalidConfig(errors));
    }

    debug!(dt_minutes, total_minutes, initial_soc_fraction, %strategy, seed, "starting run");
    let config = SimConfig::new(dt_minutes, total_minutes, seed);
    Ok(build_engine(scenario, config, initial_soc_fraction, strategy).run())
}

/// Runs a scenario with its own timing, SoC, strategy, and seed.
///
/// # Errors
///
/// Returns `SimError::InvalidConfig` listing every violated constraint, or
/// any error from [`run`].
pub fn run_scenario(scenario: &ScenarioConfig) -> Result<SimulationOutput, SimError> {
    let errors = scenario.validate();
    if !errors.is_empty() {
        return Err(SimError::InvalidConfig(errors));
    }
    let s = &scenario.simulation;
    run(
        scenario,
        s.timestep_minutes,
        scenario.total_minutes(),
        s.initial_soc,
        &s.strategy,
        s.seed,
    )
}

/// Runs every dispatch strategy on the same scenario and seed.
///
/// # Errors
///
/// Returns the first error from [`run`].
pub fn compare_strategies(
    scenario: &ScenarioConfig,
) -> Result<Vec<(DispatchStrategy, RunSummary)>, SimError> {
    let s = &scenario.simulation;
    DispatchStrategy::ALL
        .into_iter()
        .map(|strategy| {
            run(
                scenario,
                s.timestep_minutes,
                scenario.total_minutes(),
                s.initial_soc,
                strategy.as_str(),
                s.seed,
            )
            .map(|out| (strategy, out.summary))
        })
        .collect()
}
