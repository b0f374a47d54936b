//! Core simulation types: run timing, tolerances, and the per-step record.

use std::fmt;

use serde::Serialize;

use super::dispatch::DispatchStrategy;

/// Energy flows at or below this magnitude (kWh) are treated as zero.
pub const FLOW_EPSILON_KWH: f64 = 1e-9;

/// Allowed SoC rise (kWh) during a deficit step before it is flagged.
pub const SOC_RISE_TOLERANCE_KWH: f64 = 1e-6;

/// Run timing shared by the clock and the engine.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(30, 2 * 1440, 42);
/// assert_eq!(cfg.dt_hours(), 0.5);
/// assert_eq!(cfg.total_steps(), 96);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Timestep length in minutes.
    pub dt_minutes: u64,
    /// Horizon in minutes.
    pub total_minutes: u64,
    /// Seed for the single run-wide random generator.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a run timing configuration.
    ///
    /// # Panics
    ///
    /// Panics if `dt_minutes` is zero.
    pub fn new(dt_minutes: u64, total_minutes: u64, seed: u64) -> Self {
        assert!(dt_minutes > 0, "dt_minutes must be > 0");
        Self {
            dt_minutes,
            total_minutes,
            seed,
        }
    }

    /// Timestep length in hours.
    pub fn dt_hours(&self) -> f64 {
        self.dt_minutes as f64 / 60.0
    }

    /// Number of whole steps that fit in the horizon.
    pub fn total_steps(&self) -> u64 {
        self.total_minutes / self.dt_minutes
    }
}

/// Rounds `value` to `places` decimal places for log output.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

/// Complete, display-rounded record of one simulation timestep.
///
/// Powers carry 4 decimals, energies and costs 6. Internal accumulators are
/// never rounded; rounding happens only when this record is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestepRecord {
    /// Virtual time at the start of the step (minutes).
    pub time_min: u64,
    /// Hour of day (0..24).
    pub hour: u64,
    /// AC solar output (kW).
    pub solar_kw: f64,
    /// Household demand (kW).
    pub load_kw: f64,
    /// Solar energy produced this step (kWh).
    pub energy_gen_kwh: f64,
    /// Energy consumed this step (kWh).
    pub energy_load_kwh: f64,
    /// Generation minus load (kWh).
    pub net_kwh: f64,
    /// Stored energy after the step (kWh).
    pub battery_soc_kwh: f64,
    /// Stored energy after the step (% of capacity).
    pub battery_soc_pct: f64,
    /// Bus energy taken into the battery (kWh).
    pub battery_charged_kwh: f64,
    /// Bus energy delivered by the battery (kWh).
    pub battery_discharged_kwh: f64,
    /// Energy bought from the grid (kWh).
    pub grid_import_kwh: f64,
    /// Energy sold to the grid (kWh).
    pub grid_export_kwh: f64,
    /// Surplus discarded (kWh).
    pub curtailed_kwh: f64,
    /// Load left unserved (kWh).
    pub unmet_load_kwh: f64,
    /// Whether the inverter was online.
    pub inverter_ok: bool,
    /// Day's cloud fraction.
    pub cloud: f64,
    /// Dispatch strategy in force.
    pub strategy: DispatchStrategy,
    /// Cost of imported energy.
    pub import_cost: f64,
    /// Revenue from exported energy.
    pub export_revenue: f64,
    /// `import_cost - export_revenue`.
    pub net_cost: f64,
    /// Energy exported so far in the current billing month (kWh).
    pub month_exported_kwh: f64,
}

impl fmt::Display for TimestepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>6} ({:>2}h) | solar={:>5.2} kW  load={:>5.2} kW | SoC={:>5.1}% \
             chg={:.3} dis={:.3} | imp={:.3} exp={:.3} curt={:.3} | inv={} cloud={:.2} cost={:.4}",
            self.time_min,
            self.hour,
            self.solar_kw,
            self.load_kw,
            self.battery_soc_pct,
            self.battery_charged_kwh,
            self.battery_discharged_kwh,
            self.grid_import_kwh,
            self.grid_export_kwh,
            self.curtailed_kwh,
            if self.inverter_ok { "ok" } else { "DOWN" },
            self.cloud,
            self.net_cost,
        )
    }
}
