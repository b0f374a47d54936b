//! Run summary computed from the recorder's unrounded totals.

use std::fmt;

use serde::Serialize;

use super::recorder::{BatteryCounters, RunTotals};

/// Aggregate energy, cost, and reliability figures for a complete run.
///
/// Built from totals the recorder accumulates before any rounding, so the
/// figures can differ from a sum over the rounded timestep log in the last
/// decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: usize,
    pub total_generation_kwh: f64,
    pub total_load_kwh: f64,
    pub total_import_kwh: f64,
    pub total_export_kwh: f64,
    pub total_curtailed_kwh: f64,
    pub total_unmet_kwh: f64,
    pub total_charged_kwh: f64,
    pub total_discharged_kwh: f64,
    pub total_import_cost: f64,
    pub total_export_revenue: f64,
    pub total_net_cost: f64,
    /// Share of load not bought from the grid, in percent.
    pub self_sufficiency_pct: f64,
    pub charge_cycles: u64,
    pub discharge_cycles: u64,
    pub peak_soc_kwh: f64,
    pub trough_soc_kwh: f64,
    /// Steps during which the inverter was offline.
    pub inverter_down_steps: usize,
}

impl RunSummary {
    /// Builds the summary from the run totals.
    ///
    /// # Arguments
    ///
    /// * `totals` - Unrounded per-step sums kept by the recorder
    /// * `counters` - Battery statistics kept by the recorder
    pub fn from_totals(totals: &RunTotals, counters: &BatteryCounters) -> Self {
        let self_sufficiency_pct = if totals.load_kwh > 0.0 {
            (100.0 * (1.0 - totals.import_kwh / totals.load_kwh)).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Self {
            steps: totals.steps,
            total_generation_kwh: totals.generation_kwh,
            total_load_kwh: totals.load_kwh,
            total_import_kwh: totals.import_kwh,
            total_export_kwh: totals.export_kwh,
            total_curtailed_kwh: totals.curtailed_kwh,
            total_unmet_kwh: totals.unmet_kwh,
            total_charged_kwh: totals.charged_kwh,
            total_discharged_kwh: totals.discharged_kwh,
            total_import_cost: totals.import_cost,
            total_export_revenue: totals.export_revenue,
            total_net_cost: totals.net_cost,
            self_sufficiency_pct,
            charge_cycles: counters.charge_cycles,
            discharge_cycles: counters.discharge_cycles,
            peak_soc_kwh: counters.peak_soc_kwh,
            trough_soc_kwh: counters.trough_soc_kwh,
            inverter_down_steps: totals.inverter_down_steps,
        }
    }

    /// One-line digest used in the `SIMULATION_END` event.
    pub fn headline(&self) -> String {
        format!(
            "steps={} gen={:.3} load={:.3} import={:.3} export={:.3} curtailed={:.3} unmet={:.3} kWh \
             net_cost={:.2} charge_cycles={} discharge_cycles={}",
            self.steps,
            self.total_generation_kwh,
            self.total_load_kwh,
            self.total_import_kwh,
            self.total_export_kwh,
            self.total_curtailed_kwh,
            self.total_unmet_kwh,
            self.total_net_cost,
            self.charge_cycles,
            self.discharge_cycles,
        )
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(f, "Solar generation:      {:.2} kWh", self.total_generation_kwh)?;
        writeln!(f, "Load:                  {:.2} kWh", self.total_load_kwh)?;
        writeln!(f, "Grid import:           {:.2} kWh", self.total_import_kwh)?;
        writeln!(f, "Grid export:           {:.2} kWh", self.total_export_kwh)?;
        writeln!(f, "Curtailed:             {:.2} kWh", self.total_curtailed_kwh)?;
        writeln!(f, "Unmet load:            {:.2} kWh", self.total_unmet_kwh)?;
        writeln!(f, "Self-sufficiency:      {:.1}%", self.self_sufficiency_pct)?;
        writeln!(
            f,
            "Battery:               {} charge / {} discharge cycles, SoC {:.2}..{:.2} kWh",
            self.charge_cycles, self.discharge_cycles, self.trough_soc_kwh, self.peak_soc_kwh
        )?;
        writeln!(f, "Inverter down steps:   {}", self.inverter_down_steps)?;
        write!(
            f,
            "Cost:                  {:.2} import - {:.2} export = {:.2} net",
            self.total_import_cost, self.total_export_revenue, self.total_net_cost
        )
    }
}
