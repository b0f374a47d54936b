//! Site energy balance computation.

use super::dispatch::DispatchOutcome;

/// Net site energy for a step: generation minus load, in kWh.
///
/// Positive values are surplus, negative values are deficit.
///
/// # Arguments
///
/// * `generation_kw` - Solar AC output (kW)
/// * `load_kw` - Household demand (kW)
/// * `dt_hours` - Step length in hours
pub fn net_energy_kwh(generation_kw: f64, load_kw: f64, dt_hours: f64) -> f64 {
    (generation_kw - load_kw) * dt_hours
}

/// Returns how far a dispatch outcome is from balancing `net_kwh`.
///
/// All flows are bus-side, so a consistent dispatch satisfies
/// `net = charged + export + curtailed - discharged - import - unmet`
/// and this residual is zero up to float noise.
pub fn balance_residual_kwh(net_kwh: f64, out: &DispatchOutcome) -> f64 {
    let absorbed = out.charged_kwh + out.export_kwh + out.curtailed_kwh;
    let supplied = out.discharged_kwh + out.import_kwh + out.unmet_kwh;
    net_kwh - (absorbed - supplied)
}
