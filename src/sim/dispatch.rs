//! Per-timestep energy dispatch: how surplus solar is split between the
//! battery and the grid, and how deficits are covered.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::devices::Battery;
use crate::error::SimError;

use super::grid::GridPolicy;
use super::types::FLOW_EPSILON_KWH;

/// Policy for allocating surplus solar energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStrategy {
    /// Fill the battery first, export what is left while quota remains.
    LoadPriority,
    /// Fill the battery first, export only once it is (nearly) full.
    ChargePriority,
    /// Export first up to the rate limit and quota, then charge with the rest.
    ProducePriority,
}

impl DispatchStrategy {
    /// All strategies, in the order they are listed to users.
    pub const ALL: [DispatchStrategy; 3] = [
        DispatchStrategy::LoadPriority,
        DispatchStrategy::ChargePriority,
        DispatchStrategy::ProducePriority,
    ];

    /// Configuration name of the strategy.
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchStrategy::LoadPriority => "load_priority",
            DispatchStrategy::ChargePriority => "charge_priority",
            DispatchStrategy::ProducePriority => "produce_priority",
        }
    }

    /// Comma-separated list of valid strategy names.
    pub fn valid_names() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchStrategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| SimError::UnknownStrategy(s.to_string()))
    }
}

/// Energy flows decided for one timestep (all kWh, all non-negative).
///
/// Flows are measured at the site bus, so for every step
/// `net = charged + export + curtailed - discharged - import - unmet`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Bus energy taken into the battery (before charge loss).
    pub charged_kwh: f64,
    /// Bus energy delivered by the battery (after discharge loss).
    pub discharged_kwh: f64,
    pub import_kwh: f64,
    pub export_kwh: f64,
    pub curtailed_kwh: f64,
    pub unmet_kwh: f64,
}

impl DispatchOutcome {
    /// Returns `true` when the battery took in energy this step.
    pub fn is_charging(&self) -> bool {
        self.charged_kwh > FLOW_EPSILON_KWH
    }

    /// Returns `true` when the battery delivered energy this step.
    pub fn is_discharging(&self) -> bool {
        self.discharged_kwh > FLOW_EPSILON_KWH
    }
}

/// Dispatches one step's net energy under `strategy`.
///
/// Mutates the battery SoC and the grid's monthly export total. The caller
/// clamps the SoC afterwards.
///
/// # Arguments
///
/// * `strategy` - Surplus allocation policy
/// * `net_kwh` - Generation minus load for the step (kWh)
/// * `dt_hours` - Step length in hours (scales the export/import rate limits)
/// * `battery` - Battery state, charged or discharged in place
/// * `grid` - Grid policy, export quota consumed in place
pub fn dispatch(
    strategy: DispatchStrategy,
    net_kwh: f64,
    dt_hours: f64,
    battery: &mut Battery,
    grid: &mut GridPolicy,
) -> DispatchOutcome {
    if net_kwh > 0.0 {
        dispatch_surplus(strategy, net_kwh, dt_hours, battery, grid)
    } else {
        dispatch_deficit(-net_kwh, dt_hours, battery, grid)
    }
}

/// Splits `surplus_kwh` into charge, export, and curtailment.
pub fn dispatch_surplus(
    strategy: DispatchStrategy,
    surplus_kwh: f64,
    dt_hours: f64,
    battery: &mut Battery,
    grid: &mut GridPolicy,
) -> DispatchOutcome {
    let mut out = DispatchOutcome::default();

    match strategy {
        DispatchStrategy::LoadPriority => {
            out.charged_kwh = battery.charge(surplus_kwh);
            let leftover = surplus_kwh - out.charged_kwh;
            out.export_kwh = grid.export(leftover, dt_hours);
            out.curtailed_kwh = leftover - out.export_kwh;
        }
        DispatchStrategy::ChargePriority => {
            out.charged_kwh = battery.charge(surplus_kwh);
            let leftover = surplus_kwh - out.charged_kwh;
            if battery.is_full() {
                out.export_kwh = grid.export(leftover, dt_hours);
            }
            out.curtailed_kwh = leftover - out.export_kwh;
        }
        DispatchStrategy::ProducePriority => {
            // Quota exhausted: export() returns 0 and the whole surplus goes to charging.
            out.export_kwh = grid.export(surplus_kwh, dt_hours);
            let residual = surplus_kwh - out.export_kwh;
            out.charged_kwh = battery.charge(residual);
            out.curtailed_kwh = residual - out.charged_kwh;
        }
    }

    out.curtailed_kwh = out.curtailed_kwh.max(0.0);
    out
}

/// Covers `required_kwh` from the battery, then from the grid.
///
/// Without an import cap the grid always covers the residual, so
/// `unmet_kwh` stays zero.
pub fn dispatch_deficit(
    required_kwh: f64,
    dt_hours: f64,
    battery: &mut Battery,
    grid: &GridPolicy,
) -> DispatchOutcome {
    let mut out = DispatchOutcome {
        discharged_kwh: battery.discharge(required_kwh),
        ..DispatchOutcome::default()
    };

    let remaining = required_kwh - out.discharged_kwh;
    if remaining > FLOW_EPSILON_KWH {
        out.import_kwh = match grid.import_cap_kwh(dt_hours) {
            Some(cap) => remaining.min(cap),
            None => remaining,
        };
        let unmet = remaining - out.import_kwh;
        if unmet > FLOW_EPSILON_KWH {
            out.unmet_kwh = unmet;
        }
    }

    out
}
