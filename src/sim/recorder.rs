//! Observes engine transitions and keeps the two run logs.
//!
//! The recorder appends one [`TimestepRecord`] per step and an
//! [`EventRecord`] only when something changes: a flow starting, a SoC
//! threshold being crossed, the inverter coming back. It performs no I/O.

use serde::Serialize;

use crate::devices::Battery;

use super::dispatch::DispatchOutcome;
use super::economics::Settlement;
use super::event::{EventCategory, EventRecord};
use super::types::{FLOW_EPSILON_KWH, SOC_RISE_TOLERANCE_KWH, TimestepRecord};

/// Running battery statistics maintained across the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BatteryCounters {
    /// Number of idle/discharging -> charging transitions.
    pub charge_cycles: u64,
    /// Number of idle/charging -> discharging transitions.
    pub discharge_cycles: u64,
    /// Highest SoC seen (kWh).
    pub peak_soc_kwh: f64,
    /// Lowest SoC seen (kWh).
    pub trough_soc_kwh: f64,
}

/// Unrounded energy and money totals accumulated step by step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunTotals {
    pub steps: usize,
    pub generation_kwh: f64,
    pub load_kwh: f64,
    pub import_kwh: f64,
    pub export_kwh: f64,
    pub curtailed_kwh: f64,
    pub unmet_kwh: f64,
    pub charged_kwh: f64,
    pub discharged_kwh: f64,
    pub import_cost: f64,
    pub export_revenue: f64,
    pub net_cost: f64,
    pub inverter_down_steps: usize,
}

impl RunTotals {
    /// Adds one step's flows and settlement.
    pub fn add_step(
        &mut self,
        gen_kwh: f64,
        load_kwh: f64,
        out: &DispatchOutcome,
        money: &Settlement,
        inverter_ok: bool,
    ) {
        self.steps += 1;
        self.generation_kwh += gen_kwh;
        self.load_kwh += load_kwh;
        self.import_kwh += out.import_kwh;
        self.export_kwh += out.export_kwh;
        self.curtailed_kwh += out.curtailed_kwh;
        self.unmet_kwh += out.unmet_kwh;
        self.charged_kwh += out.charged_kwh;
        self.discharged_kwh += out.discharged_kwh;
        self.import_cost += money.import_cost;
        self.export_revenue += money.export_revenue;
        self.net_cost += money.net_cost;
        if !inverter_ok {
            self.inverter_down_steps += 1;
        }
    }
}

/// Append-only timestep and event logs plus the edge detectors that feed them.
#[derive(Debug, Clone)]
pub struct Recorder {
    timesteps: Vec<TimestepRecord>,
    events: Vec<EventRecord>,
    counters: BatteryCounters,
    totals: RunTotals,
    charging: bool,
    discharging: bool,
    was_full: bool,
    was_low: bool,
    inverter_was_ok: bool,
}

impl Recorder {
    /// Creates an empty recorder primed with the battery's starting state.
    ///
    /// A battery that starts full or low does not emit a threshold event
    /// until it leaves and re-enters that band.
    pub fn new(battery: &Battery, expected_steps: usize) -> Self {
        Self {
            timesteps: Vec::with_capacity(expected_steps),
            events: Vec::new(),
            counters: BatteryCounters {
                peak_soc_kwh: battery.soc_kwh,
                trough_soc_kwh: battery.soc_kwh,
                ..BatteryCounters::default()
            },
            totals: RunTotals::default(),
            charging: false,
            discharging: false,
            was_full: battery.is_full(),
            was_low: battery.is_low(),
            inverter_was_ok: true,
        }
    }

    /// Appends an event at `time_min`.
    pub fn event(&mut self, time_min: u64, category: EventCategory, detail: impl Into<String>) {
        self.events.push(EventRecord::new(time_min, category, detail));
    }

    /// Compares this step's inverter availability with the previous step's.
    ///
    /// Emits `INVERTER_RECOVERY` once on the down -> up edge.
    pub fn observe_inverter(&mut self, time_min: u64, available: bool) {
        if available && !self.inverter_was_ok {
            self.event(time_min, EventCategory::InverterRecovery, "inverter back online");
        }
        self.inverter_was_ok = available;
    }

    /// Updates SoC trackers and flow flags after the step's dispatch.
    pub fn observe_battery(&mut self, time_min: u64, battery: &Battery, out: &DispatchOutcome) {
        let soc = battery.soc_kwh;
        self.counters.peak_soc_kwh = self.counters.peak_soc_kwh.max(soc);
        self.counters.trough_soc_kwh = self.counters.trough_soc_kwh.min(soc);

        let full = battery.is_full();
        if full && !self.was_full {
            self.event(
                time_min,
                EventCategory::BatteryFull,
                format!("battery reached {:.1}% ({soc:.3} kWh)", battery.soc_fraction() * 100.0),
            );
        }
        self.was_full = full;

        let low = battery.is_low();
        if low && !self.was_low {
            self.event(
                time_min,
                EventCategory::BatteryLow,
                format!("battery at floor {:.1}% ({soc:.3} kWh)", battery.soc_fraction() * 100.0),
            );
        }
        self.was_low = low;

        let charging = out.is_charging();
        if charging && !self.charging {
            self.counters.charge_cycles += 1;
            self.event(
                time_min,
                EventCategory::BatteryChargeStart,
                format!("charge cycle #{} started", self.counters.charge_cycles),
            );
        }
        self.charging = charging;

        let discharging = out.is_discharging();
        if discharging && !self.discharging {
            self.counters.discharge_cycles += 1;
            self.event(
                time_min,
                EventCategory::BatteryDischargeStart,
                format!("discharge cycle #{} started", self.counters.discharge_cycles),
            );
        }
        self.discharging = discharging;
    }

    /// Flags a SoC rise during a deficit step.
    ///
    /// Emits a `WARNING` event and returns `true` when `net_kwh` is a real
    /// deficit and SoC climbed by more than [`SOC_RISE_TOLERANCE_KWH`].
    /// The run carries on either way.
    pub fn observe_soc_direction(
        &mut self,
        time_min: u64,
        net_kwh: f64,
        soc_before: f64,
        soc_after: f64,
    ) -> bool {
        if net_kwh >= -FLOW_EPSILON_KWH || soc_after <= soc_before + SOC_RISE_TOLERANCE_KWH {
            return false;
        }
        self.event(
            time_min,
            EventCategory::Warning,
            format!("SoC rose from {soc_before:.6} to {soc_after:.6} kWh despite net {net_kwh:.6} kWh"),
        );
        true
    }

    /// Folds one step's unrounded flows and settlement into the run totals.
    pub fn accumulate(
        &mut self,
        gen_kwh: f64,
        load_kwh: f64,
        out: &DispatchOutcome,
        money: &Settlement,
        inverter_ok: bool,
    ) {
        self.totals.add_step(gen_kwh, load_kwh, out, money, inverter_ok);
    }

    /// Appends a finished timestep record.
    pub fn record_step(&mut self, record: TimestepRecord) {
        self.timesteps.push(record);
    }

    pub fn counters(&self) -> &BatteryCounters {
        &self.counters
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    pub fn timesteps(&self) -> &[TimestepRecord] {
        &self.timesteps
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Hands over both logs.
    pub fn into_logs(self) -> (Vec<TimestepRecord>, Vec<EventRecord>) {
        (self.timesteps, self.events)
    }
}
