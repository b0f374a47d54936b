use std::fmt;

use serde::Serialize;

use crate::devices::types::hour_of_day;

/// Kind of state transition recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    SimulationStart,
    SimulationEnd,
    DailyUpdate,
    InverterFailure,
    InverterRecovery,
    MonthReset,
    BatteryChargeStart,
    BatteryDischargeStart,
    BatteryFull,
    BatteryLow,
    SolarCurtailment,
    UnmetLoad,
    Warning,
}

impl EventCategory {
    /// Log label, e.g. `BATTERY_FULL`.
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::SimulationStart => "SIMULATION_START",
            EventCategory::SimulationEnd => "SIMULATION_END",
            EventCategory::DailyUpdate => "DAILY_UPDATE",
            EventCategory::InverterFailure => "INVERTER_FAILURE",
            EventCategory::InverterRecovery => "INVERTER_RECOVERY",
            EventCategory::MonthReset => "MONTH_RESET",
            EventCategory::BatteryChargeStart => "BATTERY_CHARGE_START",
            EventCategory::BatteryDischargeStart => "BATTERY_DISCHARGE_START",
            EventCategory::BatteryFull => "BATTERY_FULL",
            EventCategory::BatteryLow => "BATTERY_LOW",
            EventCategory::SolarCurtailment => "SOLAR_CURTAILMENT",
            EventCategory::UnmetLoad => "UNMET_LOAD",
            EventCategory::Warning => "WARNING",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the chronological event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Virtual time of the transition (minutes).
    pub time_min: u64,
    /// Hour of day (0..24).
    pub hour: u64,
    #[serde(rename = "event_type")]
    pub category: EventCategory,
    #[serde(rename = "description")]
    pub detail: String,
}

impl EventRecord {
    /// Creates an entry at `time_min`, deriving the hour of day.
    pub fn new(time_min: u64, category: EventCategory, detail: impl Into<String>) -> Self {
        Self {
            time_min,
            hour: hour_of_day(time_min),
            category,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[t={:>6} {:>2}h] {:<23} {}",
            self.time_min, self.hour, self.category, self.detail
        )
    }
}
