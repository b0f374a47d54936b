//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::devices::Season;
use crate::sim::dispatch::DispatchStrategy;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run timing, seed, strategy, and season.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Inverter rating and reliability.
    #[serde(default)]
    pub inverter: InverterConfig,
    /// Grid export/import rules.
    #[serde(default)]
    pub grid: GridConfig,
    /// Tariff.
    #[serde(default)]
    pub economics: EconomicsConfig,
    /// Household demand.
    #[serde(default)]
    pub load: LoadConfig,
    /// PV array.
    #[serde(default)]
    pub solar: SolarConfig,
}

/// Run timing and global parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Step length in minutes (must be > 0).
    pub timestep_minutes: u64,
    /// Number of days to simulate (must be > 0).
    pub days: u64,
    /// Master random seed.
    pub seed: u64,
    /// Dispatch strategy: `"load_priority"`, `"charge_priority"`, or `"produce_priority"`.
    pub strategy: String,
    pub season: Season,
    /// Initial state of charge as a fraction of capacity (0.0-1.0).
    pub initial_soc: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep_minutes: 30,
            days: 7,
            seed: 42,
            strategy: DispatchStrategy::LoadPriority.as_str().to_string(),
            season: Season::Summer,
            initial_soc: 0.5,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total energy capacity (kWh).
    pub capacity_kwh: f64,
    /// Round-trip efficiency (0.0-1.0), split evenly between charge and discharge.
    pub round_trip_efficiency: f64,
    /// Reserve floor as a fraction of capacity.
    pub min_soc_fraction: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 5.0,
            round_trip_efficiency: 0.9,
            min_soc_fraction: 0.05,
        }
    }
}

/// Inverter rating and reliability.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InverterConfig {
    /// AC output ceiling (kW).
    pub max_output_kw: f64,
    /// Probability of a failure per day (0.0-1.0).
    pub failure_frequency: f64,
    /// Mean outage duration (hours).
    pub mean_outage_hours: f64,
}

impl Default for InverterConfig {
    fn default() -> Self {
        Self {
            max_output_kw: 5.0,
            failure_frequency: 0.05,
            mean_outage_hours: 7.0,
        }
    }
}

/// Grid export/import rules.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Maximum export power (kW).
    pub export_limit_kw: f64,
    /// Export allowance per billing month (kWh).
    pub monthly_export_quota_kwh: f64,
    /// Billing month length in days (must be > 0).
    pub month_length_days: u64,
    /// Maximum import power (kW). Unset means import is unconstrained.
    pub import_limit_kw: Option<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            export_limit_kw: 5.0,
            monthly_export_quota_kwh: 200.0,
            month_length_days: 30,
            import_limit_kw: None,
        }
    }
}

/// Tariff.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicsConfig {
    pub import_cost_per_kwh: f64,
    pub export_revenue_per_kwh: f64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            import_cost_per_kwh: 0.25,
            export_revenue_per_kwh: 0.08,
        }
    }
}

/// Household demand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Always-on consumption (kW).
    pub base_kw: f64,
    /// Upper bound of a random demand spike (kW).
    pub peak_kw: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_kw: 0.9,
            peak_kw: 3.5,
        }
    }
}

/// PV array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Clear-sky output at solar noon (kW).
    pub peak_kw: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self { peak_kw: 4.0 }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.timestep_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the winter-outages preset: short cloudy days and an unreliable inverter.
    pub fn winter_outages() -> Self {
        Self {
            simulation: SimulationConfig {
                season: Season::Winter,
                ..SimulationConfig::default()
            },
            inverter: InverterConfig {
                failure_frequency: 0.2,
                mean_outage_hours: 14.0,
                ..InverterConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the export-capped preset: export-first dispatch against a tight quota.
    pub fn export_capped() -> Self {
        Self {
            simulation: SimulationConfig {
                strategy: DispatchStrategy::ProducePriority.as_str().to_string(),
                ..SimulationConfig::default()
            },
            grid: GridConfig {
                export_limit_kw: 2.0,
                monthly_export_quota_kwh: 10.0,
                month_length_days: 7,
                ..GridConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "winter_outages", "export_capped"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "winter_outages" => Ok(Self::winter_outages()),
            "export_capped" => Ok(Self::export_capped()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e: toml::de::Error| ConfigError::new("toml", e.to_string()))
    }

    /// Total simulated minutes.
    pub fn total_minutes(&self) -> u64 {
        self.simulation.days.saturating_mul(crate::devices::types::MINUTES_PER_DAY)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut non_negative = |field: &str, value: f64| {
            if value.is_nan() || value < 0.0 {
                errors.push(ConfigError::new(field, format!("must be >= 0, got {value}")));
            }
        };

        non_negative("inverter.max_output_kw", self.inverter.max_output_kw);
        non_negative("inverter.mean_outage_hours", self.inverter.mean_outage_hours);
        non_negative("grid.export_limit_kw", self.grid.export_limit_kw);
        non_negative("grid.monthly_export_quota_kwh", self.grid.monthly_export_quota_kwh);
        if let Some(limit) = self.grid.import_limit_kw {
            non_negative("grid.import_limit_kw", limit);
        }
        non_negative("economics.import_cost_per_kwh", self.economics.import_cost_per_kwh);
        non_negative("economics.export_revenue_per_kwh", self.economics.export_revenue_per_kwh);
        non_negative("load.base_kw", self.load.base_kw);
        non_negative("load.peak_kw", self.load.peak_kw);
        non_negative("solar.peak_kw", self.solar.peak_kw);

        let s = &self.simulation;
        if s.timestep_minutes == 0 {
            errors.push(ConfigError::new("simulation.timestep_minutes", "must be > 0"));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if s.strategy.parse::<DispatchStrategy>().is_err() {
            errors.push(ConfigError::new(
                "simulation.strategy",
                format!(
                    "must be one of {}, got \"{}\"",
                    DispatchStrategy::valid_names(),
                    s.strategy
                ),
            ));
        }
        if !(0.0..=1.0).contains(&s.initial_soc) {
            errors.push(ConfigError::new("simulation.initial_soc", "must be in [0.0, 1.0]"));
        }

        let bat = &self.battery;
        if bat.capacity_kwh.is_nan() || bat.capacity_kwh <= 0.0 {
            errors.push(ConfigError::new("battery.capacity_kwh", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&bat.round_trip_efficiency) {
            errors.push(ConfigError::new(
                "battery.round_trip_efficiency",
                "must be in [0.0, 1.0]",
            ));
        }
        if !(0.0..1.0).contains(&bat.min_soc_fraction) {
            errors.push(ConfigError::new("battery.min_soc_fraction", "must be in [0.0, 1.0)"));
        }

        if !(0.0..=1.0).contains(&self.inverter.failure_frequency) {
            errors.push(ConfigError::new(
                "inverter.failure_frequency",
                "must be in [0.0, 1.0]",
            ));
        }
        if self.grid.month_length_days == 0 {
            errors.push(ConfigError::new("grid.month_length_days", "must be > 0"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn baseline_defaults() {
        let cfg = ScenarioConfig::baseline();
        assert_eq!(cfg.simulation.timestep_minutes, 30);
        assert_eq!(cfg.simulation.days, 7);
        assert_eq!(cfg.simulation.strategy, "load_priority");
        assert_eq!(cfg.battery.capacity_kwh, 5.0);
        assert_eq!(cfg.grid.import_limit_kw, None);
        assert_eq!(cfg.total_minutes(), 7 * 1440);
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert_eq!(e.field, "preset");
        assert!(e.message.contains("unknown preset"));
        assert!(e.message.contains("winter_outages"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
timestep_minutes = 15
days = 2
seed = 99
strategy = "charge_priority"
season = "winter"
initial_soc = 0.2

[battery]
capacity_kwh = 13.5
round_trip_efficiency = 0.85
min_soc_fraction = 0.1

[inverter]
max_output_kw = 6.0
failure_frequency = 0.1
mean_outage_hours = 10.0

[grid]
export_limit_kw = 3.0
monthly_export_quota_kwh = 50.0
month_length_days = 28
import_limit_kw = 7.5

[economics]
import_cost_per_kwh = 0.30
export_revenue_per_kwh = 0.05

[load]
base_kw = 1.1
peak_kw = 4.0

[solar]
peak_kw = 6.5
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.timestep_minutes), Some(15));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.season), Some(Season::Winter));
        assert_eq!(cfg.as_ref().map(|c| &*c.simulation.strategy), Some("charge_priority"));
        assert_eq!(cfg.as_ref().and_then(|c| c.grid.import_limit_kw), Some(7.5));
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
days = 2
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn invalid_season_is_rejected_at_parse() {
        let toml = r#"
[simulation]
season = "monsoon"
"#;
        let err = ScenarioConfig::from_toml_str(toml).unwrap_err();
        assert_eq!(err.field, "toml");
    }

    #[test]
    fn validation_reports_every_violation() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.timestep_minutes = 0;
        cfg.simulation.strategy = "greedy".to_string();
        cfg.battery.capacity_kwh = 0.0;
        cfg.battery.round_trip_efficiency = 1.5;
        cfg.grid.month_length_days = 0;
        cfg.load.peak_kw = -1.0;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        for expected in [
            "simulation.timestep_minutes",
            "simulation.strategy",
            "battery.capacity_kwh",
            "battery.round_trip_efficiency",
            "grid.month_length_days",
            "load.peak_kw",
        ] {
            assert!(fields.iter().any(|f| f == expected), "missing {expected}: {fields:?}");
        }
    }

    #[test]
    fn validation_catches_invalid_soc() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.initial_soc = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.initial_soc"));
    }

    #[test]
    fn validation_rejects_negative_import_limit() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.grid.import_limit_kw = Some(-2.0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "grid.import_limit_kw"));
    }

    #[test]
    fn zero_round_trip_is_valid() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.round_trip_efficiency = 0.0;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn winter_outages_is_less_reliable() {
        let base = ScenarioConfig::baseline();
        let winter = ScenarioConfig::winter_outages();
        assert_eq!(winter.simulation.season, Season::Winter);
        assert!(winter.inverter.failure_frequency > base.inverter.failure_frequency);
        assert!(winter.inverter.mean_outage_hours > base.inverter.mean_outage_hours);
    }

    #[test]
    fn export_capped_tightens_grid() {
        let cfg = ScenarioConfig::export_capped();
        assert_eq!(cfg.simulation.strategy, "produce_priority");
        assert_eq!(cfg.grid.export_limit_kw, 2.0);
        assert_eq!(cfg.grid.monthly_export_quota_kwh, 10.0);
        assert_eq!(cfg.grid.month_length_days, 7);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // seed overridden
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        // timestep kept default
        assert_eq!(cfg.as_ref().map(|c| c.simulation.timestep_minutes), Some(30));
        // solar kept default
        assert_eq!(cfg.as_ref().map(|c| c.solar.peak_kw), Some(4.0));
    }
}
