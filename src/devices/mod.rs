//! Site component models: battery, PV array, weather, demand, and inverter reliability.

/// Stationary battery storage model.
pub mod battery;
/// Household demand generator.
pub mod demand;
/// Inverter failure and recovery model.
pub mod inverter;
/// Solar photovoltaic generation model.
pub mod solar;
pub mod types;
/// Season-dependent daily cloud sampling.
pub mod weather;

// Re-export the main types for convenience
pub use battery::Battery;
pub use demand::DemandModel;
pub use inverter::{Inverter, Outage};
pub use solar::SolarArray;
pub use weather::{Season, WeatherState};
