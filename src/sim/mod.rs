/// Virtual clock for timestep management.
pub mod clock;
/// Surplus and deficit dispatch strategies.
pub mod dispatch;
pub mod economics;
pub mod engine;
/// Event log entries.
pub mod event;
/// Grid export/import rules and monthly quota accounting.
pub mod grid;
pub mod kpi;
pub mod power_balance;
pub mod recorder;
pub mod types;
