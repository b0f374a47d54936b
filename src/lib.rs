//! Stochastic solar-plus-battery microgrid simulator.

pub mod config;
pub mod devices;
pub mod error;
pub mod io;
pub mod runner;
/// Simulation engine, dispatch, grid policy, and recording modules.
pub mod sim;
pub mod telemetry;

pub use error::SimError;
