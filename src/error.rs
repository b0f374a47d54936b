//! Crate-wide error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::sim::dispatch::DispatchStrategy;

/// Errors surfaced to callers of the simulator.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown dispatch strategy \"{0}\", expected one of: {}", DispatchStrategy::valid_names())]
    UnknownStrategy(String),

    #[error("invalid scenario: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),

    #[error("invalid run timing: {0}")]
    InvalidTiming(String),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
