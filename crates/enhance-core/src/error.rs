//! Error types for the enhancement engine

use enhance_common::TargetEvent;
use thiserror::Error;

/// Failures of a single plugin's execution.
///
/// Cancellation is never an error: a canceled plugin resolves to
/// `PluginOutcome::Canceled`. An `Err` from a plugin is an unrecoverable
/// plugin-internal fault, isolated to that plugin's contribution.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("invalid plugin input: {0}")]
    InvalidInput(String),

    #[error("plugin execution failed: {0}")]
    ExecutionFailed(String),

    #[error("event channel closed while waiting for {0}")]
    EventChannelClosed(TargetEvent),

    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Failures of layer construction and lifecycle calls
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no resolvable target element for layer construction")]
    MissingTarget,

    #[error("layer is unmounted; no further transitions permitted")]
    Unmounted,

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
