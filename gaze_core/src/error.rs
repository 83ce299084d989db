// Typed errors with thiserror. The WASM facade turns these into JS strings.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid zone: {0}, valid zoom targets: a, b, c, f")]
    InvalidZone(String),

    #[error("Invalid zoom scale: {0}, must be finite, positive and not 1.0")]
    InvalidScale(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid gaze sample: {0}")]
    InvalidSample(String),

    #[error("Zoom observer failed: {0}")]
    Observer(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
