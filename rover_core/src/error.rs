use thiserror::Error;

/// Runtime faults of the control loop.
///
/// Only `ShapeMismatch` is fatal; every other variant is reported and the
/// loop keeps ticking.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoverError {
    #[error("malformed telemetry: {0}")]
    MalformedTelemetry(String),
    #[error("shape mismatch: model expects {expected} values, window flattens to {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("inference failure: {0}")]
    InferenceFailure(String),
    #[error("channel send failed: {0}")]
    ChannelSend(String),
    #[error("actuator error: {0}")]
    Actuator(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("missing scheduler")]
    MissingScheduler,
    #[error("missing proximity sensors")]
    MissingSensors,
    #[error("missing wheel motors")]
    MissingMotors,
    #[error("missing telemetry receiver")]
    MissingReceiver,
    #[error("missing label emitter")]
    MissingEmitter,
    #[error("missing signature model")]
    MissingModel,
    #[error("model shape mismatch: declared input of {declared} values, window flattens to {window}")]
    ShapeMismatch { declared: usize, window: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
