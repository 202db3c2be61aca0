use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LiftError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
    #[error("monitor disconnected")]
    Disconnected,
}

/// Why the elevator entered the Error state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FaultReason {
    #[error("floor sensors {0:?} active at the same time")]
    MultipleFloorsActive(Vec<usize>),
    #[error("arrival at floor {0} confirmed while moving with no target")]
    ArrivalWithoutTarget(usize),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor gateway")]
    MissingSensors,
    #[error("missing actuator gateway")]
    MissingActuators,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
