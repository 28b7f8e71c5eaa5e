use std::time::Duration;
use thiserror::Error;

use crate::StateIndex;

/// A rejected configuration write. The previous value is always retained.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample window {0} out of range (1..=128)")]
    WindowOutOfRange(usize),

    #[error("cycle period {0:?} out of range (10ms..=60s)")]
    PeriodOutOfRange(Duration),

    #[error("hysteresis duration {0:?} above maximum (300s)")]
    HysteresisTooLong(Duration),

    #[error("state bounds inverted: min {min} > max {max}")]
    BoundsInverted { min: StateIndex, max: StateIndex },

    #[error("max state {max} beyond threshold table ({rows} rows)")]
    BoundsBeyondTable { max: StateIndex, rows: usize },

    #[error("state {state} outside threshold table ({rows} rows)")]
    StateOutOfTable { state: StateIndex, rows: usize },

    #[error("threshold entry inverted: down {down} > up {up}")]
    ThresholdInverted { up: f64, down: f64 },

    #[error("threshold must be a finite non-negative number, got {0}")]
    ThresholdNotFinite(f64),

    #[error("boost target {target} outside [{min}, {max}]")]
    BoostOutOfBounds {
        target: StateIndex,
        min: StateIndex,
        max: StateIndex,
    },

    #[error("threshold table is empty")]
    EmptyTable,
}

/// Failure reported by an injected platform capability.
///
/// These are never fatal to the governor: a failed load read reuses the last
/// sample, a failed actuation step is retried against live state and
/// eventually deferred to the next cycle.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("resource busy")]
    Busy,

    #[error("unit unavailable: {0}")]
    Unavailable(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
