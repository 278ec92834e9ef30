// src/error.rs
use thiserror::Error;

/// Library-wide error for gr-histogram.
///
/// Only construction and mutation can fail. Statistical readers report
/// "no data" through `NaN` instead (see [`crate::Histogram::quantile`]).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HistError {
    /// A histogram needs room for at least one bin.
    #[error("histogram: capacity must be at least 1 (got {capacity})")]
    InvalidCapacity { capacity: usize },

    /// NaN/±inf would break the ascending order of the bin store.
    /// `context` pinpoints where it came from (e.g., "sample value", "sample weight").
    #[error(
        "histogram: non-finite values are not allowed ({context}). \
hint: drop NaN/±inf before adding observations"
    )]
    NonFiniteInput { context: &'static str },

    /// Weights are mass; a zero or negative weight carries no information.
    #[error("histogram: weight must be > 0 (got {weight})")]
    NonPositiveWeight { weight: f64 },
}

pub type HistResult<T> = Result<T, HistError>;
