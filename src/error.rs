//! Errors raised by the scoring core.
//!
//! Every variant describes bad configuration (a metric range or a weight)
//! except [`ScoreError::NonFiniteValue`], which rejects a NaN reading. None of
//! them are retried: the caller aborts the affected run and keeps the last
//! good result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("metric range has zero width (min = max = {min})")]
    ZeroWidthRange { min: f64 },

    #[error("metric range is inverted (min {min} > max {max})")]
    InvertedRange { min: f64, max: f64 },

    #[error("metric range bounds and width must be finite (min {min}, max {max})")]
    NonFiniteRange { min: f64, max: f64 },

    #[error("weight for metric '{metric}' is negative ({weight})")]
    NegativeWeight { metric: String, weight: f64 },

    #[error("weight for metric '{metric}' is not a finite number")]
    NonFiniteWeight { metric: String },

    #[error("raw value is not a number")]
    NonFiniteValue,
}

impl ScoreError {
    /// Returns `true` for errors caused by configuration rather than input data.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ScoreError::NonFiniteValue)
    }
}
