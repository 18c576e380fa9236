use thiserror::Error;

/// Errors returned by calculators, config builders and the summary reporter.
///
/// Positions without enough history are never errors: they are carried as
/// `None` inside an [`IndicatorSeries`](crate::IndicatorSeries).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The series is empty or shorter than a required window.
    #[error("insufficient data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    /// A window, period, span or lag was zero.
    #[error("invalid parameter {name}: {value} (must be positive)")]
    InvalidParameter { name: &'static str, value: usize },

    /// A bar violates the series ordering or price invariants.
    #[error("invalid series at bar {index}: {reason}")]
    InvalidSeries { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Rejects a zero-valued window parameter.
    pub(crate) fn check_positive(name: &'static str, value: usize) -> Result<usize> {
        if value == 0 {
            tracing::warn!(parameter = name, value, "rejected non-positive parameter");
            return Err(Self::InvalidParameter { name, value });
        }
        Ok(value)
    }
}
