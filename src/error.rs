//! Error module for the Rusty HH library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum HHError {
    /// Error for an empty, non-finite or non-increasing time grid.
    InvalidTimeGrid(String),
    /// Error for invalid parameters, e.g., non-positive tolerances or a non-finite initial state.
    InvalidParameter(String),
    /// The adaptive step size fell below the minimum allowed step.
    StepSizeUnderflow { time: f64, step: f64 },
    /// The step budget was exhausted before reaching the next grid point.
    MaxStepsExceeded { time: f64, max_steps: usize },
    /// An accepted step produced NaN or infinite state values.
    NonFiniteState { time: f64 },
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for HHError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HHError::InvalidTimeGrid(e) => write!(f, "Invalid time grid: {}", e),
            HHError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            HHError::StepSizeUnderflow { time, step } => write!(
                f,
                "Integration failed at t={}: step size {:e} below the minimum step",
                time, step
            ),
            HHError::MaxStepsExceeded { time, max_steps } => write!(
                f,
                "Integration failed at t={}: more than {} steps required to reach the next time point",
                time, max_steps
            ),
            HHError::NonFiniteState { time } => {
                write!(f, "Integration failed at t={}: non-finite state", time)
            }
            HHError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for HHError {}

impl From<std::io::Error> for HHError {
    fn from(e: std::io::Error) -> Self {
        HHError::IOError(e.to_string())
    }
}

impl From<csv::Error> for HHError {
    fn from(e: csv::Error) -> Self {
        HHError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for HHError {
    fn from(e: serde_json::Error) -> Self {
        HHError::IOError(e.to_string())
    }
}

impl HHError {
    /// Returns true if the error comes from the numerical integration.
    pub fn is_integration_failure(&self) -> bool {
        matches!(
            self,
            HHError::StepSizeUnderflow { .. }
                | HHError::MaxStepsExceeded { .. }
                | HHError::NonFiniteState { .. }
        )
    }
}
