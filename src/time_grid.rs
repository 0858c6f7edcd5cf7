//! Module implementing the time grid at which trajectories are sampled.
use serde::{Deserialize, Serialize};

use super::error::HHError;
use super::MAX_GRID_POINTS;

/// An ordered, strictly increasing and finite sequence of time points (ms).
/// Deserialization goes through [`TimeGrid::from_times`].
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Create a time grid from arbitrary time points.
    /// The function returns an error for empty grids, non-finite or non-increasing times.
    pub fn from_times(times: Vec<f64>) -> Result<Self, HHError> {
        if times.is_empty() {
            return Err(HHError::InvalidTimeGrid(
                "The time grid must contain at least one point".to_string(),
            ));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(HHError::InvalidTimeGrid(format!(
                "Time points must be finite, got {}",
                t
            )));
        }
        if let Some(w) = times.windows(2).find(|w| w[1] <= w[0]) {
            return Err(HHError::InvalidTimeGrid(format!(
                "Time points must be strictly increasing, got {} followed by {}",
                w[0], w[1]
            )));
        }
        Ok(TimeGrid { times })
    }

    /// Create a uniform time grid on the half-open interval [start, end), i.e., start, start + step, ... < end.
    /// The points are computed as `start + k * step` so that no rounding error accumulates.
    pub fn uniform(start: f64, end: f64, step: f64) -> Result<Self, HHError> {
        if !(start.is_finite() && end.is_finite() && step.is_finite()) {
            return Err(HHError::InvalidTimeGrid(
                "Bounds and step must be finite".to_string(),
            ));
        }
        if step <= 0.0 {
            return Err(HHError::InvalidTimeGrid(format!(
                "The step must be positive, got {}",
                step
            )));
        }
        if start >= end {
            return Err(HHError::InvalidTimeGrid(format!(
                "The interval [{}, {}) is empty",
                start, end
            )));
        }

        let num_points = ((end - start) / step).ceil();
        if num_points > MAX_GRID_POINTS as f64 {
            return Err(HHError::InvalidTimeGrid(format!(
                "The time grid would contain {} points, at most {} are allowed",
                num_points, MAX_GRID_POINTS
            )));
        }
        let num_points = num_points as usize;
        let times = (0..num_points)
            .map(|k| start + k as f64 * step)
            .filter(|&t| t < end)
            .collect();
        TimeGrid::from_times(times)
    }

    /// Returns the time points.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Returns the number of time points.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// A valid time grid is never empty.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the first time point.
    pub fn start(&self) -> f64 {
        self.times[0]
    }

    /// Returns the last time point.
    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }
}

impl TryFrom<Vec<f64>> for TimeGrid {
    type Error = HHError;

    fn try_from(times: Vec<f64>) -> Result<Self, Self::Error> {
        TimeGrid::from_times(times)
    }
}

impl From<TimeGrid> for Vec<f64> {
    fn from(grid: TimeGrid) -> Self {
        grid.times
    }
}
