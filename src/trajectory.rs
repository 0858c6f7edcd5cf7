//! Module implementing the trajectory of the membrane, i.e., its state sampled on a time grid.
use itertools::{izip, Itertools};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::error::HHError;
use super::membrane::{leak_current, potassium_current, sodium_current, BiophysicalConstants, Stimulus};
use super::state::State;
use super::time_grid::TimeGrid;

/// The state of the membrane at every point of a time grid.
/// A trajectory is immutable once computed.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryData")]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<State>,
}

#[derive(Deserialize)]
struct TrajectoryData {
    times: Vec<f64>,
    states: Vec<State>,
}

impl TryFrom<TrajectoryData> for Trajectory {
    type Error = HHError;

    fn try_from(data: TrajectoryData) -> Result<Self, Self::Error> {
        let grid = TimeGrid::from_times(data.times)?;
        Trajectory::build(&grid, data.states)
    }
}

/// The currents (uA/cm^2) recomputed along a trajectory.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct CurrentTraces {
    pub sodium: Vec<f64>,
    pub potassium: Vec<f64>,
    pub leak: Vec<f64>,
    pub stimulus: Vec<f64>,
}

impl Trajectory {
    /// Create a trajectory from a time grid and the corresponding states.
    /// The function returns an error if there is not exactly one state per time point.
    pub fn build(grid: &TimeGrid, states: Vec<State>) -> Result<Self, HHError> {
        if states.len() != grid.len() {
            return Err(HHError::InvalidParameter(format!(
                "Expected {} states, one per time point, got {}",
                grid.len(),
                states.len()
            )));
        }
        Ok(Trajectory {
            times: grid.times().to_vec(),
            states,
        })
    }

    /// Returns the time points of the trajectory.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Returns the states of the trajectory.
    pub fn states(&self) -> &[State] {
        &self.states[..]
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns an iterator over (time, state) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }

    /// Returns the membrane potential trace.
    pub fn voltages(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.v).collect()
    }

    /// Returns the sodium activation trace.
    pub fn m(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.m).collect()
    }

    /// Returns the sodium inactivation trace.
    pub fn h(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.h).collect()
    }

    /// Returns the potassium activation trace.
    pub fn n(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.n).collect()
    }

    /// Recompute the ionic and injected currents along the trajectory.
    pub fn currents(&self, constants: &BiophysicalConstants, stimulus: &Stimulus) -> CurrentTraces {
        let mut traces = CurrentTraces::default();
        for (t, s) in self.iter() {
            traces.sodium.push(sodium_current(constants, s.v, s.m, s.h));
            traces.potassium.push(potassium_current(constants, s.v, s.n));
            traces.leak.push(leak_current(constants, s.v));
            traces.stimulus.push(stimulus.current(t));
        }
        traces
    }

    /// Returns the times at which the membrane potential crosses the threshold upwards.
    /// Crossing times are linearly interpolated between the two surrounding samples.
    pub fn upward_crossings(&self, threshold: f64) -> Vec<f64> {
        izip!(self.times.iter(), self.states.iter())
            .tuple_windows()
            .filter(|((_, s0), (_, s1))| s0.v < threshold && s1.v >= threshold)
            .map(|((t0, s0), (t1, s1))| t0 + (threshold - s0.v) / (s1.v - s0.v) * (t1 - t0))
            .collect()
    }

    /// Save the trajectory as JSON.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), HHError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a trajectory saved as JSON.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Trajectory, HHError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn toy_trajectory() -> Trajectory {
        let grid = TimeGrid::uniform(0.0, 6.0, 1.0).unwrap();
        let states = [-65.0, -10.0, 30.0, -70.0, 10.0, 20.0]
            .iter()
            .map(|&v| State::new(v, 0.1, 0.5, 0.3))
            .collect();
        Trajectory::build(&grid, states).unwrap()
    }

    #[test]
    fn test_build_checks_lengths() {
        let grid = TimeGrid::uniform(0.0, 3.0, 1.0).unwrap();
        assert!(Trajectory::build(&grid, vec![State::new(0.0, 0.0, 0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_upward_crossings() {
        let trajectory = toy_trajectory();
        let crossings = trajectory.upward_crossings(0.0);
        assert_eq!(crossings.len(), 2);
        assert_relative_eq!(crossings[0], 1.25);
        assert_relative_eq!(crossings[1], 3.875);
        assert!(trajectory.upward_crossings(100.0).is_empty());
    }

    #[test]
    fn test_columns_and_currents() {
        let trajectory = toy_trajectory();
        assert_eq!(trajectory.voltages(), vec![-65.0, -10.0, 30.0, -70.0, 10.0, 20.0]);
        assert_eq!(trajectory.m(), vec![0.1; 6]);
        assert_eq!(trajectory.h(), vec![0.5; 6]);
        assert_eq!(trajectory.n(), vec![0.3; 6]);

        let constants = BiophysicalConstants::default();
        let currents = trajectory.currents(&constants, &Stimulus::constant(2.5, 4.0));
        assert_eq!(currents.stimulus, vec![0.0, 0.0, 0.0, 4.0, 4.0, 4.0]);
        assert_relative_eq!(currents.leak[0], 0.3 * (-65.0 + 54.387));
        assert_relative_eq!(currents.potassium[2], potassium_current(&constants, 30.0, 0.3));
        assert_relative_eq!(currents.sodium[4], sodium_current(&constants, 10.0, 0.1, 0.5));
    }

    #[test]
    fn test_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.json");

        let trajectory = toy_trajectory();
        trajectory.save_to(&path).unwrap();
        assert_eq!(Trajectory::load_from(&path).unwrap(), trajectory);
        assert!(Trajectory::load_from(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_load_rejects_corrupted_files() {
        let dir = tempdir().unwrap();
        let state = r#"{"v": -65.0, "m": 0.05, "h": 0.6, "n": 0.32}"#;

        let path = dir.path().join("decreasing.json");
        std::fs::write(&path, format!(r#"{{"times": [1.0, 0.0], "states": [{0}, {0}]}}"#, state)).unwrap();
        assert!(Trajectory::load_from(&path).is_err());

        let path = dir.path().join("mismatch.json");
        std::fs::write(&path, format!(r#"{{"times": [0.0, 1.0], "states": [{}]}}"#, state)).unwrap();
        assert!(Trajectory::load_from(&path).is_err());

        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"times": [], "states": []}"#).unwrap();
        assert!(Trajectory::load_from(&path).is_err());
    }
}
