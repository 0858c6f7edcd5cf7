//! This module contains the simulation configuration and the simulation runner.
//!
//! A simulation builds the time grid, integrates the membrane once from its initial state and returns the trajectory.
//!
//! ```rust
//! use rusty_hh::simulation::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig { t_end: 150.0, ..Default::default() };
//! let trajectory = Simulation::build(config).unwrap().run().unwrap();
//!
//! assert_eq!(trajectory.len(), 150);
//! ```
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::error::HHError;
use super::integrator::Integrator;
use super::membrane::{BiophysicalConstants, Stimulus};
use super::model::HodgkinHuxley;
use super::state::State;
use super::time_grid::TimeGrid;
use super::trajectory::Trajectory;
use super::{DEFAULT_DT, DEFAULT_INITIAL_STATE, DEFAULT_T_END, MIN_PARALLEL_RUNS, SPIKE_THRESHOLD};

/// The full description of a simulation run.
/// Missing fields are filled with their default value when deserializing.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub constants: BiophysicalConstants,
    pub stimulus: Stimulus,
    pub initial_state: State,
    /// Start of the time window (ms).
    pub t_start: f64,
    /// End of the time window (ms), excluded from the grid.
    pub t_end: f64,
    /// Sampling step of the time grid (ms).
    pub dt: f64,
    pub integrator: Integrator,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            constants: BiophysicalConstants::default(),
            stimulus: Stimulus::default(),
            initial_state: State::from(DEFAULT_INITIAL_STATE),
            t_start: 0.0,
            t_end: DEFAULT_T_END,
            dt: DEFAULT_DT,
            integrator: Integrator::default(),
        }
    }
}

impl SimulationConfig {
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), HHError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, HHError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// A validated simulation, ready to run.
#[derive(Debug, PartialEq, Clone)]
pub struct Simulation {
    model: HodgkinHuxley,
    grid: TimeGrid,
    initial_state: State,
    integrator: Integrator,
}

impl Simulation {
    /// Create a simulation from its configuration.
    /// The function returns an error for invalid constants, time window, initial state or integrator settings.
    pub fn build(config: SimulationConfig) -> Result<Self, HHError> {
        let model = HodgkinHuxley::build(config.constants, config.stimulus)?;
        let grid = TimeGrid::uniform(config.t_start, config.t_end, config.dt)?;
        Simulation::build_on_grid(model, grid, config.initial_state, config.integrator)
    }

    /// Create a simulation on an arbitrary time grid.
    pub fn build_on_grid(
        model: HodgkinHuxley,
        grid: TimeGrid,
        initial_state: State,
        integrator: Integrator,
    ) -> Result<Self, HHError> {
        if !initial_state.is_finite() {
            return Err(HHError::InvalidParameter(
                "The initial state must be finite".to_string(),
            ));
        }
        integrator.validate()?;
        Ok(Simulation {
            model,
            grid,
            initial_state,
            integrator,
        })
    }

    pub fn model(&self) -> &HodgkinHuxley {
        &self.model
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// Integrate the membrane over the time grid.
    /// The function returns an error if the integration fails, in which case no trajectory is produced.
    pub fn run(&self) -> Result<Trajectory, HHError> {
        log::info!(
            "Simulating {} time points on [{}, {}]",
            self.grid.len(),
            self.grid.start(),
            self.grid.end()
        );

        let states = self
            .integrator
            .integrate(self.model.rhs(), self.initial_state.to_array(), &self.grid)
            .map_err(|e| {
                log::error!("Simulation failed: {}", e);
                e
            })?;
        let trajectory = Trajectory::build(&self.grid, states.into_iter().map(State::from).collect())?;

        log::info!(
            "Simulation completed: {} action potentials",
            trajectory.upward_crossings(SPIKE_THRESHOLD).len()
        );
        Ok(trajectory)
    }
}

/// Run independent simulations, in parallel for large enough batches.
/// Results are returned in the order of the configurations.
pub fn run_batch(configs: Vec<SimulationConfig>) -> Vec<Result<Trajectory, HHError>> {
    let run_one = |config: SimulationConfig| Simulation::build(config)?.run();
    if configs.len() >= MIN_PARALLEL_RUNS {
        configs.into_par_iter().map(run_one).collect()
    } else {
        configs.into_iter().map(run_one).collect()
    }
}
