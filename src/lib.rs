//! This crate provides tools for simulating a single neuron membrane with the Hodgkin-Huxley model in Rust.
//!
//! The membrane voltage and the three gating variables (m, h, n) evolve under the sodium, potassium and leak currents
//! and an injected stimulus current. The resulting ODE system is integrated with an adaptive-step Runge-Kutta method
//! and sampled on a time grid.
//!
//! # Running the Reference Simulation
//!
//! ```rust
//! use rusty_hh::simulation::{Simulation, SimulationConfig};
//!
//! // 450 ms, sampled every 1 ms, with the default step stimulus
//! let simulation = Simulation::build(SimulationConfig::default()).unwrap();
//! let trajectory = simulation.run().unwrap();
//!
//! assert_eq!(trajectory.len(), 450);
//! assert!(trajectory.upward_crossings(0.0).len() >= 3);
//! ```
//!
//! # Using the Model Directly
//!
//! ```rust
//! use rusty_hh::integrator::Integrator;
//! use rusty_hh::membrane::{BiophysicalConstants, Stimulus};
//! use rusty_hh::model::derivative;
//! use rusty_hh::state::State;
//! use rusty_hh::time_grid::TimeGrid;
//!
//! let constants = BiophysicalConstants::default();
//! let stimulus = Stimulus::constant(5.0, 20.0);
//! let grid = TimeGrid::uniform(0.0, 50.0, 0.1).unwrap();
//!
//! let states = Integrator::default()
//!     .integrate(
//!         |y: &[f64; 4], t| derivative(&constants, &stimulus, &State::from(*y), t).to_array(),
//!         [-65.0, 0.05, 0.6, 0.32],
//!         &grid,
//!     )
//!     .unwrap();
//!
//! assert_eq!(states.len(), grid.len());
//! ```

pub mod error;
pub mod integrator;
pub mod kinetics;
pub mod membrane;
pub mod model;
pub mod output;
pub mod simulation;
pub mod state;
pub mod time_grid;
pub mod trajectory;

/// The default initial state (V, m, h, n).
pub const DEFAULT_INITIAL_STATE: [f64; 4] = [-65.0, 0.05, 0.6, 0.32];
/// The default end of the simulated time window (ms).
pub const DEFAULT_T_END: f64 = 450.0;
/// The default sampling step of the time grid (ms).
pub const DEFAULT_DT: f64 = 1.0;
/// Maximum number of points of a time grid.
pub const MAX_GRID_POINTS: usize = 10_000_000;
/// The membrane potential (mV) whose upward crossing marks an action potential.
pub const SPIKE_THRESHOLD: f64 = 0.0;
/// Minimum number of simulations to consider parallel processing.
pub const MIN_PARALLEL_RUNS: usize = 4;
