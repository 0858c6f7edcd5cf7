use rusty_hh::error::HHError;
use rusty_hh::integrator::Integrator;
use rusty_hh::membrane::{BiophysicalConstants, Stimulus};
use rusty_hh::model::{derivative, HodgkinHuxley};
use rusty_hh::output::{write_currents, write_raw, write_table};
use rusty_hh::simulation::{run_batch, Simulation, SimulationConfig};
use rusty_hh::state::State;
use rusty_hh::time_grid::TimeGrid;
use rusty_hh::trajectory::Trajectory;
use rusty_hh::{DEFAULT_INITIAL_STATE, SPIKE_THRESHOLD};

use std::fs::{self, File};
use tempfile::tempdir;

fn in_stimulus_windows(t: f64) -> bool {
    // a spike started just before the stimulus switches off may cross shortly after
    (t > 100.0 && t <= 205.0) || (t > 300.0 && t <= 405.0)
}

fn check_reference_behavior(trajectory: &Trajectory, grid_len: usize) {
    assert_eq!(trajectory.len(), grid_len);
    assert_eq!(trajectory.states()[0], State::from(DEFAULT_INITIAL_STATE));

    let crossings = trajectory.upward_crossings(SPIKE_THRESHOLD);
    assert!(crossings.len() >= 3, "only {} action potentials", crossings.len());
    assert!(crossings.iter().all(|&t| in_stimulus_windows(t)), "{:?}", crossings);
    assert!(crossings.iter().any(|&t| t < 200.0));
    assert!(crossings.iter().any(|&t| t > 300.0));
}

#[test]
fn test_reference_simulation_on_coarse_grid() {
    let trajectory = Simulation::build(SimulationConfig::default())
        .unwrap()
        .run()
        .unwrap();
    check_reference_behavior(&trajectory, 450);
}

#[test]
fn test_reference_simulation_on_fine_grid() {
    let config = SimulationConfig {
        dt: 0.1,
        ..Default::default()
    };
    let trajectory = Simulation::build(config).unwrap().run().unwrap();
    check_reference_behavior(&trajectory, 4500);
}

#[test]
fn test_free_functions_match_simulation() {
    let constants = BiophysicalConstants::default();
    let stimulus = Stimulus::default();
    let grid = TimeGrid::uniform(0.0, 450.0, 1.0).unwrap();

    let states = Integrator::default()
        .integrate(
            |y: &[f64; 4], t| derivative(&constants, &stimulus, &State::from(*y), t).to_array(),
            DEFAULT_INITIAL_STATE,
            &grid,
        )
        .unwrap();
    let trajectory = Simulation::build(SimulationConfig::default())
        .unwrap()
        .run()
        .unwrap();

    let expected: Vec<State> = states.into_iter().map(State::from).collect();
    assert_eq!(trajectory.states(), &expected[..]);
}

#[test]
fn test_determinism() {
    let simulation = Simulation::build(SimulationConfig::default()).unwrap();
    let trajectory_1 = simulation.run().unwrap();
    let trajectory_2 = simulation.run().unwrap();
    assert_eq!(trajectory_1, trajectory_2);

    let results = run_batch(vec![SimulationConfig::default(); 4]);
    for result in results {
        assert_eq!(result.unwrap(), trajectory_1);
    }
}

#[test]
fn test_integration_failure_returns_no_trajectory() {
    let model = HodgkinHuxley::default();
    let grid = TimeGrid::uniform(0.0, 450.0, 1.0).unwrap();
    let integrator = Integrator {
        max_steps: 2,
        ..Default::default()
    };
    let simulation =
        Simulation::build_on_grid(model, grid, State::from(DEFAULT_INITIAL_STATE), integrator).unwrap();

    let result = simulation.run();
    assert!(matches!(result, Err(HHError::MaxStepsExceeded { .. })));
}

#[test]
fn test_outputs() {
    let dir = tempdir().unwrap();
    let simulation = Simulation::build(SimulationConfig::default()).unwrap();
    let trajectory = simulation.run().unwrap();

    write_raw(&trajectory, File::create(dir.path().join("trajectory.txt")).unwrap()).unwrap();
    write_table(&trajectory, File::create(dir.path().join("param.tsv")).unwrap()).unwrap();
    write_currents(
        &trajectory,
        simulation.model().constants(),
        simulation.model().stimulus(),
        File::create(dir.path().join("currents.tsv")).unwrap(),
    )
    .unwrap();
    trajectory.save_to(dir.path().join("trajectory.json")).unwrap();

    let raw = fs::read_to_string(dir.path().join("trajectory.txt")).unwrap();
    assert_eq!(raw.lines().count(), 450);
    assert!(raw.starts_with("-65\t0.05\t0.6\t0.32\n"));

    let table = fs::read_to_string(dir.path().join("param.tsv")).unwrap();
    assert_eq!(table.lines().count(), 451);

    let currents = fs::read_to_string(dir.path().join("currents.tsv")).unwrap();
    let stimulus_column: Vec<f64> = currents
        .lines()
        .skip(1)
        .map(|line| line.split('\t').nth(1).unwrap().parse().unwrap())
        .collect();
    assert_eq!(stimulus_column[100], 0.0);
    assert_eq!(stimulus_column[101], 10.0);
    assert_eq!(stimulus_column[350], 35.0);
    assert_eq!(stimulus_column[449], 0.0);

    let loaded = Trajectory::load_from(dir.path().join("trajectory.json")).unwrap();
    assert_eq!(loaded.len(), trajectory.len());
    assert_eq!(loaded.times(), trajectory.times());
}
