//! The Hodgkin-Huxley model, i.e., the right-hand side of the membrane ODE system.
//!
//! ```rust
//! use rusty_hh::model::HodgkinHuxley;
//! use rusty_hh::state::State;
//!
//! let model = HodgkinHuxley::default();
//! let ds = model.derivative(&State::new(-65.0, 0.05, 0.6, 0.32), 0.0);
//!
//! // Close to rest without input, the voltage barely moves
//! assert!(ds.v.abs() < 1.0);
//! ```
use serde::{Deserialize, Serialize};

use super::error::HHError;
use super::kinetics::*;
use super::membrane::*;
use super::state::State;

/// Returns the time derivative of the membrane state at the given time.
/// The function has no side effects.
pub fn derivative(
    constants: &BiophysicalConstants,
    stimulus: &Stimulus,
    state: &State,
    t: f64,
) -> State {
    let State { v, m, h, n } = *state;

    let i_ion = sodium_current(constants, v, m, h)
        + potassium_current(constants, v, n)
        + leak_current(constants, v);

    State {
        v: (stimulus.current(t) - i_ion) / constants.c_m,
        m: gate_derivative(alpha_m(v), beta_m(v), m),
        h: gate_derivative(alpha_h(v), beta_h(v), h),
        n: gate_derivative(alpha_n(v), beta_n(v), n),
    }
}

/// Returns the state with all gates at their steady-state value for the given voltage.
pub fn resting_state(v: f64) -> State {
    State::new(v, m_inf(v), h_inf(v), n_inf(v))
}

/// A stateless Hodgkin-Huxley membrane, holding its constants and the injected stimulus.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct HodgkinHuxley {
    constants: BiophysicalConstants,
    stimulus: Stimulus,
}

impl HodgkinHuxley {
    /// Create a new model with the specified constants and stimulus.
    /// The function returns an error for invalid constants or stimulus.
    pub fn build(constants: BiophysicalConstants, stimulus: Stimulus) -> Result<Self, HHError> {
        constants.validate()?;
        stimulus.validate()?;
        Ok(HodgkinHuxley {
            constants,
            stimulus,
        })
    }

    /// Returns the biophysical constants of the model.
    pub fn constants(&self) -> &BiophysicalConstants {
        &self.constants
    }

    /// Returns the injected stimulus of the model.
    pub fn stimulus(&self) -> &Stimulus {
        &self.stimulus
    }

    /// Returns the time derivative of the membrane state at the given time.
    pub fn derivative(&self, state: &State, t: f64) -> State {
        derivative(&self.constants, &self.stimulus, state, t)
    }

    /// The right-hand side in the array form expected by the integrator.
    pub fn rhs(&self) -> impl Fn(&[f64; 4], f64) -> [f64; 4] + '_ {
        move |y, t| self.derivative(&State::from(*y), t).to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derivative_matches_equations() {
        let constants = BiophysicalConstants::default();
        let stimulus = Stimulus::default();
        let state = State::new(-30.0, 0.3, 0.4, 0.5);

        let ds = derivative(&constants, &stimulus, &state, 150.0);
        let expected_dv = 10.0
            - 120.0 * 0.3_f64.powi(3) * 0.4 * (-30.0 - 50.0)
            - 36.0 * 0.5_f64.powi(4) * (-30.0 + 77.0)
            - 0.3 * (-30.0 + 54.387);
        assert_relative_eq!(ds.v, expected_dv, max_relative = 1e-12);
        assert_relative_eq!(ds.m, alpha_m(-30.0) * 0.7 - beta_m(-30.0) * 0.3, max_relative = 1e-12);
        assert_relative_eq!(ds.h, alpha_h(-30.0) * 0.6 - beta_h(-30.0) * 0.4, max_relative = 1e-12);
        assert_relative_eq!(ds.n, alpha_n(-30.0) * 0.5 - beta_n(-30.0) * 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_derivative_scales_with_capacitance() {
        let constants = BiophysicalConstants {
            c_m: 2.0,
            ..Default::default()
        };
        let state = State::new(-60.0, 0.1, 0.5, 0.3);
        let ds_1 = derivative(&BiophysicalConstants::default(), &Stimulus::none(), &state, 0.0);
        let ds_2 = derivative(&constants, &Stimulus::none(), &state, 0.0);
        assert_relative_eq!(ds_1.v, 2.0 * ds_2.v);
        assert_eq!(ds_1.m, ds_2.m);
    }

    #[test]
    fn test_derivative_at_singular_voltages() {
        let model = HodgkinHuxley::default();
        assert!(model.derivative(&State::new(-40.0, 0.1, 0.5, 0.3), 0.0).is_finite());
        assert!(model.derivative(&State::new(-55.0, 0.1, 0.5, 0.3), 0.0).is_finite());
    }

    #[test]
    fn test_resting_state_has_still_gates() {
        let model = HodgkinHuxley::default();
        let ds = model.derivative(&resting_state(-65.0), 0.0);
        assert_relative_eq!(ds.m, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ds.h, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ds.n, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rhs_agrees_with_derivative() {
        let model = HodgkinHuxley::default();
        let state = State::new(-65.0, 0.05, 0.6, 0.32);
        let rhs = model.rhs();
        assert_eq!(rhs(&state.to_array(), 320.0), model.derivative(&state, 320.0).to_array());
    }

    #[test]
    fn test_build_rejects_invalid_constants() {
        let constants = BiophysicalConstants {
            c_m: -1.0,
            ..Default::default()
        };
        assert!(HodgkinHuxley::build(constants, Stimulus::default()).is_err());
    }
}
