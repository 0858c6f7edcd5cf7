//! Membrane currents: the biophysical constants, the three ionic currents and the injected stimulus.
use serde::{Deserialize, Serialize};

use super::error::HHError;

/// Biophysical constants of the membrane, shared read-only by all current functions.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BiophysicalConstants {
    /// Membrane capacitance (uF/cm^2).
    pub c_m: f64,
    /// Sodium maximum conductance (mS/cm^2).
    pub g_na: f64,
    /// Potassium maximum conductance (mS/cm^2).
    pub g_k: f64,
    /// Leak maximum conductance (mS/cm^2).
    pub g_l: f64,
    /// Sodium Nernst reversal potential (mV).
    pub e_na: f64,
    /// Potassium Nernst reversal potential (mV).
    pub e_k: f64,
    /// Leak Nernst reversal potential (mV).
    pub e_l: f64,
}

impl Default for BiophysicalConstants {
    fn default() -> Self {
        BiophysicalConstants {
            c_m: 1.0,
            g_na: 120.0,
            g_k: 36.0,
            g_l: 0.3,
            e_na: 50.0,
            e_k: -77.0,
            e_l: -54.387,
        }
    }
}

impl BiophysicalConstants {
    /// Check the constants can be used in a simulation.
    /// The function returns an error for a non-positive capacitance, negative conductances or non-finite values.
    pub fn validate(&self) -> Result<(), HHError> {
        let values = [
            self.c_m, self.g_na, self.g_k, self.g_l, self.e_na, self.e_k, self.e_l,
        ];
        if values.iter().any(|x| !x.is_finite()) {
            return Err(HHError::InvalidParameter(
                "Biophysical constants must be finite".to_string(),
            ));
        }
        if self.c_m <= 0.0 {
            return Err(HHError::InvalidParameter(
                "Membrane capacitance must be positive".to_string(),
            ));
        }
        if self.g_na < 0.0 || self.g_k < 0.0 || self.g_l < 0.0 {
            return Err(HHError::InvalidParameter(
                "Maximum conductances must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sodium current (uA/cm^2).
pub fn sodium_current(constants: &BiophysicalConstants, v: f64, m: f64, h: f64) -> f64 {
    constants.g_na * m.powi(3) * h * (v - constants.e_na)
}

/// Potassium current (uA/cm^2).
pub fn potassium_current(constants: &BiophysicalConstants, v: f64, n: f64) -> f64 {
    constants.g_k * n.powi(4) * (v - constants.e_k)
}

/// Leak current (uA/cm^2).
pub fn leak_current(constants: &BiophysicalConstants, v: f64) -> f64 {
    constants.g_l * (v - constants.e_l)
}

/// A step of the injected current, adding `amplitude` for all times strictly after `onset`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Step {
    pub onset: f64,
    pub amplitude: f64,
}

impl Step {
    pub fn new(onset: f64, amplitude: f64) -> Self {
        Step { onset, amplitude }
    }
}

/// Piecewise-constant injected current, the sum of its steps.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Stimulus {
    steps: Vec<Step>,
}

impl Default for Stimulus {
    /// Step up to 10 at t>100, down to 0 at t>200, up to 35 at t>300 and down to 0 at t>400.
    fn default() -> Self {
        Stimulus {
            steps: vec![
                Step::new(100.0, 10.0),
                Step::new(200.0, -10.0),
                Step::new(300.0, 35.0),
                Step::new(400.0, -35.0),
            ],
        }
    }
}

impl Stimulus {
    /// Create a stimulus from its steps.
    /// The function returns an error for non-finite onsets or amplitudes.
    pub fn build(steps: Vec<Step>) -> Result<Self, HHError> {
        let stimulus = Stimulus { steps };
        stimulus.validate()?;
        Ok(stimulus)
    }

    /// Check all steps have finite onsets and amplitudes.
    pub fn validate(&self) -> Result<(), HHError> {
        if self
            .steps
            .iter()
            .any(|step| !(step.onset.is_finite() && step.amplitude.is_finite()))
        {
            return Err(HHError::InvalidParameter(
                "Stimulus steps must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// A stimulus which is zero at all times.
    pub fn none() -> Self {
        Stimulus { steps: vec![] }
    }

    /// A constant current switched on for all times strictly after `onset`.
    pub fn constant(onset: f64, amplitude: f64) -> Self {
        Stimulus {
            steps: vec![Step::new(onset, amplitude)],
        }
    }

    /// Returns the steps of the stimulus.
    pub fn steps(&self) -> &[Step] {
        &self.steps[..]
    }

    /// Returns the injected current (uA/cm^2) at the given time.
    pub fn current(&self, t: f64) -> f64 {
        self.steps
            .iter()
            .filter(|step| t > step.onset)
            .fold(0.0, |acc, step| acc + step.amplitude)
    }
}

/// Injected current (uA/cm^2) of the reference stimulus at the given time.
/// It is 10 on (100, 200], 35 on (300, 400] and 0 elsewhere.
pub fn stimulus_current(t: f64) -> f64 {
    10.0 * heaviside(t, 100.0) - 10.0 * heaviside(t, 200.0) + 35.0 * heaviside(t, 300.0)
        - 35.0 * heaviside(t, 400.0)
}

fn heaviside(t: f64, onset: f64) -> f64 {
    if t > onset {
        1.0
    } else {
        0.0
    }
}
