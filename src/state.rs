//! Module implementing the membrane state vector.
use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

/// Represents the state of the membrane at a given time: the voltage and the three gating variables.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct State {
    /// The membrane potential (mV).
    pub v: f64,
    /// The sodium activation gate.
    pub m: f64,
    /// The sodium inactivation gate.
    pub h: f64,
    /// The potassium activation gate.
    pub n: f64,
}

impl State {
    /// Create a new state with the specified parameters.
    pub fn new(v: f64, m: f64, h: f64, n: f64) -> Self {
        State { v, m, h, n }
    }

    /// Returns the state as an array ordered as (V, m, h, n).
    pub fn to_array(&self) -> [f64; 4] {
        [self.v, self.m, self.h, self.n]
    }

    /// Returns true if all the state variables are finite.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite())
    }
}

impl From<[f64; 4]> for State {
    fn from(x: [f64; 4]) -> Self {
        State::new(x[0], x[1], x[2], x[3])
    }
}

impl From<State> for [f64; 4] {
    fn from(state: State) -> Self {
        state.to_array()
    }
}

impl From<Vector4<f64>> for State {
    fn from(x: Vector4<f64>) -> Self {
        State::new(x[0], x[1], x[2], x[3])
    }
}

impl From<State> for Vector4<f64> {
    fn from(state: State) -> Self {
        Vector4::new(state.v, state.m, state.h, state.n)
    }
}
