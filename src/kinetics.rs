//! Channel gating kinetics, i.e., the voltage-dependent opening and closing rates of the m, h and n gates.
//!
//! All rates are expressed per millisecond and take the membrane potential in mV.
//! Two of them, [`alpha_m`] and [`alpha_n`], have the form `x / (1 - exp(-x))` which is singular at `x = 0`;
//! they evaluate to their analytic limit there.

/// Returns `x / (1 - exp(-x))`, extended by continuity with the value 1 at `x = 0`.
///
/// The denominator is computed with `exp_m1` so that the function stays accurate close to the removable singularity.
fn exp_ratio(x: f64) -> f64 {
    if x == 0.0 {
        return 1.0;
    }
    x / -(-x).exp_m1()
}

/// Opening rate of the sodium activation gate, equal to 1.0 at V = -40 mV.
pub fn alpha_m(v: f64) -> f64 {
    exp_ratio((v + 40.0) / 10.0)
}

/// Closing rate of the sodium activation gate.
pub fn beta_m(v: f64) -> f64 {
    4.0 * (-(v + 65.0) / 18.0).exp()
}

/// Opening rate of the sodium inactivation gate.
pub fn alpha_h(v: f64) -> f64 {
    0.07 * (-(v + 65.0) / 20.0).exp()
}

/// Closing rate of the sodium inactivation gate.
pub fn beta_h(v: f64) -> f64 {
    1.0 / (1.0 + (-(v + 35.0) / 10.0).exp())
}

/// Opening rate of the potassium activation gate, equal to 0.1 at V = -55 mV.
pub fn alpha_n(v: f64) -> f64 {
    0.1 * exp_ratio((v + 55.0) / 10.0)
}

/// Closing rate of the potassium activation gate.
pub fn beta_n(v: f64) -> f64 {
    0.125 * (-(v + 65.0) / 80.0).exp()
}

/// Returns the derivative of a gating variable given its opening and closing rates.
pub fn gate_derivative(alpha: f64, beta: f64, x: f64) -> f64 {
    alpha * (1.0 - x) - beta * x
}

/// Steady-state value of the m gate at the given voltage.
pub fn m_inf(v: f64) -> f64 {
    alpha_m(v) / (alpha_m(v) + beta_m(v))
}

/// Steady-state value of the h gate at the given voltage.
pub fn h_inf(v: f64) -> f64 {
    alpha_h(v) / (alpha_h(v) + beta_h(v))
}

/// Steady-state value of the n gate at the given voltage.
pub fn n_inf(v: f64) -> f64 {
    alpha_n(v) / (alpha_n(v) + beta_n(v))
}

/// Time constant (ms) of the m gate at the given voltage.
pub fn tau_m(v: f64) -> f64 {
    1.0 / (alpha_m(v) + beta_m(v))
}

/// Time constant (ms) of the h gate at the given voltage.
pub fn tau_h(v: f64) -> f64 {
    1.0 / (alpha_h(v) + beta_h(v))
}

/// Time constant (ms) of the n gate at the given voltage.
pub fn tau_n(v: f64) -> f64 {
    1.0 / (alpha_n(v) + beta_n(v))
}
