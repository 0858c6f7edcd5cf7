//! Adaptive-step integration of initial value problems.
//!
//! The [`Integrator`] implements the embedded Dormand-Prince 5(4) Runge-Kutta pair: every step computes a fifth-order
//! solution together with a fourth-order one, and their difference drives the step size so that the local error stays
//! within the prescribed tolerances.
//! The solution is not interpolated: the integrator lands exactly on every point of the time grid.
//!
//! ```rust
//! use rusty_hh::integrator::Integrator;
//! use rusty_hh::time_grid::TimeGrid;
//!
//! // Exponential decay y' = -y
//! let grid = TimeGrid::uniform(0.0, 2.0, 0.5).unwrap();
//! let states = Integrator::default().integrate(|y: &[f64; 1], _t| [-y[0]], [1.0], &grid).unwrap();
//!
//! assert_eq!(states.len(), grid.len());
//! assert!((states[3][0] - (-1.5_f64).exp()).abs() < 1e-6);
//! ```
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use super::error::HHError;
use super::time_grid::TimeGrid;

/// Safety factor applied to the optimal step size.
const SAFETY: f64 = 0.9;
/// Minimum ratio between two consecutive step sizes.
const MIN_FACTOR: f64 = 0.2;
/// Maximum ratio between two consecutive step sizes.
const MAX_FACTOR: f64 = 5.0;

// Dormand-Prince tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between the fifth and fourth order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// Settings of the adaptive-step integrator.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Integrator {
    /// Relative tolerance on the local error.
    pub rtol: f64,
    /// Absolute tolerance on the local error.
    pub atol: f64,
    /// Size of the first trial step (ms).
    pub initial_step: f64,
    /// Below this step size (ms), the integration fails.
    pub min_step: f64,
    /// Maximum number of trial steps between two consecutive grid points.
    pub max_steps: usize,
}

impl Default for Integrator {
    fn default() -> Self {
        Integrator {
            rtol: 1e-6,
            atol: 1e-8,
            initial_step: 1e-2,
            min_step: 1e-12,
            max_steps: 100_000,
        }
    }
}

/// Counters of a completed integration.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct IntegrationStats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
}

impl Integrator {
    /// Check the settings can be used for integration.
    pub fn validate(&self) -> Result<(), HHError> {
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return Err(HHError::InvalidParameter(
                "Tolerances must be positive".to_string(),
            ));
        }
        if !(self.initial_step > 0.0 && self.min_step > 0.0) || self.min_step > self.initial_step {
            return Err(HHError::InvalidParameter(
                "Step sizes must be positive, with the minimum step below the initial one".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(HHError::InvalidParameter(
                "The step budget must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Solve the initial value problem `y' = f(y, t)`, `y(grid.start()) = y0`, and returns the solution at every
    /// point of the grid. The first returned state is `y0`.
    ///
    /// The function returns an error if the settings or the initial state are invalid, or if the integration fails;
    /// no partial solution is returned.
    pub fn integrate<F, const N: usize>(
        &self,
        f: F,
        y0: [f64; N],
        grid: &TimeGrid,
    ) -> Result<Vec<[f64; N]>, HHError>
    where
        F: Fn(&[f64; N], f64) -> [f64; N],
    {
        self.integrate_with_stats(f, y0, grid).map(|(states, _)| states)
    }

    /// Same as [`Integrator::integrate`], also returning the step counters.
    pub fn integrate_with_stats<F, const N: usize>(
        &self,
        f: F,
        y0: [f64; N],
        grid: &TimeGrid,
    ) -> Result<(Vec<[f64; N]>, IntegrationStats), HHError>
    where
        F: Fn(&[f64; N], f64) -> [f64; N],
    {
        self.validate()?;
        if y0.iter().any(|x| !x.is_finite()) {
            return Err(HHError::InvalidParameter(
                "The initial state must be finite".to_string(),
            ));
        }

        let mut stats = IntegrationStats::default();
        let mut states = Vec::with_capacity(grid.len());
        states.push(y0);

        let mut t = grid.start();
        let mut y = SVector::<f64, N>::from(y0);
        let mut h = self.initial_step;

        for &t_next in grid.times().iter().skip(1) {
            let t_prev = t;
            let (accepted, rejected) = (stats.accepted, stats.rejected);
            let mut num_steps = 0;
            while t < t_next {
                if num_steps >= self.max_steps {
                    return Err(HHError::MaxStepsExceeded {
                        time: t,
                        max_steps: self.max_steps,
                    });
                }
                num_steps += 1;

                let remaining = t_next - t;
                let last = h >= remaining;
                let h_try = if last { remaining } else { h };
                if !last && h_try < self.min_step {
                    return Err(HHError::StepSizeUnderflow { time: t, step: h_try });
                }

                let (y_new, y_err) = dormand_prince_step(&f, t, &y, h_try);
                stats.evaluations += 7;
                let err = self.error_norm(&y, &y_new, &y_err);

                if err <= 1.0 {
                    stats.accepted += 1;
                    t = if last { t_next } else { (t + h_try).min(t_next) };
                    y = y_new;
                    if y.iter().any(|x| !x.is_finite()) {
                        return Err(HHError::NonFiniteState { time: t });
                    }

                    let h_new = h_try * step_factor(err);
                    // a step truncated to hit the grid says nothing about the admissible step size
                    h = if last { h.max(h_new) } else { h_new };
                } else {
                    stats.rejected += 1;
                    h = h_try * step_factor(err);
                    log::trace!("Step rejected at t={} (error norm {:e}), retrying with h={:e}", t, err, h);
                }
            }
            log::debug!(
                "Interval [{}, {}]: {} accepted steps, {} rejected steps",
                t_prev,
                t_next,
                stats.accepted - accepted,
                stats.rejected - rejected
            );
            states.push(to_array(&y));
        }

        log::debug!(
            "Integration completed over [{}, {}]: {} accepted steps, {} rejected steps, {} evaluations",
            grid.start(),
            grid.end(),
            stats.accepted,
            stats.rejected,
            stats.evaluations
        );
        Ok((states, stats))
    }

    /// Root mean square of the local error, scaled by the tolerances. Non-finite errors are mapped to infinity.
    fn error_norm<const N: usize>(
        &self,
        y: &SVector<f64, N>,
        y_new: &SVector<f64, N>,
        y_err: &SVector<f64, N>,
    ) -> f64 {
        if N == 0 {
            return 0.0;
        }
        let sum_sq: f64 = (0..N)
            .map(|i| {
                let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
                (y_err[i] / scale).powi(2)
            })
            .sum();
        let err = (sum_sq / N as f64).sqrt();
        if err.is_finite() {
            err
        } else {
            f64::INFINITY
        }
    }
}

/// Ratio between the next and the current step size, given the scaled error of the current step.
fn step_factor(err: f64) -> f64 {
    if err == 0.0 {
        MAX_FACTOR
    } else if !err.is_finite() {
        MIN_FACTOR
    } else {
        (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
    }
}

/// One Dormand-Prince step of size `h` from `(t, y)`.
/// Returns the fifth-order solution and the local error estimate.
fn dormand_prince_step<F, const N: usize>(
    f: &F,
    t: f64,
    y: &SVector<f64, N>,
    h: f64,
) -> (SVector<f64, N>, SVector<f64, N>)
where
    F: Fn(&[f64; N], f64) -> [f64; N],
{
    let y = *y;
    let eval = |t: f64, y: SVector<f64, N>| SVector::<f64, N>::from(f(&to_array(&y), t));

    let k1 = eval(t, y);
    let k2 = eval(t + C2 * h, y + k1 * (h * A21));
    let k3 = eval(t + C3 * h, y + (k1 * A31 + k2 * A32) * h);
    let k4 = eval(t + C4 * h, y + (k1 * A41 + k2 * A42 + k3 * A43) * h);
    let k5 = eval(t + C5 * h, y + (k1 * A51 + k2 * A52 + k3 * A53 + k4 * A54) * h);
    let k6 = eval(t + h, y + (k1 * A61 + k2 * A62 + k3 * A63 + k4 * A64 + k5 * A65) * h);

    let y_new = y + (k1 * B1 + k3 * B3 + k4 * B4 + k5 * B5 + k6 * B6) * h;
    let k7 = eval(t + h, y_new);

    let y_err = (k1 * E1 + k3 * E3 + k4 * E4 + k5 * E5 + k6 * E6 + k7 * E7) * h;
    (y_new, y_err)
}

fn to_array<const N: usize>(y: &SVector<f64, N>) -> [f64; N] {
    let mut x = [0.0; N];
    x.copy_from_slice(y.as_slice());
    x
}
