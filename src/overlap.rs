// SPDX-License-Identifier: AGPL-3.0-only

//! Overlap integrals of solved eigenfunctions.
//!
//! The headline quantity is I4 = ∫|f(ξ)|⁴ dξ of the ground mode, a scalar
//! summarizing mode localization; power and mode index are configurable.
//! Quadrature is composite Simpson when the grid has an even interval
//! count, trapezoid otherwise — both consistent with the solve grid, no
//! resampling.

use serde::{Deserialize, Serialize};

/// Which overlap integral to compute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverlapSpec {
    /// Power p in ∫|f|^p dξ.
    pub power: u32,
    /// Mode index (0 = ground state).
    pub mode: usize,
}

impl Default for OverlapSpec {
    fn default() -> Self {
        Self { power: 4, mode: 0 }
    }
}

/// Composite quadrature of uniformly sampled values with spacing `h`:
/// Simpson for an even interval count, trapezoid fallback otherwise.
#[must_use]
pub fn integrate(values: &[f64], h: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let intervals = n - 1;

    if intervals % 2 == 0 {
        let mut sum = values[0] + values[intervals];
        for (i, &v) in values.iter().enumerate().take(intervals).skip(1) {
            sum += if i % 2 == 1 { 4.0 * v } else { 2.0 * v };
        }
        sum * h / 3.0
    } else {
        let mut sum = 0.5 * (values[0] + values[intervals]);
        for &v in &values[1..intervals] {
            sum += v;
        }
        sum * h
    }
}

/// ∫|f|^p dξ for one sampled eigenfunction.
#[must_use]
pub fn overlap(mode: &[f64], h: f64, power: u32) -> f64 {
    let powered: Vec<f64> = mode.iter().map(|&x| x.abs().powi(power as i32)).collect();
    integrate(&powered, h)
}

/// Relative drift between coarse and fine evaluations of the same
/// integral; the convergence figure reported alongside I4.
#[must_use]
pub fn relative_drift(coarse: f64, fine: f64) -> f64 {
    if fine.abs() < f64::MIN_POSITIVE {
        (coarse - fine).abs()
    } else {
        ((coarse - fine) / fine).abs()
    }
}
