// SPDX-License-Identifier: AGPL-3.0-only

//! Shooting-method eigensolver: Numerov integration plus root finding.
//!
//! Structurally independent of the matrix path in `eigen` — no assembly,
//! no linear algebra — which is what qualifies it as the second method of
//! the V1 cross-check. The eigenvalue condition is a boundary mismatch
//! function g(E): integrate the ODE y'' = (V − E)y from the left with the
//! left boundary condition built into the starting values, then demand the
//! right boundary condition at ξ = ℓ. Roots of g are eigenvalues.
//!
//! Numerov's method is O(h⁴), so any disagreement with the O(h²) FEM path
//! at matched resolution measures the FEM truncation error — or a boundary
//! condition handled differently by the two methods, which is exactly the
//! defect class V1 exists to catch.

use crate::operator::EdgeCondition;
use crate::potential::Potential;
use crate::tolerances::{SHOOTING_BISECT_ITER, SHOOTING_SCAN_STEPS};

/// Magnitude at which the running solution is rescaled to avoid overflow
/// in classically forbidden regions (the mismatch sign is scale-free).
const RENORM_LIMIT: f64 = 1e140;

/// Boundary mismatch g(E) for one trial energy.
///
/// Integrates over `intervals` Numerov steps (plus one ghost step when the
/// right condition needs a derivative) and returns a value whose sign
/// changes across each eigenvalue.
fn mismatch(
    potential: &Potential,
    length: f64,
    intervals: usize,
    left: EdgeCondition,
    right: EdgeCondition,
    energy: f64,
) -> f64 {
    let n = intervals;
    let h = length / n as f64;
    let w = |i: usize| potential.value(i as f64 * h) - energy;

    // Starting values encode the left boundary condition.
    let (mut y_prev, mut y_curr) = match left {
        EdgeCondition::Dirichlet => (0.0, h),
        EdgeCondition::Robin { alpha } => {
            // Outward normal at ξ=0 is −ξ̂, so ∂f/∂n + αf = 0 gives
            // y'(0) = α·y(0). Fourth-order Taylor start, with one-sided
            // second-order differences for w' and w'', keeps the O(h⁴)
            // interior accuracy from being capped at the first step.
            let (w0, w1, w2) = (w(0), w(1), w(2));
            let dw = (-3.0 * w0 + 4.0 * w1 - w2) / (2.0 * h);
            let ddw = (w0 - 2.0 * w1 + w2) / (h * h);
            let y1 = 1.0
                + h * alpha
                + 0.5 * h * h * w0
                + (h * h * h / 6.0) * (dw + w0 * alpha)
                + (h * h * h * h / 24.0) * (ddw + 2.0 * dw * alpha + w0 * w0);
            (1.0, y1)
        }
    };

    let needs_ghost = matches!(right, EdgeCondition::Robin { .. });
    let last_step = if needs_ghost { n + 1 } else { n };

    let mut y_before_last = y_prev;
    for i in 1..last_step {
        let f_prev = 1.0 - h * h * w(i - 1) / 12.0;
        let f_curr = 1.0 + 5.0 * h * h * w(i) / 12.0;
        let f_next = 1.0 - h * h * w(i + 1) / 12.0;
        let y_next = (2.0 * y_curr * f_curr - y_prev * f_prev) / f_next;

        y_before_last = y_prev;
        y_prev = y_curr;
        y_curr = y_next;

        if y_curr.abs() > RENORM_LIMIT {
            let s = 1.0 / RENORM_LIMIT;
            y_curr *= s;
            y_prev *= s;
            y_before_last *= s;
        }
    }

    match right {
        EdgeCondition::Dirichlet => y_curr,
        EdgeCondition::Robin { alpha } => {
            // y_curr is the ghost value y_{n+1}. The bare central
            // difference is only O(h²); substituting y''' = (wy)' gives
            //   (y_{n+1} − y_{n−1})/(2h) = y'(1 + h²wₙ/6) + (h²/6)w'yₙ
            // which solved for y' restores the integrator's O(h⁴) order.
            let y_n = y_prev;
            let d = (y_curr - y_before_last) / (2.0 * h);
            let w_n = w(n);
            let dw = (w(n + 1) - w(n - 1)) / (2.0 * h);
            let deriv = (d - (h * h / 6.0) * dw * y_n) / (1.0 + h * h * w_n / 6.0);
            deriv + alpha * y_n
        }
    }
}

/// All eigenvalues inside the open window `(lo, hi)`, ascending.
///
/// Coarse sign-change scan over [`SHOOTING_SCAN_STEPS`] panels, then
/// bisection refinement per bracket. The window is the caller's statement
/// of where bound states can live (min V padded below, the intrinsic
/// threshold above).
#[must_use]
pub fn eigenvalues_in_window(
    potential: &Potential,
    length: f64,
    intervals: usize,
    left: EdgeCondition,
    right: EdgeCondition,
    window: (f64, f64),
) -> Vec<f64> {
    let (lo, hi) = window;
    if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }

    let g = |e: f64| mismatch(potential, length, intervals, left, right, e);
    let step = (hi - lo) / SHOOTING_SCAN_STEPS as f64;

    let mut roots = Vec::new();
    let mut e_prev = lo;
    let mut g_prev = g(e_prev);
    for k in 1..=SHOOTING_SCAN_STEPS {
        let e_next = lo + k as f64 * step;
        let g_next = g(e_next);

        if g_prev == 0.0 {
            roots.push(e_prev);
        } else if g_prev.signum() != g_next.signum() && g_next != 0.0 {
            let (mut a, mut b) = (e_prev, e_next);
            let mut ga = g_prev;
            for _ in 0..SHOOTING_BISECT_ITER {
                let mid = 0.5 * (a + b);
                if (b - a) < 2.0 * f64::EPSILON * mid.abs().max(1.0) {
                    break;
                }
                let gm = g(mid);
                if gm == 0.0 {
                    a = mid;
                    b = mid;
                    break;
                }
                if ga.signum() == gm.signum() {
                    a = mid;
                    ga = gm;
                } else {
                    b = mid;
                }
            }
            roots.push(0.5 * (a + b));
        }

        e_prev = e_next;
        g_prev = g_next;
    }

    roots
}

/// Default bound-state search window for a potential: from just below the
/// deepest point of the well (padded for negative Robin coefficients,
/// which can bind an extra surface state) up to the intrinsic threshold.
#[must_use]
pub fn bound_window(
    potential: &Potential,
    length: f64,
    intervals: usize,
    left: EdgeCondition,
    right: EdgeCondition,
) -> (f64, f64) {
    let h = length / intervals as f64;
    let v_min = (0..=intervals)
        .map(|i| potential.value(i as f64 * h))
        .fold(f64::MAX, f64::min);
    let alpha_pad = [left, right]
        .iter()
        .map(|bc| match bc {
            EdgeCondition::Robin { alpha } if *alpha < 0.0 => alpha * alpha,
            _ => 0.0,
        })
        .fold(0.0f64, f64::max);
    (v_min - alpha_pad - 1.0, potential.threshold())
}
