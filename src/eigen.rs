// SPDX-License-Identifier: AGPL-3.0-only

//! Eigensolvers for the assembled operator pair (K, M).
//!
//! Two structurally different paths, both returning ascending eigenvalues
//! with M-normalized eigenvectors (fᵗMf = 1):
//!
//! - **Bisection path** (production, large N): Sturm-sequence counting via
//!   the LDLT pivot signs, bisection per eigenvalue index inside the
//!   Gershgorin interval, then inverse iteration with partial pivoting for
//!   the eigenvectors. O(k·N) per eigenvalue, exact to machine precision
//!   for well-separated levels.
//! - **Dense path** (verification, small N): cyclic Jacobi rotations on
//!   the full symmetrized matrix. O(N³) and independent of the bisection
//!   machinery, which is what makes it useful as a cross-check.
//!
//! Normalization and mutual M-orthogonality are checked for every returned
//! spectrum; a violation is a solve failure, never a silently accepted
//! result.

use crate::error::WellspringError;
use crate::operator::{Operator, Tridiagonal};
use crate::tolerances::{
    BISECTION_MAX_ITER, INVERSE_ITER_SWEEPS, ORTHONORMALITY_TOL, STURM_PIVOT_FLOOR,
};

/// Ordered eigenvalues and full-grid, M-normalized eigenvectors.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub values: Vec<f64>,
    pub vectors: Vec<Vec<f64>>,
}

/// Count eigenvalues of the symmetric tridiagonal strictly below λ.
///
/// LDLT factorization: the number of negative pivots equals the number of
/// eigenvalues below λ (Sturm sequence).
#[must_use]
pub fn sturm_count(t: &Tridiagonal, lambda: f64) -> usize {
    let n = t.diag.len();
    if n == 0 {
        return 0;
    }

    let mut count = 0;
    let mut q = t.diag[0] - lambda;
    if q < 0.0 {
        count += 1;
    }
    for i in 1..n {
        let q_safe = if q.abs() < STURM_PIVOT_FLOOR {
            if q >= 0.0 {
                STURM_PIVOT_FLOOR
            } else {
                -STURM_PIVOT_FLOOR
            }
        } else {
            q
        };
        q = (t.diag[i] - lambda) - t.off[i - 1] * t.off[i - 1] / q_safe;
        if q < 0.0 {
            count += 1;
        }
    }
    count
}

/// Number of operator eigenvalues strictly below λ, without extracting them.
#[must_use]
pub fn count_below(op: &Operator, lambda: f64) -> usize {
    if !lambda.is_finite() {
        return if lambda > 0.0 { op.dim() } else { 0 };
    }
    sturm_count(&op.symmetrized(), lambda)
}

fn gershgorin(t: &Tridiagonal) -> (f64, f64) {
    let n = t.diag.len();
    let mut lo = f64::MAX;
    let mut hi = f64::MIN;
    for i in 0..n {
        let e_left = if i > 0 { t.off[i - 1].abs() } else { 0.0 };
        let e_right = if i < n - 1 { t.off[i].abs() } else { 0.0 };
        lo = lo.min(t.diag[i] - e_left - e_right);
        hi = hi.max(t.diag[i] + e_left + e_right);
    }
    (lo - 1.0, hi + 1.0)
}

/// k-th smallest eigenvalue (0-based) via Sturm bisection.
fn bisect_index(t: &Tridiagonal, k: usize, lo: f64, hi: f64) -> f64 {
    let mut a = lo;
    let mut b = hi;
    for _ in 0..BISECTION_MAX_ITER {
        let mid = 0.5 * (a + b);
        if (b - a) < 2.0 * f64::EPSILON * mid.abs().max(1.0) {
            break;
        }
        if sturm_count(t, mid) <= k {
            a = mid;
        } else {
            b = mid;
        }
    }
    0.5 * (a + b)
}

/// The `count` lowest eigenvalues of the symmetrized operator, ascending.
#[must_use]
pub fn lowest_eigenvalues(t: &Tridiagonal, count: usize) -> Vec<f64> {
    let n = t.diag.len();
    let count = count.min(n);
    let (lo, hi) = gershgorin(t);
    (0..count).map(|k| bisect_index(t, k, lo, hi)).collect()
}

/// Solve (T − σI)x = b by Gaussian elimination with partial pivoting.
/// Pivoting matters: inverse iteration deliberately makes T − σI nearly
/// singular, and the unpivoted Thomas recurrence loses the eigenvector.
fn solve_shifted(t: &Tridiagonal, sigma: f64, b: &[f64]) -> Vec<f64> {
    let n = t.diag.len();
    let mut d: Vec<f64> = t.diag.iter().map(|&v| v - sigma).collect();
    let mut c = vec![0.0; n]; // superdiagonal (i, i+1)
    let mut e = vec![0.0; n]; // fill-in (i, i+2), created by row swaps
    for i in 0..n - 1 {
        c[i] = t.off[i];
    }
    let mut x = b.to_vec();

    for i in 0..n - 1 {
        let sub = t.off[i]; // element (i+1, i); untouched by earlier steps
        if sub.abs() > d[i].abs() {
            x.swap(i, i + 1);
            let (r1a, r1b, r1c) = (sub, d[i + 1], if i + 2 < n { c[i + 1] } else { 0.0 });
            let (r2a, r2b, r2c) = (d[i], c[i], e[i]);
            d[i] = r1a;
            c[i] = r1b;
            e[i] = r1c;
            let m = r2a / d[i];
            d[i + 1] = r2b - m * c[i];
            if i + 2 < n {
                c[i + 1] = r2c - m * e[i];
            }
            x[i + 1] -= m * x[i];
        } else {
            let pivot = if d[i].abs() < STURM_PIVOT_FLOOR {
                if d[i] >= 0.0 {
                    STURM_PIVOT_FLOOR
                } else {
                    -STURM_PIVOT_FLOOR
                }
            } else {
                d[i]
            };
            let m = sub / pivot;
            d[i + 1] -= m * c[i];
            if i + 2 < n {
                c[i + 1] -= m * e[i];
            }
            x[i + 1] -= m * x[i];
        }
    }

    for i in (0..n).rev() {
        let mut s = x[i];
        if i + 1 < n {
            s -= c[i] * x[i + 1];
        }
        if i + 2 < n {
            s -= e[i] * x[i + 2];
        }
        let pivot = if d[i].abs() < 1e-280 {
            if d[i] >= 0.0 {
                1e-280
            } else {
                -1e-280
            }
        } else {
            d[i]
        };
        x[i] = s / pivot;
    }
    x
}

/// Deterministic start vectors for inverse iteration (same LCG constants
/// as the reproducible-disorder generator elsewhere in the ecosystem).
struct LcgRng(u64);

impl LcgRng {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_add(1))
    }

    fn uniform(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Eigenvector of the symmetrized tridiagonal for a converged λ, via
/// inverse iteration; unit Euclidean norm, deterministic sign.
fn eigenvector(t: &Tridiagonal, lambda: f64) -> Vec<f64> {
    let n = t.diag.len();
    let mut rng = LcgRng::new(0x5eed ^ lambda.to_bits());
    let mut v: Vec<f64> = (0..n).map(|_| rng.uniform() - 0.5).collect();
    normalize(&mut v);

    let sigma = lambda + lambda.abs().max(1.0) * 1e-12;
    for _ in 0..INVERSE_ITER_SWEEPS {
        v = solve_shifted(t, sigma, &v);
        normalize(&mut v);
    }

    // Deterministic sign: largest-magnitude component positive.
    let (mut idx, mut best) = (0, 0.0f64);
    for (i, &x) in v.iter().enumerate() {
        if x.abs() > best {
            best = x.abs();
            idx = i;
        }
    }
    if v[idx] < 0.0 {
        for x in &mut v {
            *x = -*x;
        }
    }
    v
}

/// M-weighted inner product of two full-mass-space vectors.
fn m_inner(f: &[f64], g: &[f64], mass: &[f64]) -> f64 {
    f.iter()
        .zip(g)
        .zip(mass)
        .map(|((&a, &b), &m)| a * b * m)
        .sum()
}

/// Convert symmetrized-space vectors to M-normalized physical vectors,
/// check the orthonormality invariants, and embed onto the full grid.
fn finish(
    op: &Operator,
    values: Vec<f64>,
    ys: Vec<Vec<f64>>,
) -> Result<Spectrum, WellspringError> {
    let mass = op.mass();
    let fs: Vec<Vec<f64>> = ys
        .iter()
        .map(|y| {
            y.iter()
                .zip(mass)
                .map(|(&yi, &mi)| yi / mi.sqrt())
                .collect()
        })
        .collect();

    for (i, fi) in fs.iter().enumerate() {
        let norm = m_inner(fi, fi, mass);
        if (norm - 1.0).abs() > ORTHONORMALITY_TOL {
            return Err(WellspringError::Convergence(format!(
                "eigenvector {i} normalization defect {:.3e}",
                (norm - 1.0).abs()
            )));
        }
        for (j, fj) in fs.iter().enumerate().skip(i + 1) {
            let overlap = m_inner(fi, fj, mass).abs();
            if overlap > ORTHONORMALITY_TOL {
                return Err(WellspringError::Convergence(format!(
                    "eigenvectors {i},{j} not M-orthogonal: |<f_i,f_j>| = {overlap:.3e} \
                     (λ_i={:.6e}, λ_j={:.6e})",
                    values[i], values[j]
                )));
            }
        }
    }

    let vectors = fs.iter().map(|f| op.embed(f)).collect();
    Ok(Spectrum { values, vectors })
}

/// Production path: Sturm bisection + inverse iteration for the `count`
/// lowest eigenpairs.
///
/// # Errors
///
/// `Convergence` if the returned pairs violate the normalization or
/// orthogonality invariants.
pub fn solve_bisection(op: &Operator, count: usize) -> Result<Spectrum, WellspringError> {
    let t = op.symmetrized();
    let count = count.min(t.diag.len());
    let values = lowest_eigenvalues(&t, count);
    let ys: Vec<Vec<f64>> = values.iter().map(|&l| eigenvector(&t, l)).collect();
    finish(op, values, ys)
}

/// Verification path: cyclic Jacobi on the dense symmetrized matrix.
/// O(N³); intended for small operators.
///
/// # Errors
///
/// `Convergence` on invariant violation, as for [`solve_bisection`].
pub fn solve_dense(op: &Operator, count: usize) -> Result<Spectrum, WellspringError> {
    let t = op.symmetrized();
    let n = t.diag.len();
    let count = count.min(n);

    let mut a = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        a[i][i] = t.diag[i];
    }
    for i in 0..n - 1 {
        a[i][i + 1] = t.off[i];
        a[i + 1][i] = t.off[i];
    }
    let mut v = vec![vec![0.0f64; n]; n];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let scale: f64 = t
        .diag
        .iter()
        .chain(&t.off)
        .fold(0.0f64, |m, &x| m.max(x.abs()))
        .max(1.0);

    for _sweep in 0..100 {
        let mut off2 = 0.0;
        for p in 0..n {
            for q in p + 1..n {
                off2 += a[p][q] * a[p][q];
            }
        }
        if off2.sqrt() < 1e-13 * scale {
            break;
        }
        for p in 0..n - 1 {
            for q in p + 1..n {
                if a[p][q].abs() < 1e-300 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let tt = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (tt * tt + 1.0).sqrt();
                let s = tt * c;
                for i in 0..n {
                    let aip = a[i][p];
                    let aiq = a[i][q];
                    a[i][p] = c * aip - s * aiq;
                    a[i][q] = s * aip + c * aiq;
                }
                for j in 0..n {
                    let apj = a[p][j];
                    let aqj = a[q][j];
                    a[p][j] = c * apj - s * aqj;
                    a[q][j] = s * apj + c * aqj;
                }
                for row in &mut v {
                    let vip = row[p];
                    let viq = row[q];
                    row[p] = c * vip - s * viq;
                    row[q] = s * vip + c * viq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[i][i].total_cmp(&a[j][j]));

    let values: Vec<f64> = order.iter().take(count).map(|&i| a[i][i]).collect();
    let ys: Vec<Vec<f64>> = order
        .iter()
        .take(count)
        .map(|&col| {
            let mut y: Vec<f64> = v.iter().map(|row| row[col]).collect();
            normalize(&mut y);
            let (mut idx, mut best) = (0, 0.0f64);
            for (i, &x) in y.iter().enumerate() {
                if x.abs() > best {
                    best = x.abs();
                    idx = i;
                }
            }
            if y[idx] < 0.0 {
                for x in &mut y {
                    *x = -*x;
                }
            }
            y
        })
        .collect();

    finish(op, values, ys)
}
