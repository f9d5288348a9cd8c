// SPDX-License-Identifier: AGPL-3.0-only

//! Weak-form assembly of the discrete Sturm-Liouville operator.
//!
//! Builds the stiffness matrix K and lumped mass matrix M for
//! -d²/dξ² + V(ξ) on linear finite elements, so the generalized problem
//! K f = λ M f reproduces the continuum problem with the requested
//! boundary conditions.
//!
//! Boundary conditions enter through the weak form
//!
//! ```text
//! ∫ f'g' dξ + α_left·f(0)g(0) + α_right·f(ℓ)g(ℓ) + ∫ V f g dξ = λ ∫ f g dξ
//! ```
//!
//! with the outward-normal Robin condition ∂f/∂n + α f = 0 at each end.
//! The Robin coefficient lands directly on the boundary stiffness entry
//! (K[0,0] = 1/h + α + ...), an O(1) term that survives h → 0. The
//! historical alternative — a ghost-point correction of size α/h against a
//! diagonal of size 1/h² — vanishes under refinement and silently collapses
//! every Robin problem onto the Neumann solution; the assembly here makes
//! that failure mode structurally impossible, and the symmetry
//! post-condition rejects any regression toward asymmetric boundary rows.
//!
//! Dirichlet ends are a distinguished variant, implemented by eliminating
//! the boundary row and column rather than by a large-α penalty.

use crate::error::WellspringError;
use crate::grid::Grid;
use crate::tolerances::SYMMETRY_TOL;
use serde::{Deserialize, Serialize};

/// Condition at one end of the interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeCondition {
    /// f = 0 at the boundary (the α → ∞ limit, as its own variant so no
    /// literal infinity ever enters the matrix).
    Dirichlet,
    /// ∂f/∂n + α·f = 0 with n the outward normal; α = 0 is Neumann.
    Robin { alpha: f64 },
}

impl EdgeCondition {
    /// Neumann: zero outward derivative.
    pub const NEUMANN: Self = Self::Robin { alpha: 0.0 };

    /// Validate the Robin coefficient.
    ///
    /// # Errors
    ///
    /// `Config` if α is not finite.
    pub fn validate(&self) -> Result<(), WellspringError> {
        match *self {
            Self::Dirichlet => Ok(()),
            Self::Robin { alpha } => {
                if alpha.is_finite() {
                    Ok(())
                } else {
                    Err(WellspringError::Config(format!(
                        "Robin coefficient must be finite, got {alpha} \
                         (use EdgeCondition::Dirichlet for the α → ∞ limit)"
                    )))
                }
            }
        }
    }
}

/// General tridiagonal matrix with independently stored sub- and
/// super-diagonals, so the symmetry post-condition measures what the
/// assembly actually produced.
#[derive(Debug, Clone)]
pub struct TriMatrix {
    pub diag: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl TriMatrix {
    fn zeros(n: usize) -> Self {
        Self {
            diag: vec![0.0; n],
            lower: vec![0.0; n.saturating_sub(1)],
            upper: vec![0.0; n.saturating_sub(1)],
        }
    }

    /// Matrix dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.diag.len()
    }

    /// Largest |K[i,j] − K[j,i]| relative to the largest entry magnitude.
    #[must_use]
    pub fn symmetry_defect(&self) -> f64 {
        let scale = self
            .diag
            .iter()
            .chain(&self.lower)
            .chain(&self.upper)
            .fold(0.0f64, |m, &v| m.max(v.abs()))
            .max(1.0);
        self.lower
            .iter()
            .zip(&self.upper)
            .fold(0.0f64, |m, (&l, &u)| m.max((l - u).abs()))
            / scale
    }
}

/// Verified-symmetric tridiagonal (diagonal + one off-diagonal).
#[derive(Debug, Clone)]
pub struct Tridiagonal {
    pub diag: Vec<f64>,
    pub off: Vec<f64>,
}

/// Assembled operator pair (K, M) on the retained nodes, plus the
/// bookkeeping needed to embed reduced eigenvectors back onto the full
/// grid after Dirichlet elimination.
#[derive(Debug, Clone)]
pub struct Operator {
    stiffness: TriMatrix,
    mass: Vec<f64>,
    nodes: usize,
    left_trimmed: bool,
    right_trimmed: bool,
}

impl Operator {
    /// Retained-space dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.mass.len()
    }

    /// Stiffness matrix K on retained nodes.
    #[must_use]
    pub const fn stiffness(&self) -> &TriMatrix {
        &self.stiffness
    }

    /// Lumped mass diagonal on retained nodes.
    #[must_use]
    pub fn mass(&self) -> &[f64] {
        &self.mass
    }

    /// Reduce the generalized problem K f = λ M f to the standard
    /// symmetric tridiagonal T y = λ y with T = M^{-1/2} K M^{-1/2},
    /// y = M^{1/2} f. Valid because M is diagonal positive definite
    /// (checked at assembly).
    #[must_use]
    pub fn symmetrized(&self) -> Tridiagonal {
        let n = self.dim();
        let diag: Vec<f64> = (0..n)
            .map(|i| self.stiffness.diag[i] / self.mass[i])
            .collect();
        let off: Vec<f64> = (0..n.saturating_sub(1))
            .map(|i| self.stiffness.upper[i] / (self.mass[i] * self.mass[i + 1]).sqrt())
            .collect();
        Tridiagonal { diag, off }
    }

    /// Map a retained-space vector back onto the full grid, inserting the
    /// zeros eliminated by Dirichlet ends.
    #[must_use]
    pub fn embed(&self, reduced: &[f64]) -> Vec<f64> {
        let mut full = vec![0.0; self.nodes];
        let offset = usize::from(self.left_trimmed);
        full[offset..offset + reduced.len()].copy_from_slice(reduced);
        full
    }

    /// Restrict a full-grid vector to the retained nodes.
    #[must_use]
    pub fn restrict(&self, full: &[f64]) -> Vec<f64> {
        let lo = usize::from(self.left_trimmed);
        let hi = self.nodes - usize::from(self.right_trimmed);
        full[lo..hi].to_vec()
    }
}

/// Assemble K and M for the sampled potential and boundary conditions.
///
/// Post-conditions, enforced here and never downgraded to warnings:
///   - K symmetric to within [`SYMMETRY_TOL`] for any (α_left, α_right);
///   - M strictly positive definite.
///
/// # Errors
///
/// `Config` for an invalid boundary coefficient or a sample/grid length
/// mismatch; `SingularOperator` if a post-condition fails.
pub fn assemble(
    grid: &Grid,
    v: &[f64],
    left: EdgeCondition,
    right: EdgeCondition,
) -> Result<Operator, WellspringError> {
    left.validate()?;
    right.validate()?;
    let nodes = grid.nodes();
    if v.len() != nodes {
        return Err(WellspringError::Config(format!(
            "potential samples ({}) do not match grid nodes ({nodes})",
            v.len()
        )));
    }

    let h = grid.spacing();
    let mut k = TriMatrix::zeros(nodes);
    let mut m = vec![0.0; nodes];

    // Element loop: linear elements on [x_e, x_{e+1}] contribute the
    // exact Laplacian block (1/h)[[1,-1],[-1,1]] and a lumped mass h/2
    // per node; the potential rides on the lumped mass.
    for e in 0..grid.intervals() {
        k.diag[e] += 1.0 / h;
        k.diag[e + 1] += 1.0 / h;
        k.lower[e] -= 1.0 / h;
        k.upper[e] -= 1.0 / h;
        m[e] += 0.5 * h;
        m[e + 1] += 0.5 * h;
    }
    for i in 0..nodes {
        k.diag[i] += v[i] * m[i];
    }

    // Robin boundary stiffness: the α f(0)g(0) surface term of the weak
    // form, an O(1) diagonal entry independent of h.
    if let EdgeCondition::Robin { alpha } = left {
        k.diag[0] += alpha;
    }
    if let EdgeCondition::Robin { alpha } = right {
        k.diag[nodes - 1] += alpha;
    }

    // Dirichlet elimination: drop the boundary row and column.
    let left_trimmed = left == EdgeCondition::Dirichlet;
    let right_trimmed = right == EdgeCondition::Dirichlet;
    let lo = usize::from(left_trimmed);
    let hi = nodes - usize::from(right_trimmed);
    if hi - lo < 3 {
        return Err(WellspringError::Config(
            "fewer than 3 unknowns remain after Dirichlet elimination".into(),
        ));
    }

    let reduced = TriMatrix {
        diag: k.diag[lo..hi].to_vec(),
        lower: k.lower[lo..hi - 1].to_vec(),
        upper: k.upper[lo..hi - 1].to_vec(),
    };
    let mass: Vec<f64> = m[lo..hi].to_vec();

    let defect = reduced.symmetry_defect();
    if defect > SYMMETRY_TOL {
        return Err(WellspringError::SingularOperator(format!(
            "stiffness symmetry defect {defect:.3e} exceeds {SYMMETRY_TOL:.1e} \
             (α_left={left:?}, α_right={right:?})"
        )));
    }
    if let Some(bad) = mass.iter().find(|&&mi| !(mi > 0.0) || !mi.is_finite()) {
        return Err(WellspringError::SingularOperator(format!(
            "mass matrix not positive definite: entry {bad}"
        )));
    }

    Ok(Operator {
        stiffness: reduced,
        mass,
        nodes,
        left_trimmed,
        right_trimmed,
    })
}
