// SPDX-License-Identifier: AGPL-3.0-only

//! Single-configuration solve pipeline.
//!
//! One `SolverConfig` in, one `SolveResult` out: grid → potential samples
//! → weak-form operator → eigensolve → bound-state census → overlap
//! integral with {N, 2N, 4N} convergence tracking. Pure and synchronous;
//! the scanner owns all parallelism.
//!
//! `SolveResult` is the only artifact downstream consumers read. It always
//! carries an explicit status, even on success.

use crate::eigen::{self, Spectrum};
use crate::error::WellspringError;
use crate::grid::Grid;
use crate::operator::{assemble, EdgeCondition};
use crate::overlap::{self, OverlapSpec};
use crate::potential::Potential;
use crate::spectrum::{census, BoundCensus};
use crate::tolerances::{CONFINED_LEVELS, EXTRA_LEVELS, MIN_LEVELS, OVERLAP_DRIFT_TOL};
use crate::verify::{GateReport, VerificationStatus};
use serde::{Deserialize, Serialize};

/// Everything a single solve needs. Immutable contract with the outside;
/// file formats and CLI flags live with external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub potential: Potential,
    /// Domain length ℓ.
    pub length: f64,
    /// Interval count N.
    pub intervals: usize,
    pub left: EdgeCondition,
    pub right: EdgeCondition,
    #[serde(default)]
    pub overlap: OverlapSpec,
}

/// Overall disposition of a solved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// All gates passed and the overlap integral converged.
    Verified,
    /// Overlap integral drifted beyond tolerance under refinement.
    NotConverged,
    /// Cross-method gate (V1) failed.
    NotVerified,
    /// Stability gate (V2) failed.
    Unstable,
}

/// In-memory result of the numerical stages, eigenvectors included.
#[derive(Debug, Clone)]
pub struct CoreSolve {
    pub spectrum: Spectrum,
    pub census: BoundCensus,
    pub threshold: f64,
    pub i4: f64,
    pub i4_drift: f64,
    pub i4_converged: bool,
    pub grid_coarse: bool,
}

/// Serialized per-configuration record: ordered eigenvalues, N_bound, I4
/// with convergence delta, gap margins, and per-gate verification status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub config: SolverConfig,
    pub eigenvalues: Vec<f64>,
    pub n_bound: usize,
    pub gap_below: f64,
    pub gap_above: f64,
    pub i4: f64,
    pub i4_drift: f64,
    pub i4_converged: bool,
    pub grid_coarse: bool,
    pub verification: VerificationStatus,
    pub status: SolveStatus,
}

pub(crate) struct StageOutput {
    pub spectrum: Spectrum,
    pub census: BoundCensus,
    pub threshold: f64,
    pub grid: Grid,
}

/// Run grid build, potential sampling, assembly, and eigensolve for one
/// configuration at a resolution multiple of the configured N.
pub(crate) fn run_stages(
    config: &SolverConfig,
    refine: usize,
) -> Result<StageOutput, WellspringError> {
    config.potential.validate()?;
    let grid = Grid::new(
        config.length,
        config.intervals * refine,
        config.potential.feature_scale(),
    )?;
    let v = config.potential.sample(&grid);
    let op = assemble(&grid, &v, config.left, config.right)?;

    let threshold = config.potential.threshold();
    let levels = if threshold.is_finite() {
        (eigen::count_below(&op, threshold) + EXTRA_LEVELS).max(MIN_LEVELS)
    } else {
        CONFINED_LEVELS
    }
    .min(op.dim());

    let spectrum = eigen::solve_bisection(&op, levels)?;
    let cs = census(
        &spectrum.values,
        threshold,
        config.potential.energy_scale(),
        config.length,
    );

    Ok(StageOutput {
        spectrum,
        census: cs,
        threshold,
        grid,
    })
}

/// Overlap integral of the configured mode at a refined resolution,
/// solving only as many levels as the mode index requires.
fn overlap_at(config: &SolverConfig, refine: usize) -> Result<f64, WellspringError> {
    let grid = Grid::new(
        config.length,
        config.intervals * refine,
        config.potential.feature_scale(),
    )?;
    let v = config.potential.sample(&grid);
    let op = assemble(&grid, &v, config.left, config.right)?;

    let wanted = config.overlap.mode + 1;
    if wanted > op.dim() {
        return Err(WellspringError::Config(format!(
            "overlap mode {} exceeds operator dimension {}",
            config.overlap.mode,
            op.dim()
        )));
    }
    let spec = eigen::solve_bisection(&op, wanted)?;
    Ok(overlap::overlap(
        &spec.vectors[config.overlap.mode],
        grid.spacing(),
        config.overlap.power,
    ))
}

/// Solve one configuration: spectrum, census, and overlap integral with
/// {N, 2N, 4N} convergence tracking.
///
/// # Errors
///
/// `Config` for malformed input, `SingularOperator` for an assembly
/// post-condition violation, `Convergence` for eigenpair invariant
/// violations.
pub fn solve(config: &SolverConfig) -> Result<CoreSolve, WellspringError> {
    let stages = run_stages(config, 1)?;

    if config.overlap.mode >= stages.spectrum.vectors.len() {
        return Err(WellspringError::Config(format!(
            "overlap mode {} not among the {} solved levels",
            config.overlap.mode,
            stages.spectrum.vectors.len()
        )));
    }
    let i4_base = overlap::overlap(
        &stages.spectrum.vectors[config.overlap.mode],
        stages.grid.spacing(),
        config.overlap.power,
    );

    let i4_mid = overlap_at(config, 2)?;
    let i4_fine = overlap_at(config, 4)?;
    let drift = overlap::relative_drift(i4_base, i4_fine)
        .max(overlap::relative_drift(i4_mid, i4_fine));

    Ok(CoreSolve {
        spectrum: stages.spectrum,
        census: stages.census,
        threshold: stages.threshold,
        i4: i4_base,
        i4_drift: drift,
        i4_converged: drift < OVERLAP_DRIFT_TOL,
        grid_coarse: stages.grid.is_coarse(),
    })
}

/// Solve and run the per-configuration verification gates (V1, V2),
/// stamping the scan-level V0 outcome into the record.
///
/// # Errors
///
/// As for [`solve`].
pub fn solve_verified(
    config: &SolverConfig,
    v0: &GateReport,
) -> Result<SolveResult, WellspringError> {
    let core = solve(config)?;
    let v1 = crate::verify::run_v1(config, &core);
    let v2 = crate::verify::run_v2(config, &core);

    let status = if !v1.passed {
        SolveStatus::NotVerified
    } else if !v2.passed {
        SolveStatus::Unstable
    } else if !core.i4_converged {
        SolveStatus::NotConverged
    } else {
        SolveStatus::Verified
    };

    Ok(SolveResult {
        config: config.clone(),
        eigenvalues: core.spectrum.values.clone(),
        n_bound: core.census.n_bound,
        gap_below: core.census.gap_below,
        gap_above: core.census.gap_above,
        i4: core.i4,
        i4_drift: core.i4_drift,
        i4_converged: core.i4_converged,
        grid_coarse: core.grid_coarse,
        verification: VerificationStatus {
            v0: v0.clone(),
            v1,
            v2,
        },
        status,
    })
}
