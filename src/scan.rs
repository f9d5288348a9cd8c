// SPDX-License-Identifier: AGPL-3.0-only

//! Parameter-space scanner: a lattice of (depth, width, α) configurations
//! solved in parallel and classified for robustness.
//!
//! The scanner runs V0 once up front and refuses to start if it fails; a
//! broken solver must not produce an atlas. Per-point failures are data
//! (the point is marked `Failed` with the error text) except for the fatal
//! classes, which abort the whole scan.
//!
//! A point is `Robust` only if it verified cleanly, its gap margins are
//! comfortable, and every lattice neighbor with a known census agrees on
//! N_bound — a point whose neighbor already counts differently sits on a
//! counting boundary no matter how clean its own margins look.

use crate::error::WellspringError;
use crate::operator::EdgeCondition;
use crate::pipeline::{solve_verified, SolveResult, SolveStatus, SolverConfig};
use crate::verify;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Scan lattice: depth and width axes over the base potential family,
/// with an optional symmetric-Robin α axis. Empty `alphas` keeps the base
/// configuration's boundary conditions.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub base: SolverConfig,
    pub depths: Vec<f64>,
    pub widths: Vec<f64>,
    pub alphas: Vec<f64>,
    /// Wall-clock budget; points starting after it is spent are skipped.
    pub budget: Option<Duration>,
}

impl ScanPlan {
    fn validate(&self) -> Result<(), WellspringError> {
        if self.depths.is_empty() || self.widths.is_empty() {
            return Err(WellspringError::Config(
                "scan needs at least one depth and one width".to_owned(),
            ));
        }
        for &v in self.depths.iter().chain(&self.widths).chain(&self.alphas) {
            if !v.is_finite() {
                return Err(WellspringError::Config(format!(
                    "non-finite scan axis value {v}"
                )));
            }
        }
        Ok(())
    }

    fn n_alpha(&self) -> usize {
        self.alphas.len().max(1)
    }

    fn point_config(&self, i: usize, j: usize, k: usize) -> SolverConfig {
        let mut config = self.base.clone();
        config.potential = self.base.potential.reshaped(self.depths[i], self.widths[j]);
        if let Some(&alpha) = self.alphas.get(k) {
            config.left = EdgeCondition::Robin { alpha };
            config.right = EdgeCondition::Robin { alpha };
        }
        config
    }
}

/// Robustness classification of one lattice point, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointClass {
    /// Verified, comfortable margins, census agrees with all neighbors.
    Robust,
    /// Verified but a gap margin is within 5% of a counting change.
    FineTuned,
    /// Verified but a lattice neighbor counts a different N_bound.
    NotRobust,
    /// Cross-method check or overlap convergence failed.
    NotVerified,
    /// Stability probes failed.
    Unstable,
    /// Solve error; see the note.
    Failed,
    /// Not attempted (budget exhausted).
    Skipped,
}

/// One solved (or skipped) lattice point.
#[derive(Debug, Clone, Serialize)]
pub struct AtlasPoint {
    pub depth: f64,
    pub width: f64,
    pub alpha: Option<f64>,
    pub n_bound: Option<usize>,
    pub class: PointClass,
    pub note: String,
    pub result: Option<SolveResult>,
}

/// Classified scan output. Points are stored in row-major
/// (depth, width, alpha) order.
#[derive(Debug, Clone)]
pub struct Atlas {
    pub points: Vec<AtlasPoint>,
    n_depth: usize,
    n_width: usize,
    n_alpha: usize,
}

impl Atlas {
    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.n_width + j) * self.n_alpha + k
    }

    fn neighbors(&self, i: usize, j: usize, k: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(6);
        if i > 0 {
            out.push(self.index(i - 1, j, k));
        }
        if i + 1 < self.n_depth {
            out.push(self.index(i + 1, j, k));
        }
        if j > 0 {
            out.push(self.index(i, j - 1, k));
        }
        if j + 1 < self.n_width {
            out.push(self.index(i, j + 1, k));
        }
        if k > 0 {
            out.push(self.index(i, j, k - 1));
        }
        if k + 1 < self.n_alpha {
            out.push(self.index(i, j, k + 1));
        }
        out
    }

    /// Demote provisionally robust points whose neighbors disagree on
    /// N_bound. Neighbors without a census (failed or skipped) abstain.
    fn apply_neighbor_rule(&mut self) {
        let mut demote = Vec::new();
        for i in 0..self.n_depth {
            for j in 0..self.n_width {
                for k in 0..self.n_alpha {
                    let idx = self.index(i, j, k);
                    if self.points[idx].class != PointClass::Robust {
                        continue;
                    }
                    let own = self.points[idx].n_bound;
                    let disagrees = self.neighbors(i, j, k).into_iter().any(|nb| {
                        matches!((self.points[nb].n_bound, own), (Some(a), Some(b)) if a != b)
                    });
                    if disagrees {
                        demote.push(idx);
                    }
                }
            }
        }
        for idx in demote {
            self.points[idx].class = PointClass::NotRobust;
            self.points[idx].note = "neighbor counts a different N_bound".to_owned();
        }
    }

    /// Points robustly exhibiting exactly `k` bound states.
    #[must_use]
    pub fn robust_region(&self, k: usize) -> Vec<&AtlasPoint> {
        self.points
            .iter()
            .filter(|p| p.class == PointClass::Robust && p.n_bound == Some(k))
            .collect()
    }

    /// Per-class point counts, in reporting order.
    #[must_use]
    pub fn class_counts(&self) -> Vec<(PointClass, usize)> {
        use PointClass::{Failed, FineTuned, NotRobust, NotVerified, Robust, Skipped, Unstable};
        [
            Robust, FineTuned, NotRobust, NotVerified, Unstable, Failed, Skipped,
        ]
        .into_iter()
        .map(|c| (c, self.points.iter().filter(|p| p.class == c).count()))
        .collect()
    }
}

fn classify_result(result: &SolveResult) -> (PointClass, String) {
    match result.status {
        SolveStatus::NotVerified => (
            PointClass::NotVerified,
            result.verification.v1.detail.clone(),
        ),
        SolveStatus::NotConverged => (
            PointClass::NotVerified,
            format!("overlap drift {:.3e}", result.i4_drift),
        ),
        SolveStatus::Unstable => (PointClass::Unstable, result.verification.v2.detail.clone()),
        SolveStatus::Verified => {
            if result.gap_below < crate::tolerances::GAP_MARGIN_FRACTION
                || result.gap_above < crate::tolerances::GAP_MARGIN_FRACTION
            {
                (
                    PointClass::FineTuned,
                    format!(
                        "gap margins {:.3e} / {:.3e}",
                        result.gap_below, result.gap_above
                    ),
                )
            } else {
                (PointClass::Robust, String::new())
            }
        }
    }
}

/// Run the scan: V0 gate, parallel per-point solves, neighbor-rule
/// classification.
///
/// # Errors
///
/// `Benchmark` if V0 fails before any point is attempted; `Config` for a
/// malformed plan; any fatal per-point error aborts the scan and is
/// returned as-is. Recoverable per-point errors become `Failed` points.
pub fn run_scan(plan: &ScanPlan) -> Result<Atlas, WellspringError> {
    plan.validate()?;

    let v0 = verify::run_v0();
    if !v0.passed {
        return Err(WellspringError::Benchmark(format!(
            "analytic benchmarks failed, refusing to scan: {}",
            v0.detail
        )));
    }

    let started = Instant::now();
    let coords: Vec<(usize, usize, usize)> = (0..plan.depths.len())
        .flat_map(|i| {
            (0..plan.widths.len())
                .flat_map(move |j| (0..plan.n_alpha()).map(move |k| (i, j, k)))
        })
        .collect();

    let points: Vec<AtlasPoint> = coords
        .par_iter()
        .map(|&(i, j, k)| -> Result<AtlasPoint, WellspringError> {
            let depth = plan.depths[i];
            let width = plan.widths[j];
            let alpha = plan.alphas.get(k).copied();

            if let Some(budget) = plan.budget {
                if started.elapsed() > budget {
                    return Ok(AtlasPoint {
                        depth,
                        width,
                        alpha,
                        n_bound: None,
                        class: PointClass::Skipped,
                        note: "budget exhausted".to_owned(),
                        result: None,
                    });
                }
            }

            let config = plan.point_config(i, j, k);
            match solve_verified(&config, &v0) {
                Ok(result) => {
                    let (class, note) = classify_result(&result);
                    Ok(AtlasPoint {
                        depth,
                        width,
                        alpha,
                        n_bound: Some(result.n_bound),
                        class,
                        note,
                        result: Some(result),
                    })
                }
                Err(e) if e.is_fatal_for_scan() => Err(e),
                Err(e) => Ok(AtlasPoint {
                    depth,
                    width,
                    alpha,
                    n_bound: None,
                    class: PointClass::Failed,
                    note: e.to_string(),
                    result: None,
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut atlas = Atlas {
        points,
        n_depth: plan.depths.len(),
        n_width: plan.widths.len(),
        n_alpha: plan.n_alpha(),
    };
    atlas.apply_neighbor_rule();
    Ok(atlas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::OverlapSpec;
    use crate::potential::Potential;

    fn gaussian_base() -> SolverConfig {
        SolverConfig {
            potential: Potential::Gaussian {
                depth: 10.0,
                width: 0.4,
                center: 2.0,
            },
            length: 4.0,
            intervals: 800,
            left: EdgeCondition::Dirichlet,
            right: EdgeCondition::Dirichlet,
            overlap: OverlapSpec::default(),
        }
    }

    fn hand_point(n_bound: usize, class: PointClass) -> AtlasPoint {
        AtlasPoint {
            depth: 1.0,
            width: 1.0,
            alpha: None,
            n_bound: Some(n_bound),
            class,
            note: String::new(),
            result: None,
        }
    }

    #[test]
    fn neighbor_rule_demotes_counting_boundary() {
        let mut atlas = Atlas {
            points: vec![
                hand_point(1, PointClass::Robust),
                hand_point(1, PointClass::Robust),
                hand_point(2, PointClass::Robust),
            ],
            n_depth: 3,
            n_width: 1,
            n_alpha: 1,
        };
        atlas.apply_neighbor_rule();
        assert_eq!(atlas.points[0].class, PointClass::Robust);
        assert_eq!(atlas.points[1].class, PointClass::NotRobust);
        assert_eq!(atlas.points[2].class, PointClass::NotRobust);
    }

    #[test]
    fn neighbor_rule_ignores_points_without_census() {
        let mut failed = hand_point(0, PointClass::Failed);
        failed.n_bound = None;
        let mut atlas = Atlas {
            points: vec![hand_point(1, PointClass::Robust), failed],
            n_depth: 2,
            n_width: 1,
            n_alpha: 1,
        };
        atlas.apply_neighbor_rule();
        assert_eq!(atlas.points[0].class, PointClass::Robust);
    }

    #[test]
    fn rejects_empty_axes() {
        let plan = ScanPlan {
            base: gaussian_base(),
            depths: vec![],
            widths: vec![0.4],
            alphas: vec![],
            budget: None,
        };
        assert!(matches!(
            run_scan(&plan),
            Err(WellspringError::Config(_))
        ));
    }

    #[test]
    fn small_scan_produces_census_staircase() {
        let plan = ScanPlan {
            base: gaussian_base(),
            depths: vec![5.0, 40.0],
            widths: vec![0.4],
            alphas: vec![],
            budget: None,
        };
        let atlas = run_scan(&plan).unwrap();
        assert_eq!(atlas.points.len(), 2);
        let counts: Vec<usize> = atlas.points.iter().map(|p| p.n_bound.unwrap()).collect();
        assert!(counts[0] >= 1);
        assert!(counts[1] >= counts[0], "deeper well lost a level: {counts:?}");
    }

    #[test]
    fn zero_budget_skips_everything() {
        let plan = ScanPlan {
            base: gaussian_base(),
            depths: vec![5.0, 10.0],
            widths: vec![0.4],
            alphas: vec![],
            budget: Some(Duration::ZERO),
        };
        let atlas = run_scan(&plan).unwrap();
        assert!(atlas
            .points
            .iter()
            .all(|p| p.class == PointClass::Skipped));
    }
}
