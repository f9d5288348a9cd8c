// SPDX-License-Identifier: AGPL-3.0-only

//! Uniform discretization of the solve interval [0, ℓ].
//!
//! A grid is owned by exactly one solve invocation and never mutated after
//! construction. Nodes include both endpoints: N intervals, N+1 nodes,
//! spacing h = ℓ/N.

use crate::error::WellspringError;
use crate::tolerances::{MIN_RESOLUTION, RESOLUTION_RATIO_WARN};

/// Uniform grid over [0, ℓ].
#[derive(Debug, Clone)]
pub struct Grid {
    length: f64,
    intervals: usize,
    spacing: f64,
    /// True when h is too large for the smallest potential length scale.
    /// A warning condition: the verification ladder, not this flag,
    /// decides whether results are usable.
    coarse: bool,
}

impl Grid {
    /// Build a grid of `intervals` uniform cells over `[0, length]`.
    ///
    /// `feature_scale` is the smallest length scale of the potential to be
    /// sampled (well width, kink thickness); the grid is flagged coarse
    /// when fewer than ~8 nodes fall across one feature.
    ///
    /// # Errors
    ///
    /// `Config` if `length ≤ 0` or `intervals` is below the minimum.
    pub fn new(length: f64, intervals: usize, feature_scale: f64) -> Result<Self, WellspringError> {
        if !(length > 0.0) || !length.is_finite() {
            return Err(WellspringError::Config(format!(
                "domain length must be positive and finite, got {length}"
            )));
        }
        if intervals < MIN_RESOLUTION {
            return Err(WellspringError::Config(format!(
                "grid needs at least {MIN_RESOLUTION} intervals, got {intervals}"
            )));
        }

        let spacing = length / intervals as f64;
        let coarse = feature_scale.is_finite()
            && feature_scale > 0.0
            && spacing > RESOLUTION_RATIO_WARN * feature_scale;

        Ok(Self {
            length,
            intervals,
            spacing,
            coarse,
        })
    }

    /// Number of intervals N.
    #[must_use]
    pub const fn intervals(&self) -> usize {
        self.intervals
    }

    /// Number of nodes, N+1 (both endpoints included).
    #[must_use]
    pub const fn nodes(&self) -> usize {
        self.intervals + 1
    }

    /// Grid spacing h = ℓ/N.
    #[must_use]
    pub const fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Domain length ℓ.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Whether the grid under-resolves the potential's smallest feature.
    #[must_use]
    pub const fn is_coarse(&self) -> bool {
        self.coarse
    }

    /// Coordinate of node i.
    #[must_use]
    pub fn node(&self, i: usize) -> f64 {
        i as f64 * self.spacing
    }

    /// All node coordinates, ascending.
    #[must_use]
    pub fn coordinates(&self) -> Vec<f64> {
        (0..self.nodes()).map(|i| self.node(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_and_counts() {
        let g = Grid::new(2.0, 100, 0.5).unwrap();
        assert_eq!(g.intervals(), 100);
        assert_eq!(g.nodes(), 101);
        assert!((g.spacing() - 0.02).abs() < 1e-15);
        assert!((g.node(100) - 2.0).abs() < 1e-12);
        assert!(!g.is_coarse());
    }

    #[test]
    fn rejects_nonpositive_length() {
        assert!(Grid::new(0.0, 100, 1.0).is_err());
        assert!(Grid::new(-1.0, 100, 1.0).is_err());
        assert!(Grid::new(f64::NAN, 100, 1.0).is_err());
    }

    #[test]
    fn rejects_too_few_intervals() {
        assert!(Grid::new(1.0, 7, 1.0).is_err());
        assert!(Grid::new(1.0, 8, 1.0).is_ok());
    }

    #[test]
    fn coarse_flag_tracks_feature_scale() {
        // h = 0.1 against a width-0.2 feature: 2 nodes per feature — coarse.
        let g = Grid::new(1.0, 10, 0.2).unwrap();
        assert!(g.is_coarse());
        // Same feature with 200 intervals: well resolved.
        let g = Grid::new(1.0, 200, 0.2).unwrap();
        assert!(!g.is_coarse());
        // Infinite feature scale (flat potential) never flags.
        let g = Grid::new(1.0, 10, f64::INFINITY).unwrap();
        assert!(!g.is_coarse());
    }

    #[test]
    fn coordinates_ascend() {
        let g = Grid::new(1.5, 30, 1.0).unwrap();
        let xs = g.coordinates();
        assert_eq!(xs.len(), 31);
        for w in xs.windows(2) {
            assert!(w[1] > w[0]);
        }
    }
}
