// SPDX-License-Identifier: AGPL-3.0-only

//! Bound-state counting and spectral-gap margins.
//!
//! The threshold separating bound from unbound states is intrinsic — the
//! asymptotic potential value from [`crate::potential::Potential::threshold`]
//! — never an external reference number. N_bound = #{n : λ_n < λ_th}.
//!
//! Gap margins quantify how far the spectrum sits from a counting change:
//! the gap below threshold is measured against the potential's energy span
//! (a level this close to threshold unbinds under a small depth change),
//! the gap above against the finite-domain level scale (π/ℓ)² (the natural
//! spacing of the discretized continuum, so the margin is dimensionless
//! and domain-size independent). Margins under [`GAP_MARGIN_FRACTION`]
//! mark the configuration fine-tuned rather than robust.

use crate::tolerances::GAP_MARGIN_FRACTION;
use serde::{Deserialize, Serialize};

/// Bound-state census for one solved spectrum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundCensus {
    /// Number of eigenvalues strictly below the intrinsic threshold.
    pub n_bound: usize,
    /// Dimensionless margin (λ_th − λ_last_bound) / span; ∞ when nothing
    /// is bound or the threshold is infinite.
    pub gap_below: f64,
    /// Dimensionless margin (λ_first_unbound − λ_th) / (π/ℓ)²; ∞ when no
    /// computed level lies above threshold.
    pub gap_above: f64,
}

impl BoundCensus {
    /// Whether either margin is too small for the counting to be trusted
    /// under parameter perturbation.
    #[must_use]
    pub fn is_fine_tuned(&self) -> bool {
        self.gap_below < GAP_MARGIN_FRACTION || self.gap_above < GAP_MARGIN_FRACTION
    }
}

/// Count eigenvalues below the threshold and compute both gap margins.
///
/// `eigenvalues` must be ascending (as every solver in this crate
/// returns); `span` is the potential's energy scale λ_th − min V and
/// `length` the domain size ℓ.
#[must_use]
pub fn census(eigenvalues: &[f64], threshold: f64, span: f64, length: f64) -> BoundCensus {
    let n_bound = eigenvalues.iter().filter(|&&l| l < threshold).count();

    if !threshold.is_finite() {
        return BoundCensus {
            n_bound,
            gap_below: f64::INFINITY,
            gap_above: f64::INFINITY,
        };
    }

    let gap_below = if n_bound == 0 {
        f64::INFINITY
    } else {
        (threshold - eigenvalues[n_bound - 1]) / span.max(f64::MIN_POSITIVE)
    };

    let box_scale = (std::f64::consts::PI / length).powi(2);
    let gap_above = eigenvalues
        .get(n_bound)
        .map_or(f64::INFINITY, |&l| (l - threshold) / box_scale);

    BoundCensus {
        n_bound,
        gap_below,
        gap_above,
    }
}
