// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for wellspring solves and scans.
//!
//! Replaces `Result<_, String>` in public APIs with a proper enum so callers
//! can pattern-match on failure modes (bad configuration, operator defect,
//! failed verification gate) rather than parsing opaque strings.
//!
//! Propagation policy:
//!   - `Config` and `Convergence` are local to one configuration; the
//!     scanner records them per point and continues.
//!   - `SingularOperator` and `Benchmark` indicate a solver-implementation
//!     defect and abort the entire scan — every downstream result would be
//!     suspect.
//!   - Verification-gate outcomes (V1, V2) are data, not errors: a failed
//!     gate travels as a `GateReport` inside the result, and the pipeline
//!     folds it into `SolveStatus::{NotVerified, Unstable}`. There is no
//!     error variant for them.

use std::fmt;

/// Errors arising from configuration, operator assembly, or verification.
#[derive(Debug, Clone)]
pub enum WellspringError {
    /// Malformed input: non-positive domain, too-coarse grid, bad potential
    /// parameters. Fatal for that configuration only.
    Config(String),

    /// Assembled stiffness/mass matrix failed a symmetry or positive-
    /// definiteness post-condition. Assembler defect; aborts the scan.
    SingularOperator(String),

    /// Cross-method disagreement or overlap-integral drift beyond tolerance.
    /// Configuration is marked NOT VERIFIED, never silently accepted.
    Convergence(String),

    /// Analytic benchmark (V0 gate) failed. Solver-implementation defect;
    /// halts the entire scan.
    Benchmark(String),
}

impl WellspringError {
    /// True for errors that invalidate every result of a sweep, not just
    /// the configuration that raised them.
    #[must_use]
    pub const fn is_fatal_for_scan(&self) -> bool {
        matches!(self, Self::SingularOperator(_) | Self::Benchmark(_))
    }
}

impl fmt::Display for WellspringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Invalid configuration: {msg}"),
            Self::SingularOperator(msg) => {
                write!(f, "Operator post-condition violated: {msg}")
            }
            Self::Convergence(msg) => write!(f, "Convergence failure: {msg}"),
            Self::Benchmark(msg) => write!(f, "Analytic benchmark failed: {msg}"),
        }
    }
}

impl std::error::Error for WellspringError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = WellspringError::Config("domain length must be positive".into());
        assert!(err.to_string().contains("Invalid configuration"));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn display_singular_operator() {
        let err = WellspringError::SingularOperator("K asymmetric".into());
        assert!(err.to_string().contains("post-condition"));
    }

    #[test]
    fn fatal_classification() {
        assert!(WellspringError::Benchmark("v0".into()).is_fatal_for_scan());
        assert!(WellspringError::SingularOperator("m<=0".into()).is_fatal_for_scan());
        assert!(!WellspringError::Config("n too small".into()).is_fatal_for_scan());
        assert!(!WellspringError::Convergence("drift".into()).is_fatal_for_scan());
    }

    #[test]
    fn error_trait_works() {
        let err = WellspringError::Convergence("V1 disagreement 2.3e-3".into());
        let dyn_err: &dyn std::error::Error = &err;
        assert!(dyn_err.to_string().contains("2.3e-3"));
    }
}
